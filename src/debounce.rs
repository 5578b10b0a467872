use std::cell::Cell;
use std::rc::Rc;

/// Token returned by [`Debounce::trigger`]; only the most recent one fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DebounceToken(u64);

/// Latest-wins debounce. The caller arms a timer per trigger and, when it
/// fires, asks whether its token is still the current one.
#[derive(Clone, Debug, Default)]
pub struct Debounce {
    generation: Rc<Cell<u64>>,
}

impl Debounce {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn trigger(&self) -> DebounceToken {
        let next = self.generation.get().wrapping_add(1);
        self.generation.set(next);
        DebounceToken(next)
    }

    pub fn is_current(&self, token: DebounceToken) -> bool {
        self.generation.get() == token.0
    }

    /// Invalidates every outstanding token.
    pub fn cancel(&self) {
        self.trigger();
    }
}
