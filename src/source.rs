use crate::geometry::AxisExtent;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    /// Jump without any smoothing. Drags always use this.
    Immediate,
    /// Let the source animate toward the target.
    Smooth,
}

/// Flags passed along with a write to a smooth-scroll engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineScrollOptions {
    pub immediate: bool,
    /// Apply the write even while the engine is stopped.
    pub force: bool,
}

impl ScrollBehavior {
    /// Immediate writes come from drags, which run with the engine stopped,
    /// so they are always forced through.
    pub fn engine_options(self) -> EngineScrollOptions {
        match self {
            Self::Immediate => EngineScrollOptions {
                immediate: true,
                force: true,
            },
            Self::Smooth => EngineScrollOptions {
                immediate: false,
                force: false,
            },
        }
    }
}

pub trait ScrollSource {
    fn position(&self) -> f64;
    fn set_position(&self, position: f64, behavior: ScrollBehavior);
    fn extent(&self) -> AxisExtent;
    fn subscribe(&self, listener: Rc<dyn Fn(f64)>) -> Subscription;
    /// Stops any inertia so direct writes are not fought. No-op for sources
    /// without smoothing.
    fn pause(&self);
    fn resume(&self);
    /// Content size may have changed: re-measure, then notify subscribers
    /// with the current position.
    fn refresh(&self);
}

/// Detaches its listener when dropped.
#[must_use = "dropping a subscription detaches the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(detach: impl FnOnce() + 'static) -> Self {
        Self {
            detach: Some(Box::new(detach)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.run_detach();
    }

    fn run_detach(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("attached", &self.detach.is_some())
            .finish()
    }
}

#[derive(Clone, Default)]
pub struct Listeners {
    entries: Rc<RefCell<Vec<(u64, Rc<dyn Fn(f64)>)>>>,
    next_id: Rc<Cell<u64>>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, listener: Rc<dyn Fn(f64)>) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.entries.borrow_mut().push((id, listener));

        let entries = Rc::downgrade(&self.entries);
        Subscription::new(move || {
            if let Some(entries) = entries.upgrade() {
                entries.borrow_mut().retain(|(entry_id, _)| *entry_id != id);
            }
        })
    }

    /// Listeners may unsubscribe while being notified.
    pub fn emit(&self, position: f64) {
        let snapshot: Vec<Rc<dyn Fn(f64)>> = self
            .entries
            .borrow()
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect();

        for listener in snapshot {
            listener(position);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_immediate_writes_are_forced_past_a_stopped_engine() {
        assert_eq!(
            ScrollBehavior::Immediate.engine_options(),
            EngineScrollOptions {
                immediate: true,
                force: true
            }
        );
        assert!(!ScrollBehavior::Smooth.engine_options().force);
    }

    #[test]
    fn dropping_subscription_detaches_listener() {
        let listeners = Listeners::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);

        let subscription = listeners.add(Rc::new(move |_| counter.set(counter.get() + 1)));
        listeners.emit(1.0);
        drop(subscription);
        listeners.emit(2.0);

        assert_eq!(hits.get(), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn explicit_unsubscribe_only_removes_its_own_entry() {
        let listeners = Listeners::new();
        let first = listeners.add(Rc::new(|_| {}));
        let _second = listeners.add(Rc::new(|_| {}));

        first.unsubscribe();
        assert_eq!(listeners.len(), 1);
    }

    #[test]
    fn listener_can_unsubscribe_itself_during_emit() {
        let listeners = Listeners::new();
        let slot: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));
        let inner = Rc::clone(&slot);

        let subscription = listeners.add(Rc::new(move |_| {
            inner.borrow_mut().take();
        }));
        *slot.borrow_mut() = Some(subscription);

        listeners.emit(5.0);
        assert!(listeners.is_empty());
    }

    #[test]
    fn subscription_outliving_registry_is_harmless() {
        let listeners = Listeners::new();
        let subscription = listeners.add(Rc::new(|_| {}));
        drop(listeners);
        drop(subscription);
    }
}
