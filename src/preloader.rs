use crate::animation::{Easing, Tween};
use crate::source::ScrollSource;
use crate::telemetry::{log_event, LogLevel};
use std::rc::Rc;

pub const FILL_DURATION_MS: f64 = 1200.0;
pub const HOLD_MS: u32 = 200;
pub const FADE: Tween = Tween {
    from: 1.0,
    to: 0.0,
    duration_ms: 800.0,
    easing: Easing::Power2InOut,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PreloadPhase {
    Filling,
    Fading,
    Done,
}

/// Pauses the page scroll source on creation and resumes it exactly once,
/// either when the overlay is gone or when the gate is dropped early.
pub struct PreloadGate {
    source: Rc<dyn ScrollSource>,
    phase: PreloadPhase,
    fill: Tween,
    started_at: Option<f64>,
}

impl PreloadGate {
    pub fn new(source: Rc<dyn ScrollSource>) -> Self {
        source.pause();

        Self {
            source,
            phase: PreloadPhase::Filling,
            fill: Tween::new(0.0, 100.0, FILL_DURATION_MS, Easing::Power2Out),
            started_at: None,
        }
    }

    pub fn phase(&self) -> PreloadPhase {
        self.phase
    }

    /// Progress bar width in percent at frame `timestamp`. Moves to
    /// `Fading` once full.
    pub fn tick(&mut self, timestamp: f64) -> f64 {
        if self.phase != PreloadPhase::Filling {
            return 100.0;
        }

        let start = *self.started_at.get_or_insert(timestamp);
        let (width, full) = self.fill.sample(timestamp - start);
        if full {
            self.phase = PreloadPhase::Fading;
        }
        width
    }

    /// Lets the page scroll again and re-measures it, since the overlay may
    /// have hidden content. Idempotent.
    pub fn finish(&mut self) {
        if self.phase == PreloadPhase::Done {
            return;
        }

        self.phase = PreloadPhase::Done;
        self.source.resume();
        self.source.refresh();
        log_event(LogLevel::Info, "preloader_done", serde_json::json!({}));
    }
}

impl Drop for PreloadGate {
    fn drop(&mut self) {
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeScrollSource;

    #[test]
    fn page_stays_paused_until_finished() {
        let source = FakeScrollSource::new(3000.0, 1000.0);
        let mut gate = PreloadGate::new(source.clone());
        assert!(source.is_paused());

        assert_eq!(gate.tick(100.0), 0.0);
        let midway = gate.tick(700.0);
        assert!(midway > 50.0 && midway < 100.0);
        assert_eq!(gate.phase(), PreloadPhase::Filling);

        assert_eq!(gate.tick(1300.0), 100.0);
        assert_eq!(gate.phase(), PreloadPhase::Fading);
        assert!(source.is_paused());

        gate.finish();
        assert!(!source.is_paused());
        assert_eq!(source.refresh_count(), 1);
    }

    #[test]
    fn finishing_twice_resumes_once() {
        let source = FakeScrollSource::new(3000.0, 1000.0);
        let mut gate = PreloadGate::new(source.clone());

        gate.finish();
        gate.finish();
        drop(gate);

        assert_eq!(source.pause_count(), 1);
        assert_eq!(source.resume_count(), 1);
    }

    #[test]
    fn dropping_early_releases_the_page() {
        let source = FakeScrollSource::new(3000.0, 1000.0);
        let gate = PreloadGate::new(source.clone());

        drop(gate);

        assert!(!source.is_paused());
    }

    #[test]
    fn smooth_writes_wait_for_the_gate() {
        let source = FakeScrollSource::new(3000.0, 1000.0);
        let mut gate = PreloadGate::new(source.clone());

        source.set_position(500.0, crate::source::ScrollBehavior::Smooth);
        assert_eq!(source.position(), 0.0);

        gate.finish();
        source.set_position(500.0, crate::source::ScrollBehavior::Smooth);
        assert_eq!(source.position(), 500.0);
    }
}
