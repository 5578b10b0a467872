use crate::frame::{FrameScheduler, FrameTask};
use std::cell::Cell;
use std::ops::ControlFlow;
use std::rc::Rc;

/// Easing curves used across the page.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Easing {
    #[default]
    Linear,
    /// Cubic ease-out.
    Power2Out,
    /// Cubic ease-in-out.
    Power2InOut,
    /// Quartic ease-out.
    Power3Out,
    /// The smooth-scroll engine's exponential curve, `min(1, 1.001 - 2^(-10t))`.
    ExpoOut,
}

impl Easing {
    /// Maps progress in `[0, 1]` to eased progress. Input outside the range
    /// is clamped first.
    pub fn apply(&self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::Power2Out => 1.0 - (1.0 - t).powi(3),
            Easing::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Power3Out => 1.0 - (1.0 - t).powi(4),
            Easing::ExpoOut => (1.001 - 2f64.powf(-10.0 * t)).min(1.0),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    pub from: f64,
    pub to: f64,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration_ms: f64, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration_ms,
            easing,
        }
    }

    /// Value at `elapsed_ms` and whether the tween has finished.
    pub fn sample(&self, elapsed_ms: f64) -> (f64, bool) {
        if self.duration_ms <= 0.0 || elapsed_ms >= self.duration_ms {
            return (self.to, true);
        }

        let progress = self.easing.apply(elapsed_ms.max(0.0) / self.duration_ms);
        (self.from + (self.to - self.from) * progress, false)
    }
}

pub trait AnimationEngine {
    /// Starts `tween`. `on_update` sees every sampled value including the
    /// final one; `on_complete` runs once after it unless the returned task
    /// is cancelled first.
    fn animate(
        &self,
        tween: Tween,
        on_update: Box<dyn FnMut(f64)>,
        on_complete: Box<dyn FnOnce()>,
    ) -> FrameTask;
}

pub struct FrameAnimator {
    frames: Rc<dyn FrameScheduler>,
}

impl FrameAnimator {
    pub fn new(frames: Rc<dyn FrameScheduler>) -> Self {
        Self { frames }
    }
}

impl AnimationEngine for FrameAnimator {
    fn animate(
        &self,
        tween: Tween,
        mut on_update: Box<dyn FnMut(f64)>,
        on_complete: Box<dyn FnOnce()>,
    ) -> FrameTask {
        let started_at = Rc::new(Cell::new(None::<f64>));
        let mut on_complete = Some(on_complete);

        FrameTask::spawn(Rc::clone(&self.frames), move |timestamp| {
            let start = match started_at.get() {
                Some(start) => start,
                None => {
                    started_at.set(Some(timestamp));
                    timestamp
                }
            };

            let (value, finished) = tween.sample(timestamp - start);
            on_update(value);

            if finished {
                if let Some(on_complete) = on_complete.take() {
                    on_complete();
                }
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualFrames;
    use std::cell::RefCell;

    #[test]
    fn easings_hit_both_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::Power2Out,
            Easing::Power2InOut,
            Easing::Power3Out,
        ] {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?}");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?}");
        }

        assert!(Easing::ExpoOut.apply(0.0).abs() < 0.01);
        assert_eq!(Easing::ExpoOut.apply(1.0), 1.0);
    }

    #[test]
    fn ease_out_runs_ahead_of_linear() {
        assert!(Easing::Power2Out.apply(0.3) > 0.3);
        assert!(Easing::Power3Out.apply(0.3) > Easing::Power2Out.apply(0.3));
    }

    #[test]
    fn zero_duration_tween_finishes_immediately() {
        let tween = Tween::new(0.0, 42.0, 0.0, Easing::Power2Out);
        assert_eq!(tween.sample(0.0), (42.0, true));
    }

    #[test]
    fn animator_reaches_target_and_completes_once() {
        let frames = ManualFrames::new();
        let animator = FrameAnimator::new(frames.scheduler());
        let values = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(Cell::new(0));

        let sink = Rc::clone(&values);
        let done = Rc::clone(&completions);
        let task = animator.animate(
            Tween::new(0.0, 100.0, 100.0, Easing::Linear),
            Box::new(move |value| sink.borrow_mut().push(value)),
            Box::new(move || done.set(done.get() + 1)),
        );

        for _ in 0..10 {
            frames.advance(25.0);
        }

        assert_eq!(*values.borrow(), vec![0.0, 25.0, 50.0, 75.0, 100.0]);
        assert_eq!(completions.get(), 1);
        assert!(!task.is_active());
    }

    #[test]
    fn cancelled_animation_never_completes() {
        let frames = ManualFrames::new();
        let animator = FrameAnimator::new(frames.scheduler());
        let completions = Rc::new(Cell::new(0));
        let done = Rc::clone(&completions);

        let task = animator.animate(
            Tween::new(0.0, 1.0, 50.0, Easing::Linear),
            Box::new(|_| {}),
            Box::new(move || done.set(done.get() + 1)),
        );
        frames.advance(10.0);
        task.cancel();
        frames.advance(100.0);

        assert_eq!(completions.get(), 0);
    }
}
