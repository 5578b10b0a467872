use std::cell::{Cell, RefCell};
use std::ops::ControlFlow;
use std::rc::{Rc, Weak};

pub trait FrameScheduler {
    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>);
}

/// Cancelling only flips the liveness flag: a frame that is already queued
/// still fires, sees the flag, and exits without rescheduling.
#[derive(Clone, Debug)]
pub struct FrameTask {
    active: Rc<Cell<bool>>,
}

impl FrameTask {
    pub fn spawn<F>(scheduler: Rc<dyn FrameScheduler>, tick: F) -> Self
    where
        F: FnMut(f64) -> ControlFlow<()> + 'static,
    {
        let active = Rc::new(Cell::new(true));
        let tick: Rc<RefCell<dyn FnMut(f64) -> ControlFlow<()>>> = Rc::new(RefCell::new(tick));
        arm(scheduler, Rc::clone(&active), tick);
        Self { active }
    }

    /// Runs `tick` against `target` every frame until cancelled or until the
    /// target is dropped. A frame that finds the target already borrowed is
    /// skipped.
    pub fn drive<T, F>(scheduler: Rc<dyn FrameScheduler>, target: Weak<RefCell<T>>, mut tick: F) -> Self
    where
        T: 'static,
        F: FnMut(&mut T) + 'static,
    {
        Self::spawn(scheduler, move |_| {
            let Some(target) = target.upgrade() else {
                return ControlFlow::Break(());
            };
            if let Ok(mut target) = target.try_borrow_mut() {
                tick(&mut *target);
            }
            ControlFlow::Continue(())
        })
    }

    pub fn idle() -> Self {
        Self {
            active: Rc::new(Cell::new(false)),
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn cancel(&self) {
        self.active.set(false);
    }
}

fn arm(
    scheduler: Rc<dyn FrameScheduler>,
    active: Rc<Cell<bool>>,
    tick: Rc<RefCell<dyn FnMut(f64) -> ControlFlow<()>>>,
) {
    let next = Rc::clone(&scheduler);
    scheduler.request_frame(Box::new(move |timestamp| {
        if !active.get() {
            return;
        }

        let flow = match tick.try_borrow_mut() {
            Ok(mut guard) => (&mut *guard)(timestamp),
            Err(_) => ControlFlow::Continue(()),
        };

        match flow {
            ControlFlow::Continue(()) if active.get() => arm(next, active, tick),
            _ => active.set(false),
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ManualFrames;

    #[test]
    fn task_runs_once_per_frame_until_cancelled() {
        let frames = ManualFrames::new();
        let ticks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ticks);

        let task = FrameTask::spawn(frames.scheduler(), move |_| {
            counter.set(counter.get() + 1);
            ControlFlow::Continue(())
        });

        frames.advance(16.0);
        frames.advance(16.0);
        assert_eq!(ticks.get(), 2);

        task.cancel();
        frames.advance(16.0);
        assert_eq!(ticks.get(), 2);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn break_stops_the_loop_and_clears_liveness() {
        let frames = ManualFrames::new();
        let ticks = Rc::new(Cell::new(0));
        let counter = Rc::clone(&ticks);

        let task = FrameTask::spawn(frames.scheduler(), move |_| {
            counter.set(counter.get() + 1);
            if counter.get() == 3 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        for _ in 0..5 {
            frames.advance(16.0);
        }

        assert_eq!(ticks.get(), 3);
        assert!(!task.is_active());
    }

    #[test]
    fn cancel_from_inside_tick_does_not_reschedule() {
        let frames = ManualFrames::new();
        let slot: Rc<RefCell<Option<FrameTask>>> = Rc::new(RefCell::new(None));
        let inner = Rc::clone(&slot);

        let task = FrameTask::spawn(frames.scheduler(), move |_| {
            if let Some(task) = inner.borrow().as_ref() {
                task.cancel();
            }
            ControlFlow::Continue(())
        });
        *slot.borrow_mut() = Some(task);

        frames.advance(16.0);
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn driven_task_ends_when_target_is_dropped() {
        let frames = ManualFrames::new();
        let target = Rc::new(RefCell::new(0u32));

        let task = FrameTask::drive(frames.scheduler(), Rc::downgrade(&target), |count| *count += 1);
        frames.advance(16.0);
        assert_eq!(*target.borrow(), 1);

        drop(target);
        frames.advance(16.0);
        assert!(!task.is_active());
        assert_eq!(frames.pending(), 0);
    }

    #[test]
    fn timestamps_are_forwarded() {
        let frames = ManualFrames::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let _task = FrameTask::spawn(frames.scheduler(), move |timestamp| {
            sink.borrow_mut().push(timestamp);
            ControlFlow::Continue(())
        });

        frames.advance(10.0);
        frames.advance(6.0);
        assert_eq!(*seen.borrow(), vec![10.0, 16.0]);
    }
}
