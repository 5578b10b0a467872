use crate::drag::{DragController, DragMapping, DragOutcome, DragPhase};
use crate::frame::{FrameScheduler, FrameTask};
use crate::source::{ScrollBehavior, ScrollSource};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PanelRelease {
    /// Released before crossing the threshold. Carries the pressed card, if
    /// the press started on one.
    Clicked(Option<String>),
    Dragged,
    Stale,
}

pub struct DragScrollPanel {
    source: Rc<dyn ScrollSource>,
    drag: DragController,
    multiplier: f64,
    pressed_card: Option<String>,
    paused_source: bool,
}

impl DragScrollPanel {
    pub fn new(source: Rc<dyn ScrollSource>, threshold: f64, multiplier: f64) -> Self {
        Self {
            source,
            drag: DragController::with_threshold(threshold),
            multiplier,
            pressed_card: None,
            paused_source: false,
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.drag.phase()
    }

    pub fn press(&mut self, pointer: f64, card: Option<String>) {
        if !self.paused_source {
            self.source.pause();
            self.paused_source = true;
        }

        let mapping = DragMapping::Content {
            multiplier: self.multiplier,
            scrollable_range: self.source.extent().scrollable_range(),
        };
        self.drag.press(pointer, self.source.position(), mapping);
        self.pressed_card = card;
    }

    pub fn motion(&mut self, pointer: f64) -> DragPhase {
        self.drag.motion(pointer)
    }

    /// Writes the drag target to the source. Nothing happens until the press
    /// has turned into a drag.
    pub fn frame(&mut self) {
        if let Some(target) = self.drag.target() {
            if (target - self.source.position()).abs() > f64::EPSILON {
                self.source.set_position(target, ScrollBehavior::Immediate);
            }
        }
    }

    pub fn release(&mut self) -> PanelRelease {
        let outcome = self.drag.release();
        let card = self.pressed_card.take();
        self.resume_source();

        match outcome {
            DragOutcome::Click => PanelRelease::Clicked(card),
            DragOutcome::Drag => PanelRelease::Dragged,
            DragOutcome::Stale => PanelRelease::Stale,
        }
    }

    /// Pointer cancelled by the browser: never a click.
    pub fn cancel(&mut self) -> PanelRelease {
        match self.release() {
            PanelRelease::Clicked(_) | PanelRelease::Dragged => PanelRelease::Dragged,
            PanelRelease::Stale => PanelRelease::Stale,
        }
    }

    fn resume_source(&mut self) {
        if self.paused_source {
            self.source.resume();
            self.paused_source = false;
        }
    }
}

/// Wires a [`DragScrollPanel`] to the per-frame loop.
#[derive(Clone)]
pub struct PanelHandle {
    panel: Rc<RefCell<DragScrollPanel>>,
    frames: Rc<dyn FrameScheduler>,
    drag_loop: Rc<RefCell<FrameTask>>,
}

impl PanelHandle {
    pub fn new(panel: DragScrollPanel, frames: Rc<dyn FrameScheduler>) -> Self {
        Self {
            panel: Rc::new(RefCell::new(panel)),
            frames,
            drag_loop: Rc::new(RefCell::new(FrameTask::idle())),
        }
    }

    pub fn press(&self, pointer: f64, card: Option<String>) {
        self.drag_loop.borrow().cancel();
        self.panel.borrow_mut().press(pointer, card);

        let task = FrameTask::drive(
            Rc::clone(&self.frames),
            Rc::downgrade(&self.panel),
            DragScrollPanel::frame,
        );
        *self.drag_loop.borrow_mut() = task;
    }

    pub fn moved(&self, pointer: f64) -> DragPhase {
        self.panel.borrow_mut().motion(pointer)
    }

    pub fn release(&self) -> PanelRelease {
        self.drag_loop.borrow().cancel();
        self.panel.borrow_mut().release()
    }

    pub fn cancel(&self) -> PanelRelease {
        self.drag_loop.borrow().cancel();
        self.panel.borrow_mut().cancel()
    }

    pub fn is_dragging(&self) -> bool {
        self.panel.borrow().phase() == DragPhase::Dragging
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DetailChange {
    Open(String),
    Close,
}

/// Master-detail selection: at most one card is expanded.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DetailSelection {
    active: Option<String>,
}

impl DetailSelection {
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active.as_deref() == Some(id)
    }

    /// Clicking the open card closes it; clicking any other card opens that one.
    pub fn toggle(&mut self, id: &str) -> DetailChange {
        if self.is_active(id) {
            self.active = None;
            DetailChange::Close
        } else {
            self.active = Some(id.to_string());
            DetailChange::Open(id.to_string())
        }
    }

    /// Returns whether anything was open.
    pub fn close(&mut self) -> bool {
        self.active.take().is_some()
    }
}
