use crate::frame::FrameScheduler;
use crate::geometry::{AxisExtent, ThumbVisualState, TrackGeometry};
use crate::scrollbar::ThumbView;
use crate::source::{Listeners, ScrollBehavior, ScrollSource, Subscription};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type FrameCallback = Box<dyn FnOnce(f64)>;

/// Frame scheduler driven by the test: callbacks queue up until `advance`.
#[derive(Clone, Default)]
pub struct ManualFrames {
    queue: Rc<RefCell<Vec<FrameCallback>>>,
    clock: Rc<Cell<f64>>,
}

impl ManualFrames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scheduler(&self) -> Rc<dyn FrameScheduler> {
        Rc::new(self.clone())
    }

    /// Moves the clock forward and runs the frames queued before this call.
    pub fn advance(&self, elapsed_ms: f64) {
        self.clock.set(self.clock.get() + elapsed_ms);
        let due: Vec<FrameCallback> = self.queue.borrow_mut().drain(..).collect();
        for callback in due {
            callback(self.clock.get());
        }
    }

    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }
}

impl FrameScheduler for ManualFrames {
    fn request_frame(&self, callback: Box<dyn FnOnce(f64)>) {
        self.queue.borrow_mut().push(callback);
    }
}

/// In-memory scroll source. Writes notify subscribers synchronously, the
/// way the smooth-scroll engine does for immediate jumps. While paused it
/// drops writes that are not forced, like a stopped engine.
pub struct FakeScrollSource {
    position: Cell<f64>,
    extent: Cell<AxisExtent>,
    paused: Cell<bool>,
    pauses: Cell<u32>,
    resumes: Cell<u32>,
    refreshes: Cell<u32>,
    writes: RefCell<Vec<(f64, ScrollBehavior)>>,
    listeners: Listeners,
}

impl FakeScrollSource {
    pub fn new(content: f64, viewport: f64) -> Rc<Self> {
        Rc::new(Self {
            position: Cell::new(0.0),
            extent: Cell::new(AxisExtent::new(content, viewport)),
            paused: Cell::new(false),
            pauses: Cell::new(0),
            resumes: Cell::new(0),
            refreshes: Cell::new(0),
            writes: RefCell::new(Vec::new()),
            listeners: Listeners::new(),
        })
    }

    /// Simulates the user (or inertia) scrolling, independent of any widget.
    pub fn scroll_externally(&self, position: f64) {
        let position = position.clamp(0.0, self.extent.get().scrollable_range());
        self.position.set(position);
        self.listeners.emit(position);
    }

    pub fn set_extent(&self, content: f64, viewport: f64) {
        self.extent.set(AxisExtent::new(content, viewport));
        let clamped = self.position.get().clamp(0.0, self.extent.get().scrollable_range());
        self.position.set(clamped);
    }

    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    pub fn pause_count(&self) -> u32 {
        self.pauses.get()
    }

    pub fn resume_count(&self) -> u32 {
        self.resumes.get()
    }

    pub fn refresh_count(&self) -> u32 {
        self.refreshes.get()
    }

    pub fn writes(&self) -> Vec<(f64, ScrollBehavior)> {
        self.writes.borrow().clone()
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl ScrollSource for FakeScrollSource {
    fn position(&self) -> f64 {
        self.position.get()
    }

    fn set_position(&self, position: f64, behavior: ScrollBehavior) {
        self.writes.borrow_mut().push((position, behavior));
        if self.paused.get() && !behavior.engine_options().force {
            return;
        }
        self.scroll_externally(position);
    }

    fn extent(&self) -> AxisExtent {
        self.extent.get()
    }

    fn subscribe(&self, listener: Rc<dyn Fn(f64)>) -> Subscription {
        self.listeners.add(listener)
    }

    fn pause(&self) {
        self.paused.set(true);
        self.pauses.set(self.pauses.get() + 1);
    }

    fn resume(&self) {
        self.paused.set(false);
        self.resumes.set(self.resumes.get() + 1);
    }

    fn refresh(&self) {
        self.refreshes.set(self.refreshes.get() + 1);
        self.listeners.emit(self.position.get());
    }
}

#[derive(Default)]
pub struct RecordingView {
    renders: RefCell<Vec<(ThumbVisualState, TrackGeometry)>>,
    dragging: Cell<bool>,
    hidden: Cell<bool>,
}

impl RecordingView {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn last(&self) -> Option<ThumbVisualState> {
        self.renders.borrow().last().map(|(thumb, _)| *thumb)
    }

    pub fn last_geometry(&self) -> Option<TrackGeometry> {
        self.renders.borrow().last().map(|(_, geometry)| *geometry)
    }

    pub fn render_count(&self) -> usize {
        self.renders.borrow().len()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging.get()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden.get()
    }
}

impl ThumbView for RecordingView {
    fn render(&self, thumb: &ThumbVisualState, geometry: &TrackGeometry) {
        self.renders.borrow_mut().push((*thumb, *geometry));
    }

    fn set_dragging(&self, dragging: bool) {
        self.dragging.set(dragging);
    }

    fn set_overflowing(&self, overflowing: bool) {
        self.hidden.set(!overflowing);
    }
}
