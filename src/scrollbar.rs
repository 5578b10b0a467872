use crate::drag::{DragController, DragMapping, DragOutcome};
use crate::frame::{FrameScheduler, FrameTask};
use crate::geometry::{
    thumb_for_geometry, track_click_to_position, Axis, ScrollAxis, ThumbVisualState, TrackGeometry,
};
use crate::source::{ScrollBehavior, ScrollSource, Subscription};
use crate::telemetry::{log_event, LogLevel};
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;

pub trait ThumbView {
    fn render(&self, thumb: &ThumbVisualState, geometry: &TrackGeometry);

    fn set_dragging(&self, _dragging: bool) {}

    fn set_overflowing(&self, _overflowing: bool) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackJump {
    Smooth,
    Instant,
}

impl TrackJump {
    pub fn behavior(self) -> ScrollBehavior {
        match self {
            Self::Smooth => ScrollBehavior::Smooth,
            Self::Instant => ScrollBehavior::Immediate,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ScrollbarConfig {
    pub axis: Axis,
    pub min_thumb_length: f64,
    pub track_jump: TrackJump,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PressTarget {
    Thumb,
    Track,
}

pub struct VirtualScrollbar {
    config: ScrollbarConfig,
    source: Rc<dyn ScrollSource>,
    view: Rc<dyn ThumbView>,
    axis: ScrollAxis,
    geometry: TrackGeometry,
    thumb: ThumbVisualState,
    drag: DragController,
    paused_source: bool,
}

impl VirtualScrollbar {
    pub fn new(config: ScrollbarConfig, source: Rc<dyn ScrollSource>, view: Rc<dyn ThumbView>) -> Self {
        let axis = ScrollAxis::new(source.position(), source.extent());

        Self {
            config,
            source,
            view,
            axis,
            geometry: TrackGeometry::default(),
            thumb: ThumbVisualState::full(),
            drag: DragController::immediate(),
            paused_source: false,
        }
    }

    pub fn config(&self) -> &ScrollbarConfig {
        &self.config
    }

    pub fn source(&self) -> Rc<dyn ScrollSource> {
        Rc::clone(&self.source)
    }

    pub fn thumb(&self) -> ThumbVisualState {
        self.thumb
    }

    pub fn geometry(&self) -> TrackGeometry {
        self.geometry
    }

    pub fn position(&self) -> f64 {
        self.axis.position()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_engaged()
    }

    pub fn reconcile(&mut self, track_length: f64) {
        self.measure(track_length);
        if !self.drag.is_engaged() {
            self.axis.set_position(self.source.position());
        }
        self.apply();
    }

    /// Scroll notification from the source. Returns whether the thumb moved.
    pub fn sync(&mut self, position: f64) -> bool {
        if self.drag.is_engaged() {
            return false;
        }

        // Content can grow or shrink without any window resize.
        if self.source.extent() != self.axis.extent() {
            self.measure(self.geometry.track_length);
        }
        self.axis.set_position(position);
        self.apply();
        true
    }

    fn measure(&mut self, track_length: f64) {
        let extent = self.source.extent();
        self.axis.set_extent(extent);
        self.geometry = TrackGeometry::measure(extent, track_length, self.config.min_thumb_length);

        if self.drag.is_engaged() {
            let mapping = DragMapping::thumb(&self.geometry, self.axis.scrollable_range());
            self.drag.remap(mapping, self.axis.position());
        }

        self.view.set_overflowing(extent.overflows());
    }

    pub fn begin_drag(&mut self, pointer: f64) {
        self.reconcile(self.geometry.track_length);

        if !self.paused_source {
            self.source.pause();
            self.paused_source = true;
        }

        let mapping = DragMapping::thumb(&self.geometry, self.axis.scrollable_range());
        self.drag.press(pointer, self.axis.position(), mapping);
        self.view.set_dragging(true);

        log_event(
            LogLevel::Debug,
            "drag_start",
            serde_json::json!({
                "axis": self.config.axis,
                "scroll_origin": self.axis.position(),
                "movable_range": self.geometry.movable_range,
            }),
        );
    }

    pub fn pointer_moved(&mut self, pointer: f64) {
        self.drag.motion(pointer);
    }

    pub fn drag_frame(&mut self) {
        let Some(target) = self.drag.target() else {
            return;
        };

        self.axis.set_position(target);
        self.source.set_position(self.axis.position(), ScrollBehavior::Immediate);
        self.apply();
    }

    /// Ends the session. Safe to call any number of times.
    pub fn end_drag(&mut self) -> DragOutcome {
        let outcome = self.drag.release();

        if self.paused_source {
            self.source.resume();
            self.paused_source = false;
        }
        self.view.set_dragging(false);

        match outcome {
            DragOutcome::Stale => log_event(
                LogLevel::Debug,
                "stale_pointer_release",
                serde_json::json!({ "axis": self.config.axis }),
            ),
            _ => {
                log_event(
                    LogLevel::Debug,
                    "drag_end",
                    serde_json::json!({ "axis": self.config.axis, "position": self.axis.position() }),
                );
                self.sync(self.source.position());
            }
        }

        outcome
    }

    /// Presses that land on the thumb belong to the drag path.
    pub fn track_pressed(&mut self, target: PressTarget, offset_along_track: f64) -> Option<f64> {
        if target == PressTarget::Thumb || self.drag.is_engaged() || self.geometry.is_degenerate() {
            return None;
        }

        let position = track_click_to_position(
            offset_along_track,
            self.geometry.thumb_length,
            self.geometry.movable_range,
            self.axis.scrollable_range(),
        );
        let behavior = self.config.track_jump.behavior();
        self.source.set_position(position, behavior);

        // Smooth jumps report progress through notifications.
        if behavior == ScrollBehavior::Immediate {
            self.axis.set_position(position);
            self.apply();
        }

        log_event(
            LogLevel::Debug,
            "track_jump",
            serde_json::json!({ "axis": self.config.axis, "position": position }),
        );
        Some(position)
    }

    fn apply(&mut self) {
        self.thumb = thumb_for_geometry(&self.axis, &self.geometry);
        self.view.render(&self.thumb, &self.geometry);
    }
}

#[derive(Clone)]
pub struct ScrollbarHandle {
    bar: Rc<RefCell<VirtualScrollbar>>,
    frames: Rc<dyn FrameScheduler>,
    drag_loop: Rc<RefCell<FrameTask>>,
}

impl ScrollbarHandle {
    pub fn new(bar: VirtualScrollbar, frames: Rc<dyn FrameScheduler>) -> Self {
        Self {
            bar: Rc::new(RefCell::new(bar)),
            frames,
            drag_loop: Rc::new(RefCell::new(FrameTask::idle())),
        }
    }

    pub fn attach(&self) -> Subscription {
        let source = self.bar.borrow().source();
        let bar = Rc::downgrade(&self.bar);

        source.subscribe(Rc::new(move |position| {
            let Some(bar) = bar.upgrade() else {
                return;
            };
            // Busy means the notification came from our own write, which
            // already redrew the thumb.
            if let Ok(mut bar) = bar.try_borrow_mut() {
                bar.sync(position);
            };
        }))
    }

    pub fn reconcile(&self, track_length: f64) {
        self.bar.borrow_mut().reconcile(track_length);
    }

    pub fn press_thumb(&self, pointer: f64) {
        self.drag_loop.borrow().cancel();
        self.bar.borrow_mut().begin_drag(pointer);

        let task = FrameTask::drive(
            Rc::clone(&self.frames),
            Rc::downgrade(&self.bar),
            VirtualScrollbar::drag_frame,
        );
        *self.drag_loop.borrow_mut() = task;
    }

    pub fn pointer_moved(&self, pointer: f64) {
        self.bar.borrow_mut().pointer_moved(pointer);
    }

    pub fn release(&self) -> DragOutcome {
        self.drag_loop.borrow().cancel();
        self.bar.borrow_mut().end_drag()
    }

    pub fn press_track(&self, target: PressTarget, offset_along_track: f64) -> Option<f64> {
        self.bar.borrow_mut().track_pressed(target, offset_along_track)
    }

    pub fn thumb(&self) -> ThumbVisualState {
        self.bar.borrow().thumb()
    }

    pub fn geometry(&self) -> TrackGeometry {
        self.bar.borrow().geometry()
    }

    pub fn is_dragging(&self) -> bool {
        self.bar.borrow().is_dragging()
    }

    pub fn drag_loop_active(&self) -> bool {
        self.drag_loop.borrow().is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeScrollSource, ManualFrames, RecordingView};

    const TRACK: f64 = 400.0;

    fn config(track_jump: TrackJump) -> ScrollbarConfig {
        ScrollbarConfig {
            axis: Axis::Vertical,
            min_thumb_length: 30.0,
            track_jump,
        }
    }

    struct Rig {
        source: Rc<FakeScrollSource>,
        view: Rc<RecordingView>,
        frames: ManualFrames,
        handle: ScrollbarHandle,
        _subscription: Subscription,
    }

    fn rig(content: f64, viewport: f64, track_jump: TrackJump) -> Rig {
        let source = FakeScrollSource::new(content, viewport);
        let view = RecordingView::new();
        let frames = ManualFrames::new();
        let bar = VirtualScrollbar::new(config(track_jump), source.clone(), view.clone());
        let handle = ScrollbarHandle::new(bar, frames.scheduler());
        let subscription = handle.attach();
        handle.reconcile(TRACK);

        Rig {
            source,
            view,
            frames,
            handle,
            _subscription: subscription,
        }
    }

    #[test]
    fn non_overflowing_page_renders_full_thumb() {
        let rig = rig(800.0, 1000.0, TrackJump::Smooth);

        assert_eq!(rig.view.last(), Some(ThumbVisualState::full()));
        assert!(rig.view.is_hidden());
    }

    #[test]
    fn scroll_notifications_move_the_thumb() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);

        rig.source.scroll_externally(1500.0);

        let thumb = rig.view.last().expect("rendered");
        assert_eq!(thumb.length_fraction, 0.25);
        assert_eq!(thumb.offset_fraction, 0.5 * 0.75);
    }

    #[test]
    fn drag_writes_immediately_and_pauses_smoothing() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);

        rig.handle.press_thumb(10.0);
        assert!(rig.source.is_paused());

        rig.handle.pointer_moved(40.0);
        rig.frames.advance(16.0);

        assert_eq!(rig.source.position(), 300.0);
        assert_eq!(rig.source.writes().last(), Some(&(300.0, ScrollBehavior::Immediate)));
        let offset = rig.view.last().expect("rendered").offset_px(TRACK);
        assert!((offset - 30.0).abs() < 1e-9);
        assert!(rig.view.is_dragging());

        rig.handle.release();
        assert!(!rig.source.is_paused());
        assert!(!rig.view.is_dragging());
        assert!(!rig.handle.drag_loop_active());
    }

    #[test]
    fn external_scroll_during_drag_does_not_move_thumb() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);
        rig.handle.press_thumb(10.0);
        rig.handle.pointer_moved(40.0);
        rig.frames.advance(16.0);
        let during_drag = rig.view.last().expect("rendered");
        let renders = rig.view.render_count();

        rig.source.scroll_externally(2900.0);

        assert_eq!(rig.view.render_count(), renders);
        assert_eq!(rig.handle.thumb(), during_drag);

        // The next drag frame puts the source back where the pointer says.
        rig.frames.advance(16.0);
        assert_eq!(rig.source.position(), 300.0);
        assert_eq!(rig.view.last(), Some(during_drag));
    }

    #[test]
    fn drag_there_and_back_restores_position() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);
        rig.source.scroll_externally(1200.0);

        rig.handle.press_thumb(100.0);
        rig.handle.pointer_moved(137.0);
        rig.frames.advance(16.0);
        rig.handle.pointer_moved(100.0);
        rig.frames.advance(16.0);
        rig.handle.release();

        assert!((rig.source.position() - 1200.0).abs() < 1e-9);
    }

    #[test]
    fn content_shrinking_mid_drag_settles_to_full_thumb() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);
        rig.handle.press_thumb(10.0);
        rig.handle.pointer_moved(80.0);
        rig.frames.advance(16.0);

        rig.source.set_extent(800.0, 1000.0);
        rig.handle.reconcile(TRACK);
        rig.handle.pointer_moved(120.0);
        rig.frames.advance(16.0);

        assert_eq!(rig.view.last(), Some(ThumbVisualState::full()));
        assert_eq!(rig.source.position(), 0.0);
        assert!(rig.handle.is_dragging());

        assert_eq!(rig.handle.release(), DragOutcome::Drag);
    }

    #[test]
    fn content_growing_again_restores_thumb() {
        let rig = rig(800.0, 1000.0, TrackJump::Smooth);
        assert!(rig.handle.geometry().is_degenerate());

        rig.source.set_extent(2000.0, 1000.0);
        rig.handle.reconcile(TRACK);

        assert_eq!(rig.handle.geometry().thumb_length, 200.0);
        assert!(!rig.view.is_hidden());
    }

    #[test]
    fn content_growth_is_picked_up_on_next_scroll() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);

        rig.source.set_extent(8000.0, 1000.0);
        rig.source.scroll_externally(3500.0);

        let thumb = rig.view.last().expect("rendered");
        assert_eq!(thumb.length_fraction, 0.125);
        assert!((thumb.offset_fraction - 0.4375).abs() < 1e-9);
        assert_eq!(rig.view.last_geometry().map(|g| g.thumb_length), Some(50.0));
    }

    #[test]
    fn refresh_remeasures_without_scrolling() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);
        rig.source.scroll_externally(1500.0);

        rig.source.set_extent(2000.0, 1000.0);
        rig.source.refresh();

        assert_eq!(rig.handle.geometry().thumb_length, 200.0);
        let thumb = rig.view.last().expect("rendered");
        assert_eq!(thumb.offset_fraction, 0.5);
    }

    #[test]
    fn paused_engine_still_follows_the_drag() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);

        rig.handle.press_thumb(0.0);
        rig.handle.pointer_moved(100.0);
        rig.frames.advance(16.0);
        assert!(rig.source.is_paused());
        assert_eq!(rig.source.position(), 1000.0);

        rig.handle.release();
        assert_eq!(rig.source.position(), 1000.0);
        let offset = rig.view.last().expect("rendered").offset_px(TRACK);
        assert!((offset - 100.0).abs() < 1e-9);
    }

    #[test]
    fn release_without_press_is_harmless() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);

        assert_eq!(rig.handle.release(), DragOutcome::Stale);
        assert_eq!(rig.handle.release(), DragOutcome::Stale);
        assert_eq!(rig.source.resume_count(), 0);
        assert!(!rig.handle.is_dragging());
    }

    #[test]
    fn second_press_does_not_pause_twice() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);

        rig.handle.press_thumb(10.0);
        rig.handle.press_thumb(12.0);
        rig.handle.release();

        assert_eq!(rig.source.pause_count(), 1);
        assert_eq!(rig.source.resume_count(), 1);
    }

    #[test]
    fn track_press_on_thumb_is_ignored() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);

        assert_eq!(rig.handle.press_track(PressTarget::Thumb, 300.0), None);
        assert!(rig.source.writes().is_empty());
    }

    #[test]
    fn track_press_centres_thumb_on_click() {
        let rig = rig(4000.0, 1000.0, TrackJump::Instant);

        let position = rig.handle.press_track(PressTarget::Track, 250.0).expect("jump");

        assert_eq!(position, 2000.0);
        assert_eq!(rig.source.writes(), vec![(2000.0, ScrollBehavior::Immediate)]);
        let thumb = rig.view.last().expect("rendered");
        let centre = thumb.offset_px(TRACK) + 50.0;
        assert!((centre - 250.0).abs() < 1e-9);
    }

    #[test]
    fn smooth_track_press_uses_source_smoothing() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);

        rig.handle.press_track(PressTarget::Track, 60.0);

        assert_eq!(rig.source.writes(), vec![(100.0, ScrollBehavior::Smooth)]);
    }

    #[test]
    fn track_press_on_degenerate_geometry_does_nothing() {
        let rig = rig(800.0, 1000.0, TrackJump::Instant);

        assert_eq!(rig.handle.press_track(PressTarget::Track, 200.0), None);
    }

    #[test]
    fn dropping_subscription_stops_sync() {
        let Rig {
            source,
            view,
            handle: _handle,
            _subscription: subscription,
            ..
        } = rig(4000.0, 1000.0, TrackJump::Smooth);
        assert_eq!(source.subscriber_count(), 1);

        drop(subscription);
        let renders = view.render_count();
        source.scroll_externally(1000.0);

        assert_eq!(source.subscriber_count(), 0);
        assert_eq!(view.render_count(), renders);
    }

    #[test]
    fn drag_loop_stops_when_scrollbar_is_dropped() {
        let rig = rig(4000.0, 1000.0, TrackJump::Smooth);
        rig.handle.press_thumb(10.0);
        let frames = rig.frames.clone();
        drop(rig);

        frames.advance(16.0);
        assert_eq!(frames.pending(), 0);
    }
}
