use crate::animation::{Easing, Tween};

const AUTO_SPEED: f64 = 0.5;
const VELOCITY_DECAY: f64 = 0.95;
const DRAG_MULTIPLIER: f64 = 1.5;
const SNAP_VELOCITY: f64 = 1.0;
const SNAP_DURATION_MS: f64 = 600.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Marquee {
    offset: f64,
    velocity: f64,
    loop_width: f64,
    item_width: f64,
    last_pointer: f64,
    dragging: bool,
    snapping: bool,
}

impl Marquee {
    pub fn new(loop_width: f64, item_width: f64) -> Self {
        Self {
            offset: 0.0,
            velocity: 0.0,
            loop_width: loop_width.max(0.0),
            item_width: item_width.max(0.0),
            last_pointer: 0.0,
            dragging: false,
            snapping: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Called after a resize re-measures the track.
    pub fn measure(&mut self, loop_width: f64, item_width: f64) {
        self.loop_width = loop_width.max(0.0);
        self.item_width = item_width.max(0.0);
        self.wrap();
    }

    /// One frame of auto-scroll. Drags and snaps own the offset while they run.
    pub fn tick(&mut self) {
        if !self.dragging && !self.snapping {
            self.offset -= AUTO_SPEED + self.velocity;
            self.velocity *= VELOCITY_DECAY;
        }
        self.wrap();
    }

    pub fn press(&mut self, pointer: f64) {
        self.dragging = true;
        self.snapping = false;
        self.last_pointer = pointer;
        self.velocity = 0.0;
    }

    pub fn drag_to(&mut self, pointer: f64) {
        if !self.dragging {
            return;
        }

        let delta = (pointer - self.last_pointer) * DRAG_MULTIPLIER;
        self.offset += delta;
        self.velocity = delta;
        self.last_pointer = pointer;
        self.wrap();
    }

    /// Ends a drag. A fast flick snaps to the next item boundary in the
    /// flick direction; the returned tween runs from the current offset.
    pub fn release(&mut self) -> Option<Tween> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;

        if self.velocity.abs() <= SNAP_VELOCITY || self.item_width <= 0.0 {
            return None;
        }

        let direction = self.velocity.signum();
        let current_index = (-self.offset / self.item_width).round();
        let target_index = current_index - direction;
        self.velocity = 0.0;
        self.snapping = true;

        Some(Tween::new(
            self.offset,
            -target_index * self.item_width,
            SNAP_DURATION_MS,
            Easing::Power2Out,
        ))
    }

    /// Applies one sampled value of a snap tween.
    pub fn set_offset(&mut self, offset: f64) {
        self.offset = offset;
        self.wrap();
    }

    pub fn finish_snap(&mut self) {
        self.snapping = false;
    }

    fn wrap(&mut self) {
        if self.loop_width <= 0.0 {
            return;
        }
        self.offset = -(-self.offset).rem_euclid(self.loop_width);
    }
}
