use crate::geometry::{pointer_delta_to_scroll_delta, TrackGeometry};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Armed,
    Dragging,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragMapping {
    Thumb {
        movable_range: f64,
        scrollable_range: f64,
    },
    /// Content moves opposite to the pointer.
    Content { multiplier: f64, scrollable_range: f64 },
}

impl DragMapping {
    pub fn thumb(geometry: &TrackGeometry, scrollable_range: f64) -> Self {
        Self::Thumb {
            movable_range: geometry.movable_range,
            scrollable_range,
        }
    }

    pub fn scrollable_range(&self) -> f64 {
        match *self {
            Self::Thumb {
                scrollable_range, ..
            }
            | Self::Content {
                scrollable_range, ..
            } => scrollable_range,
        }
    }

    pub fn scroll_delta(&self, pointer_delta: f64) -> f64 {
        match *self {
            Self::Thumb {
                movable_range,
                scrollable_range,
            } => pointer_delta_to_scroll_delta(pointer_delta, movable_range, scrollable_range),
            Self::Content { multiplier, .. } => -pointer_delta * multiplier,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragSession {
    pub pointer_origin: f64,
    pub pointer_current: f64,
    pub scroll_origin: f64,
    pub mapping: DragMapping,
    pub exceeded_threshold: bool,
}

impl DragSession {
    pub fn pointer_delta(&self) -> f64 {
        self.pointer_current - self.pointer_origin
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragOutcome {
    Click,
    Drag,
    /// Release with no matching press, e.g. after pointer capture was lost.
    Stale,
}

#[derive(Clone, Debug, Default)]
pub struct DragController {
    threshold: Option<f64>,
    phase: DragPhase,
    session: Option<DragSession>,
}

impl DragController {
    pub fn immediate() -> Self {
        Self::default()
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self {
            threshold: Some(threshold.max(0.0)),
            ..Self::default()
        }
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    pub fn is_engaged(&self) -> bool {
        self.phase != DragPhase::Idle
    }

    pub fn is_dragging(&self) -> bool {
        self.phase == DragPhase::Dragging
    }

    /// Starts a session. A press while one is already open replaces it.
    pub fn press(&mut self, pointer: f64, scroll_origin: f64, mapping: DragMapping) {
        self.session = Some(DragSession {
            pointer_origin: pointer,
            pointer_current: pointer,
            scroll_origin,
            mapping,
            exceeded_threshold: self.threshold.is_none(),
        });
        self.phase = if self.threshold.is_some() {
            DragPhase::Armed
        } else {
            DragPhase::Dragging
        };
    }

    pub fn motion(&mut self, pointer: f64) -> DragPhase {
        let threshold = self.threshold;
        let Some(session) = self.session.as_mut() else {
            return self.phase;
        };

        session.pointer_current = pointer;
        if self.phase == DragPhase::Armed {
            if let Some(threshold) = threshold {
                if session.pointer_delta().abs() > threshold {
                    session.exceeded_threshold = true;
                    self.phase = DragPhase::Dragging;
                }
            }
        }

        self.phase
    }

    pub fn target(&self) -> Option<f64> {
        if self.phase != DragPhase::Dragging {
            return None;
        }

        let session = self.session.as_ref()?;
        let range = session.mapping.scrollable_range().max(0.0);
        let target = session.scroll_origin + session.mapping.scroll_delta(session.pointer_delta());

        Some(if target.is_finite() { target.clamp(0.0, range) } else { 0.0 })
    }

    /// Re-anchors an open session after the geometry changed.
    pub fn remap(&mut self, mapping: DragMapping, scroll_origin: f64) {
        if let Some(session) = self.session.as_mut() {
            session.mapping = mapping;
            session.scroll_origin = scroll_origin;
            session.pointer_origin = session.pointer_current;
        }
    }

    pub fn release(&mut self) -> DragOutcome {
        let outcome = match (self.phase, self.session.as_ref()) {
            (DragPhase::Idle, _) | (_, None) => DragOutcome::Stale,
            (_, Some(session)) if session.exceeded_threshold => DragOutcome::Drag,
            (_, Some(_)) => DragOutcome::Click,
        };

        self.phase = DragPhase::Idle;
        self.session = None;
        outcome
    }
}
