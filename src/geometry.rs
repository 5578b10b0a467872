use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Vertical,
    Horizontal,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AxisExtent {
    pub content: f64,
    pub viewport: f64,
}

impl AxisExtent {
    pub fn new(content: f64, viewport: f64) -> Self {
        Self { content, viewport }
    }

    pub fn overflows(&self) -> bool {
        self.content > self.viewport
    }

    /// `content - viewport`, or 0 when nothing overflows.
    pub fn scrollable_range(&self) -> f64 {
        if self.overflows() {
            self.content - self.viewport
        } else {
            0.0
        }
    }
}

/// Scroll state along one axis. The position is always kept inside
/// `[0, content - viewport]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollAxis {
    position: f64,
    extent: AxisExtent,
}

impl ScrollAxis {
    pub fn new(position: f64, extent: AxisExtent) -> Self {
        let mut axis = Self {
            position: 0.0,
            extent,
        };
        axis.set_position(position);
        axis
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn extent(&self) -> AxisExtent {
        self.extent
    }

    pub fn scrollable_range(&self) -> f64 {
        self.extent.scrollable_range()
    }

    pub fn clamp(&self, position: f64) -> f64 {
        clamp_to_range(position, self.scrollable_range())
    }

    pub fn set_position(&mut self, position: f64) {
        self.position = self.clamp(position);
    }

    /// Replaces the extent and re-clamps the position into the new range.
    pub fn set_extent(&mut self, extent: AxisExtent) {
        self.extent = extent;
        self.position = self.clamp(self.position);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TrackGeometry {
    pub track_length: f64,
    pub thumb_length: f64,
    pub movable_range: f64,
}

impl TrackGeometry {
    pub fn measure(extent: AxisExtent, track_length: f64, min_thumb_length: f64) -> Self {
        let track_length = finite_or_zero(track_length).max(0.0);

        if !extent.overflows() || track_length <= 0.0 || extent.content <= 0.0 {
            return Self {
                track_length,
                thumb_length: track_length,
                movable_range: 0.0,
            };
        }

        let proportional = extent.viewport / extent.content * track_length;
        let thumb_length = proportional.max(min_thumb_length).min(track_length);

        Self {
            track_length,
            thumb_length,
            movable_range: track_length - thumb_length,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.movable_range <= 0.0
    }
}

/// Thumb placement as fractions of the track length, both in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ThumbVisualState {
    pub offset_fraction: f64,
    pub length_fraction: f64,
}

impl Default for ThumbVisualState {
    fn default() -> Self {
        Self::full()
    }
}

impl ThumbVisualState {
    /// Full-length thumb at the track origin.
    pub fn full() -> Self {
        Self {
            offset_fraction: 0.0,
            length_fraction: 1.0,
        }
    }

    pub fn offset_px(&self, track_length: f64) -> f64 {
        self.offset_fraction * track_length
    }

    pub fn length_px(&self, track_length: f64) -> f64 {
        self.length_fraction * track_length
    }
}

pub fn compute_thumb(axis: &ScrollAxis, track_length: f64, min_thumb_length: f64) -> ThumbVisualState {
    let geometry = TrackGeometry::measure(axis.extent(), track_length, min_thumb_length);
    thumb_for_geometry(axis, &geometry)
}

pub fn thumb_for_geometry(axis: &ScrollAxis, geometry: &TrackGeometry) -> ThumbVisualState {
    let scrollable = axis.scrollable_range();
    if scrollable <= 0.0 || geometry.track_length <= 0.0 {
        return ThumbVisualState::full();
    }

    let length_fraction = (geometry.thumb_length / geometry.track_length).clamp(0.0, 1.0);
    let progress = (axis.position() / scrollable).clamp(0.0, 1.0);

    ThumbVisualState {
        offset_fraction: progress * (1.0 - length_fraction),
        length_fraction,
    }
}

pub fn pointer_delta_to_scroll_delta(pointer_delta: f64, movable_range: f64, scrollable_range: f64) -> f64 {
    pointer_delta * (scrollable_range / movable_range.max(1.0))
}

/// Absolute scroll position that puts the thumb's centre under the click.
pub fn track_click_to_position(
    click_offset: f64,
    thumb_length: f64,
    movable_range: f64,
    scrollable_range: f64,
) -> f64 {
    let thumb_start = click_offset - thumb_length / 2.0;
    let position = pointer_delta_to_scroll_delta(thumb_start, movable_range, scrollable_range);
    clamp_to_range(position, scrollable_range)
}

fn clamp_to_range(position: f64, range: f64) -> f64 {
    finite_or_zero(position).clamp(0.0, range.max(0.0))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
