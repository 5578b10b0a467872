use crate::geometry::Axis;
use crate::scrollbar::{ScrollbarConfig, TrackJump};
use crate::telemetry::LogLevel;
use serde::Serialize;

const DEFAULT_MIN_THUMB_LENGTH: f64 = 30.0;
const DEFAULT_RESIZE_DEBOUNCE_MS: u32 = 200;
const DEFAULT_DRAG_THRESHOLD: f64 = 15.0;
const DEFAULT_PANEL_DRAG_MULTIPLIER: f64 = 1.5;
const DEFAULT_SCROLL_TOP_THRESHOLD: f64 = 500.0;
const DEFAULT_COARSE_POINTER: CoarsePointerPolicy = CoarsePointerPolicy::Disable;
const DEFAULT_TRACK_JUMP: TrackJump = TrackJump::Smooth;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const MIN_THUMB_LENGTH_BOUNDS: (f64, f64) = (4.0, 200.0);
const RESIZE_DEBOUNCE_MS_BOUNDS: (u32, u32) = (0, 2_000);
const DRAG_THRESHOLD_BOUNDS: (f64, f64) = (1.0, 100.0);
const PANEL_DRAG_MULTIPLIER_BOUNDS: (f64, f64) = (0.25, 5.0);
const SCROLL_TOP_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 10_000.0);

/// Whether drag features stay on for touch-first devices
/// (`(hover: none) and (pointer: coarse)`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoarsePointerPolicy {
    Disable,
    Enable,
}

/// Browser capabilities probed once at boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub coarse_pointer: bool,
    pub pointer_capture: bool,
    pub reduced_motion: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InteractionConfig {
    pub min_thumb_length: f64,
    pub resize_debounce_ms: u32,
    pub drag_threshold: f64,
    pub panel_drag_multiplier: f64,
    pub scroll_top_threshold: f64,
    pub coarse_pointer: CoarsePointerPolicy,
    pub track_jump: TrackJump,
    pub log_level: LogLevel,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_thumb_length: DEFAULT_MIN_THUMB_LENGTH,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            panel_drag_multiplier: DEFAULT_PANEL_DRAG_MULTIPLIER,
            scroll_top_threshold: DEFAULT_SCROLL_TOP_THRESHOLD,
            coarse_pointer: DEFAULT_COARSE_POINTER,
            track_jump: DEFAULT_TRACK_JUMP,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl InteractionConfig {
    /// Reads every knob through `lookup` (a `data-*` attribute reader in the
    /// browser). Missing, malformed and out-of-range values fall back to the
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let min_thumb_length = parse_f64_with_bounds(
            lookup("min-thumb-length"),
            DEFAULT_MIN_THUMB_LENGTH,
            MIN_THUMB_LENGTH_BOUNDS,
        );
        let resize_debounce_ms = parse_u32_with_bounds(
            lookup("resize-debounce-ms"),
            DEFAULT_RESIZE_DEBOUNCE_MS,
            RESIZE_DEBOUNCE_MS_BOUNDS,
        );
        let drag_threshold =
            parse_f64_with_bounds(lookup("drag-threshold"), DEFAULT_DRAG_THRESHOLD, DRAG_THRESHOLD_BOUNDS);
        let panel_drag_multiplier = parse_f64_with_bounds(
            lookup("panel-drag-multiplier"),
            DEFAULT_PANEL_DRAG_MULTIPLIER,
            PANEL_DRAG_MULTIPLIER_BOUNDS,
        );
        let scroll_top_threshold = parse_f64_with_bounds(
            lookup("scroll-top-threshold"),
            DEFAULT_SCROLL_TOP_THRESHOLD,
            SCROLL_TOP_THRESHOLD_BOUNDS,
        );
        let coarse_pointer = match non_empty(lookup("coarse-pointer")).as_deref() {
            Some("enable") => CoarsePointerPolicy::Enable,
            Some("disable") => CoarsePointerPolicy::Disable,
            _ => DEFAULT_COARSE_POINTER,
        };
        let track_jump = match non_empty(lookup("track-jump")).as_deref() {
            Some("instant") => TrackJump::Instant,
            Some("smooth") => TrackJump::Smooth,
            _ => DEFAULT_TRACK_JUMP,
        };
        let log_level = non_empty(lookup("log-level"))
            .and_then(|value| LogLevel::parse(&value))
            .unwrap_or(DEFAULT_LOG_LEVEL);

        Self {
            min_thumb_length,
            resize_debounce_ms,
            drag_threshold,
            panel_drag_multiplier,
            scroll_top_threshold,
            coarse_pointer,
            track_jump,
            log_level,
        }
    }

    /// Drag features (thumb drags, panel drags, marquee drags) are on unless
    /// the device is coarse-pointer-only and the policy says to disable.
    pub fn drag_enabled(&self, capabilities: &Capabilities) -> bool {
        !(capabilities.coarse_pointer && self.coarse_pointer == CoarsePointerPolicy::Disable)
    }

    pub fn scrollbar(&self, axis: Axis) -> ScrollbarConfig {
        ScrollbarConfig {
            axis,
            min_thumb_length: self.min_thumb_length,
            track_jump: self.track_jump,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_ascii_lowercase())
        .filter(|value| !value.is_empty())
}

fn parse_f64_with_bounds(value: Option<String>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn parse_u32_with_bounds(value: Option<String>, default: u32, bounds: (u32, u32)) -> u32 {
    value
        .and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> InteractionConfig {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        InteractionConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn empty_lookup_yields_defaults() {
        assert_eq!(config_from(&[]), InteractionConfig::default());
    }

    #[test]
    fn valid_values_are_applied() {
        let config = config_from(&[
            ("min-thumb-length", "48"),
            ("resize-debounce-ms", " 120 "),
            ("drag-threshold", "20"),
            ("track-jump", "Instant"),
            ("coarse-pointer", "enable"),
            ("log-level", "debug"),
        ]);

        assert_eq!(config.min_thumb_length, 48.0);
        assert_eq!(config.resize_debounce_ms, 120);
        assert_eq!(config.drag_threshold, 20.0);
        assert_eq!(config.track_jump, TrackJump::Instant);
        assert_eq!(config.coarse_pointer, CoarsePointerPolicy::Enable);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn out_of_range_and_malformed_values_fall_back() {
        let config = config_from(&[
            ("min-thumb-length", "1"),
            ("resize-debounce-ms", "-5"),
            ("panel-drag-multiplier", "fast"),
            ("scroll-top-threshold", "NaN"),
            ("track-jump", "teleport"),
        ]);

        assert_eq!(config.min_thumb_length, DEFAULT_MIN_THUMB_LENGTH);
        assert_eq!(config.resize_debounce_ms, DEFAULT_RESIZE_DEBOUNCE_MS);
        assert_eq!(config.panel_drag_multiplier, DEFAULT_PANEL_DRAG_MULTIPLIER);
        assert_eq!(config.scroll_top_threshold, DEFAULT_SCROLL_TOP_THRESHOLD);
        assert_eq!(config.track_jump, DEFAULT_TRACK_JUMP);
    }

    #[test]
    fn coarse_pointer_policy_gates_drag() {
        let touch = Capabilities {
            coarse_pointer: true,
            ..Capabilities::default()
        };
        let mouse = Capabilities::default();

        let disabling = InteractionConfig::default();
        assert!(!disabling.drag_enabled(&touch));
        assert!(disabling.drag_enabled(&mouse));

        let enabling = config_from(&[("coarse-pointer", "enable")]);
        assert!(enabling.drag_enabled(&touch));
    }

    #[test]
    fn scrollbar_config_carries_shared_knobs() {
        let config = config_from(&[("min-thumb-length", "40")]);
        let scrollbar = config.scrollbar(Axis::Horizontal);

        assert_eq!(scrollbar.axis, Axis::Horizontal);
        assert_eq!(scrollbar.min_thumb_length, 40.0);
        assert_eq!(scrollbar.track_jump, TrackJump::Smooth);
    }

    #[test]
    fn resolved_config_serializes_for_boot_log() {
        let value = serde_json::to_value(InteractionConfig::default()).expect("serializable");

        assert_eq!(value["coarse_pointer"], "disable");
        assert_eq!(value["track_jump"], "smooth");
        assert_eq!(value["log_level"], "info");
    }
}
