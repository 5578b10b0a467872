use crate::animation::{Easing, Tween};

const COUNT_DURATION_MS: f64 = 2_500.0;

/// How a KPI figure is printed while it counts up.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CounterFormat {
    Integer,
    /// One decimal place; intermediate values snap to 0.1.
    Tenths,
}

impl CounterFormat {
    pub fn for_target(target: f64) -> Self {
        if target.fract() == 0.0 {
            Self::Integer
        } else {
            Self::Tenths
        }
    }

    pub fn render(self, value: f64) -> String {
        match self {
            Self::Integer => format!("{}", value.round() as i64),
            Self::Tenths => format!("{:.1}", (value * 10.0).round() / 10.0),
        }
    }
}

/// Parses a `data-target` value and returns the count-up tween for it.
pub fn counter_tween(raw_target: &str) -> Option<(Tween, CounterFormat)> {
    let target = raw_target.trim().parse::<f64>().ok().filter(|value| value.is_finite())?;
    Some((
        Tween::new(0.0, target, COUNT_DURATION_MS, Easing::Power2Out),
        CounterFormat::for_target(target),
    ))
}
