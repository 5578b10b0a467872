use crate::telemetry::{log_event, LogLevel};
use thiserror::Error;

/// Failures that stop a single widget from mounting. None of them propagate
/// past the widget that hit them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("missing {role} element (`{selector}`)")]
    MissingElement {
        role: &'static str,
        selector: &'static str,
    },
    #[error("no browser window is available")]
    NoWindow,
    #[error("javascript call `{call}` failed")]
    Js { call: &'static str },
    #[error("smooth-scroll engine is not loaded")]
    ScrollEngineUnavailable,
}

pub fn require<T>(
    value: Option<T>,
    role: &'static str,
    selector: &'static str,
) -> Result<T, InteractionError> {
    value.ok_or(InteractionError::MissingElement { role, selector })
}

/// Logs the reason a widget stays inert and hands back `None` so the caller
/// can keep going with the next widget.
pub fn disable_on_error<T>(widget: &'static str, result: Result<T, InteractionError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            log_event(
                LogLevel::Warn,
                "widget_disabled",
                serde_json::json!({
                    "widget": widget,
                    "reason": error.to_string(),
                }),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_names_the_missing_part() {
        let error = require::<u8>(None, "thumb", ".scroll-bar-thumb").expect_err("absent element");

        assert_eq!(
            error,
            InteractionError::MissingElement {
                role: "thumb",
                selector: ".scroll-bar-thumb",
            }
        );
        assert_eq!(error.to_string(), "missing thumb element (`.scroll-bar-thumb`)");
    }

    #[test]
    fn require_passes_present_values_through() {
        assert_eq!(require(Some(7), "track", ".scroll-bar-track"), Ok(7));
    }

    #[test]
    fn disabled_widget_yields_none_without_panicking() {
        let mounted = disable_on_error::<()>("experience_panel", Err(InteractionError::NoWindow));
        assert!(mounted.is_none());

        assert_eq!(disable_on_error("ticker", Ok(3)), Some(3));
    }
}
