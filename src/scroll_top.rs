/// Tracks whether the back-to-top button should be shown.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollTopVisibility {
    threshold: f64,
    visible: bool,
}

impl ScrollTopVisibility {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            visible: false,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Returns the new visibility only when it changed.
    pub fn observe(&mut self, position: f64) -> Option<bool> {
        let visible = position > self.threshold;
        if visible == self.visible {
            return None;
        }

        self.visible = visible;
        Some(visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shows_past_threshold_and_hides_back() {
        let mut button = ScrollTopVisibility::new(500.0);

        assert_eq!(button.observe(200.0), None);
        assert_eq!(button.observe(500.0), None);
        assert_eq!(button.observe(501.0), Some(true));
        assert_eq!(button.observe(900.0), None);
        assert_eq!(button.observe(10.0), Some(false));
        assert!(!button.is_visible());
    }
}
