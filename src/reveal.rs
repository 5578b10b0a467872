use std::collections::HashSet;

pub const REVEAL_THRESHOLD: f64 = 0.1;
pub const REVEAL_SELECTOR: &str = ".reveal-up, .reveal-side, .reveal-text";

#[derive(Clone, Debug, Default)]
pub struct RevealTracker {
    total: usize,
    revealed: HashSet<usize>,
}

impl RevealTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            revealed: HashSet::new(),
        }
    }

    /// True the first time `index` intersects; the caller then reveals the
    /// element and stops observing it.
    pub fn intersected(&mut self, index: usize, intersecting: bool) -> bool {
        intersecting && index < self.total && self.revealed.insert(index)
    }

    /// Reveals everything at once, for reduced motion. Returns the indices
    /// still hidden.
    pub fn reveal_all(&mut self) -> Vec<usize> {
        let pending: Vec<usize> = (0..self.total).filter(|i| !self.revealed.contains(i)).collect();
        self.revealed.extend(pending.iter().copied());
        pending
    }

    pub fn is_complete(&self) -> bool {
        self.revealed.len() == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_section_reveals_once() {
        let mut tracker = RevealTracker::new(3);

        assert!(tracker.intersected(1, true));
        assert!(!tracker.intersected(1, true));
        assert!(!tracker.is_complete());
    }

    #[test]
    fn leaving_the_viewport_does_not_reveal() {
        let mut tracker = RevealTracker::new(2);

        assert!(!tracker.intersected(0, false));
        assert!(tracker.intersected(0, true));
    }

    #[test]
    fn unknown_index_is_ignored() {
        let mut tracker = RevealTracker::new(2);
        assert!(!tracker.intersected(5, true));
    }

    #[test]
    fn reveal_all_skips_already_revealed() {
        let mut tracker = RevealTracker::new(3);
        tracker.intersected(0, true);

        assert_eq!(tracker.reveal_all(), vec![1, 2]);
        assert!(tracker.is_complete());
        assert!(tracker.reveal_all().is_empty());
    }
}
