use std::iter::Chain;
use std::ops::Range;

use super::options::LimitDirection;

/// Gap-local offsets (`0` is the row after the left anchor) that may be filled.
///
/// The window is a head run counted from the left anchor plus a tail run
/// counted back from the right anchor; the two never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillWindow {
    len: usize,
    head: usize,
    tail: usize,
}

impl FillWindow {
    #[must_use]
    pub const fn new(len: usize, limit: Option<usize>, direction: LimitDirection) -> Self {
        let (head, tail) = match limit {
            Some(limit) if limit < len => match direction {
                LimitDirection::Forward => (limit, 0),
                LimitDirection::Backward => (0, limit),
                LimitDirection::Both => (limit.div_ceil(2), limit / 2),
            },
            _ => (len, 0),
        };
        Self { len, head, tail }
    }

    #[must_use]
    pub fn offsets(&self) -> Chain<Range<usize>, Range<usize>> {
        (0..self.head).chain(self.len - self.tail..self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offsets(len: usize, limit: Option<usize>, direction: LimitDirection) -> Vec<usize> {
        FillWindow::new(len, limit, direction).offsets().collect()
    }

    #[test]
    fn unlimited_fills_everything() {
        assert_eq!(offsets(4, None, LimitDirection::Backward), vec![0, 1, 2, 3]);
        assert_eq!(offsets(4, None, LimitDirection::Both), vec![0, 1, 2, 3]);
    }

    #[test]
    fn limit_counts_from_the_requested_end() {
        assert_eq!(offsets(5, Some(2), LimitDirection::Forward), vec![0, 1]);
        assert_eq!(offsets(5, Some(2), LimitDirection::Backward), vec![3, 4]);
    }

    #[test]
    fn both_splits_budget_favouring_forward() {
        assert_eq!(offsets(6, Some(3), LimitDirection::Both), vec![0, 1, 5]);
        assert_eq!(offsets(6, Some(4), LimitDirection::Both), vec![0, 1, 4, 5]);
        assert_eq!(offsets(6, Some(1), LimitDirection::Both), vec![0]);
    }

    #[test]
    fn limit_at_or_above_gap_length_fills_everything() {
        assert_eq!(offsets(3, Some(3), LimitDirection::Backward), vec![0, 1, 2]);
        assert_eq!(offsets(3, Some(10), LimitDirection::Both), vec![0, 1, 2]);
    }
}
