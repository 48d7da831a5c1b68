use std::ops::RangeInclusive;

use serde::Serialize;

/// A non-missing value bounding a gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub index: usize,
    pub value: f64,
}

/// Shape of a gap relative to the anchors found inside the scanned range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GapKind {
    /// Anchored on both sides.
    Inner,
    /// Run at the start of the range, anchored only on the right.
    Leading,
    /// Run at the end of the range, anchored only on the left.
    Trailing,
    /// The whole range is missing.
    Unanchored,
}

impl GapKind {
    #[must_use]
    pub const fn is_inner(self) -> bool {
        matches!(self, Self::Inner)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inner => "inner",
            Self::Leading => "leading",
            Self::Trailing => "trailing",
            Self::Unanchored => "unanchored",
        }
    }
}

/// Maximal run of consecutive missing rows `first..=last`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gap {
    pub first: usize,
    pub last: usize,
    pub left: Option<Anchor>,
    pub right: Option<Anchor>,
}

impl Gap {
    #[must_use]
    pub const fn kind(&self) -> GapKind {
        match (self.left, self.right) {
            (Some(_), Some(_)) => GapKind::Inner,
            (None, Some(_)) => GapKind::Leading,
            (Some(_), None) => GapKind::Trailing,
            (None, None) => GapKind::Unanchored,
        }
    }

    /// Number of missing rows in the gap, always at least one.
    #[must_use]
    pub const fn row_count(&self) -> usize {
        self.last - self.first + 1
    }

    #[must_use]
    pub const fn rows(&self) -> RangeInclusive<usize> {
        self.first..=self.last
    }
}

#[inline]
pub(crate) fn is_missing(value: f64) -> bool {
    value.is_nan()
}

/// Forward scan over `start..=end` that yields gaps in increasing row order.
///
/// The scanner holds only its cursor, not the values, so a caller can commit
/// fills between calls to [`GapScanner::next_gap`]. Rows already visited are
/// never revisited, and each gap's left anchor is the right anchor of the
/// previous one (when one exists inside the range).
#[derive(Debug, Clone)]
pub struct GapScanner {
    cursor: usize,
    end: usize,
    previous: Option<Anchor>,
    finished: bool,
}

impl GapScanner {
    /// Creates a scanner over the inclusive bounds `start..=end`.
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            cursor: start,
            end,
            previous: None,
            finished: start > end,
        }
    }

    /// True once every row of the range has been visited.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Advances to the next run of missing values.
    ///
    /// `values` must be the same sequence (or one whose only changes are fills
    /// inside gaps already returned) on every call.
    #[cfg_attr(feature = "hotpath", hotpath::measure)]
    pub fn next_gap(&mut self, values: &[f64]) -> Option<Gap> {
        while !self.finished {
            let window = &values[self.cursor..=self.end];
            let Some(offset) = window.iter().position(|value| !is_missing(*value)) else {
                self.finished = true;
                return Some(Gap {
                    first: self.cursor,
                    last: self.end,
                    left: self.previous,
                    right: None,
                });
            };

            let index = self.cursor + offset;
            let anchor = Anchor {
                index,
                value: values[index],
            };
            let first = self.cursor;
            let left = self.previous.replace(anchor);
            if index == self.end {
                self.finished = true;
            } else {
                self.cursor = index + 1;
            }

            // Adjacent anchors enclose nothing.
            if offset > 0 {
                return Some(Gap {
                    first,
                    last: index - 1,
                    left,
                    right: Some(anchor),
                });
            }
        }
        None
    }
}

/// Read-only iterator over the gaps of a borrowed sequence.
pub struct Gaps<'a> {
    values: &'a [f64],
    scanner: GapScanner,
}

impl<'a> Gaps<'a> {
    pub(crate) const fn new(values: &'a [f64], start: usize, end: usize) -> Self {
        Self {
            values,
            scanner: GapScanner::new(start, end),
        }
    }

    pub(crate) const fn empty(values: &'a [f64]) -> Self {
        Self {
            values,
            scanner: GapScanner {
                cursor: 0,
                end: 0,
                previous: None,
                finished: true,
            },
        }
    }
}

impl Iterator for Gaps<'_> {
    type Item = Gap;

    fn next(&mut self) -> Option<Self::Item> {
        self.scanner.next_gap(self.values)
    }
}
