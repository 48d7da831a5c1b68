use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Inclusive row bounds, either of which may be omitted or counted from the end.
///
/// `start: None` means the first row and `end: None` the last. Negative values
/// are relative to the length, so `-1` names the last row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RowRange {
    pub start: Option<isize>,
    pub end: Option<isize>,
}

impl RowRange {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// Range covering `start..=end`.
    #[must_use]
    pub const fn rows(start: isize, end: isize) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    #[must_use]
    pub const fn with_start(mut self, start: isize) -> Self {
        self.start = Some(start);
        self
    }

    #[must_use]
    pub const fn with_end(mut self, end: isize) -> Self {
        self.end = Some(end);
        self
    }

    /// Resolves the range against a sequence of `len` rows.
    ///
    /// Returns `Ok(None)` for an empty sequence, since there is nothing to visit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] when a bound falls outside `0..len` after
    /// resolution or when `start > end`.
    pub fn limits(&self, len: usize) -> Result<Option<(usize, usize)>> {
        if len == 0 {
            return Ok(None);
        }
        let invalid = || Error::invalid_range(self.start, self.end, len);

        let start = match self.start {
            None => 0,
            Some(offset) => resolve(offset, len).ok_or_else(invalid)?,
        };
        let end = match self.end {
            None => len - 1,
            Some(offset) => resolve(offset, len).ok_or_else(invalid)?,
        };

        if start > end {
            return Err(invalid());
        }
        Ok(Some((start, end)))
    }

    /// Number of rows the range covers in a sequence of `len` rows.
    ///
    /// # Errors
    ///
    /// Propagates [`RowRange::limits`] failures.
    pub fn row_count(&self, len: usize) -> Result<usize> {
        Ok(self.limits(len)?.map_or(0, |(start, end)| end - start + 1))
    }
}

fn resolve(offset: isize, len: usize) -> Option<usize> {
    let resolved = if offset < 0 {
        len.checked_sub(offset.unsigned_abs())?
    } else {
        offset.unsigned_abs()
    };
    (resolved < len).then_some(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_bounds_cover_everything() {
        assert_eq!(RowRange::new().limits(5).unwrap(), Some((0, 4)));
    }

    #[test]
    fn negative_bounds_count_from_end() {
        let range = RowRange::new().with_start(-3).with_end(-1);
        assert_eq!(range.limits(10).unwrap(), Some((7, 9)));
        assert_eq!(range.row_count(10).unwrap(), 3);
    }

    #[test]
    fn empty_sequence_has_no_work() {
        assert_eq!(RowRange::rows(4, 2).limits(0).unwrap(), None);
        assert_eq!(RowRange::new().row_count(0).unwrap(), 0);
    }

    #[test]
    fn rejects_inverted_and_out_of_bounds() {
        assert!(matches!(
            RowRange::rows(3, 1).limits(5),
            Err(Error::InvalidRange { .. })
        ));
        assert!(matches!(
            RowRange::new().with_end(5).limits(5),
            Err(Error::InvalidRange { len: 5, .. })
        ));
        assert!(matches!(
            RowRange::new().with_start(-6).limits(5),
            Err(Error::InvalidRange { .. })
        ));
    }

    #[test]
    fn single_row_range() {
        assert_eq!(RowRange::rows(-1, -1).limits(4).unwrap(), Some((3, 3)));
    }
}
