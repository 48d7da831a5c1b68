use std::collections::BTreeMap;

use serde::Serialize;

use super::scanner::is_missing;

/// Destination for fill values computed by the engine.
///
/// The engine only ever commits rows that were missing in [`FillSink::values`].
pub trait FillSink {
    /// Current view of the sequence being filled.
    fn values(&self) -> &[f64];

    /// Records `value` for `row`.
    fn commit(&mut self, row: usize, value: f64);
}

/// Writes fills straight into the caller's sequence.
pub struct InPlace<'a> {
    values: &'a mut [f64],
}

impl<'a> InPlace<'a> {
    pub const fn new(values: &'a mut [f64]) -> Self {
        Self { values }
    }
}

impl FillSink for InPlace<'_> {
    fn values(&self) -> &[f64] {
        &*self.values
    }

    fn commit(&mut self, row: usize, value: f64) {
        debug_assert!(is_missing(self.values[row]), "row {row} was not missing");
        self.values[row] = value;
    }
}

/// Collects fills in an [`Overlay`] and leaves the sequence untouched.
pub struct OverlayBuilder<'a> {
    values: &'a [f64],
    overlay: Overlay,
}

impl<'a> OverlayBuilder<'a> {
    pub const fn new(values: &'a [f64]) -> Self {
        Self {
            values,
            overlay: Overlay::new(),
        }
    }

    pub fn finish(self) -> Overlay {
        self.overlay
    }
}

impl FillSink for OverlayBuilder<'_> {
    fn values(&self) -> &[f64] {
        self.values
    }

    fn commit(&mut self, row: usize, value: f64) {
        debug_assert!(is_missing(self.values[row]), "row {row} was not missing");
        self.overlay.entries.insert(row, value);
    }
}

/// Sparse, row-ordered result of a non-destructive interpolation.
///
/// Holds an entry only for rows that were missing and received a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Overlay {
    entries: BTreeMap<usize, f64>,
}

impl Overlay {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn get(&self, row: usize) -> Option<f64> {
        self.entries.get(&row).copied()
    }

    /// Filled rows in increasing order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|(&row, &value)| (row, value))
    }

    pub fn rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }

    /// Writes every entry into `values`, skipping rows past its end.
    pub fn apply_to(&self, values: &mut [f64]) {
        for (row, value) in self.iter() {
            if let Some(slot) = values.get_mut(row) {
                *slot = value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlay_builder_leaves_values_alone() {
        let values = [1.0, f64::NAN, 3.0];
        let mut sink = OverlayBuilder::new(&values);
        sink.commit(1, 2.0);
        let overlay = sink.finish();
        assert!(values[1].is_nan());
        assert_eq!(overlay.get(1), Some(2.0));
        assert_eq!(overlay.get(0), None);
    }

    #[test]
    fn overlay_iterates_in_row_order() {
        let values = [f64::NAN; 6];
        let mut sink = OverlayBuilder::new(&values);
        sink.commit(4, 40.0);
        sink.commit(1, 10.0);
        let overlay = sink.finish();
        assert_eq!(overlay.rows().collect::<Vec<_>>(), vec![1, 4]);

        let mut target = vec![0.0; 3];
        overlay.apply_to(&mut target);
        assert_eq!(target, vec![0.0, 10.0, 0.0]);
    }

    #[test]
    fn in_place_overwrites_slot() {
        let mut values = [5.0, f64::NAN];
        let mut sink = InPlace::new(&mut values);
        sink.commit(1, 6.0);
        assert_eq!(values, [5.0, 6.0]);
    }
}
