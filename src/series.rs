use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::interpolate::{self, Gaps, InterpolateOptions, Overlay, is_missing};
use crate::range::RowRange;

/// Named, ordered column of `f64` values where NaN marks a missing row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    name: String,
    values: Vec<f64>,
}

impl Series {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Builds a series where `None` becomes the missing marker.
    pub fn from_options<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::new(
            name,
            values
                .into_iter()
                .map(|value| value.unwrap_or(f64::NAN))
                .collect(),
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `row`, or `None` when the row is missing or out of bounds.
    #[must_use]
    pub fn value(&self, row: usize) -> Option<f64> {
        self.values
            .get(row)
            .copied()
            .filter(|value| !is_missing(*value))
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| is_missing(**value)).count()
    }

    /// Gaps inside `range` (the whole series when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if the range does not resolve.
    pub fn gaps(&self, range: Option<RowRange>) -> Result<Gaps<'_>> {
        interpolate::gaps(&self.values, range)
    }

    /// Fills gaps according to `options`.
    ///
    /// With `options.in_place` the series is modified and `None` is returned;
    /// otherwise the series is left as is and the fills come back as an overlay.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] or [`Error::InvalidOptions`] before any
    /// change, or [`Error::Cancelled`] with earlier in-place fills kept.
    pub fn interpolate(
        &mut self,
        token: &CancellationToken,
        options: &InterpolateOptions,
    ) -> Result<Option<Overlay>> {
        interpolate::interpolate_slice(token, &mut self.values, options)
    }

    /// Computes fills without modifying the series, whatever `options.in_place` says.
    ///
    /// # Errors
    ///
    /// Same as [`Series::interpolate`].
    pub fn interpolated(
        &self,
        token: &CancellationToken,
        options: &InterpolateOptions,
    ) -> Result<Overlay> {
        interpolate::overlay_values(token, &self.values, options)
    }

    /// Writes an overlay produced for this series back into it.
    pub fn apply(&mut self, overlay: &Overlay) {
        overlay.apply_to(&mut self.values);
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Self::new(String::new(), values)
    }
}

/// Series shared between threads behind a reader/writer lock.
///
/// Callers that need several operations under one acquisition take a guard
/// with [`SharedSeries::write`] or [`SharedSeries::read`] and call
/// [`Series::interpolate`] on it; the guard is released when dropped, on every
/// exit path.
#[derive(Debug, Clone, Default)]
pub struct SharedSeries {
    inner: Arc<RwLock<Series>>,
}

impl SharedSeries {
    #[must_use]
    pub fn new(series: Series) -> Self {
        Self {
            inner: Arc::new(RwLock::new(series)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Series> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Series> {
        self.inner.write()
    }

    /// Runs one interpolation call while holding the lock for its full duration.
    ///
    /// In-place calls hold the write lock; overlay calls only the read lock, so
    /// other readers proceed concurrently. A caller that already holds a guard
    /// sets `options.skip_locking` and goes through
    /// [`SharedSeries::interpolate_locked`] or
    /// [`SharedSeries::interpolated_locked`] instead; this method never
    /// acquires the lock on its behalf.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] when `skip_locking` is set, plus any
    /// error from [`Series::interpolate`].
    pub fn interpolate(
        &self,
        token: &CancellationToken,
        options: &InterpolateOptions,
    ) -> Result<Option<Overlay>> {
        if options.skip_locking {
            return Err(Error::InvalidOptions {
                details: "skip_locking requires a caller-held guard; use interpolate_locked".into(),
            });
        }
        if options.in_place {
            self.inner.write().interpolate(token, options)
        } else {
            self.inner.read().interpolated(token, options).map(Some)
        }
    }

    /// Interpolates through a write guard the caller already holds.
    ///
    /// The lock is not touched, so the caller may run several operations
    /// under one acquisition.
    ///
    /// # Errors
    ///
    /// Any error from [`Series::interpolate`].
    pub fn interpolate_locked(
        guard: &mut RwLockWriteGuard<'_, Series>,
        token: &CancellationToken,
        options: &InterpolateOptions,
    ) -> Result<Option<Overlay>> {
        guard.interpolate(token, options)
    }

    /// Computes an overlay through a read guard the caller already holds.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidOptions`] for in-place options, which need a
    /// write guard, plus any error from [`Series::interpolated`].
    pub fn interpolated_locked(
        guard: &RwLockReadGuard<'_, Series>,
        token: &CancellationToken,
        options: &InterpolateOptions,
    ) -> Result<Overlay> {
        if options.in_place {
            return Err(Error::InvalidOptions {
                details: "in-place interpolation needs a write guard".into(),
            });
        }
        guard.interpolated(token, options)
    }

    /// Unwraps the series if this is the last handle.
    ///
    /// # Errors
    ///
    /// Returns the handle back when other clones are still alive.
    pub fn try_unwrap(self) -> std::result::Result<Series, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self { inner })
    }
}
