mod column;
mod csv;

use std::collections::HashSet;

use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::{Error, Result};
use crate::interpolate::{InterpolateOptions, Overlay};
use crate::series::Series;
use crate::value::Value;

pub use column::{Column, TypedColumn};
pub use csv::{CsvReadOptions, read_csv};

/// Column-oriented table whose columns all have the same number of rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataFrame {
    columns: Vec<Column>,
    rows: usize,
}

/// Result of interpolating one float column of a frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFill {
    pub name: String,
    /// `None` for in-place calls.
    pub overlay: Option<Overlay>,
}

impl DataFrame {
    /// Builds a frame, checking that column lengths agree and names are unique.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFrame`] on a length mismatch or duplicate name.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let rows = columns.first().map_or(0, Column::len);
        let mut seen = HashSet::with_capacity(columns.len());
        for column in &columns {
            if column.len() != rows {
                return Err(Error::InvalidFrame {
                    details: format!(
                        "column '{}' has {} rows, expected {rows}",
                        column.name(),
                        column.len()
                    )
                    .into(),
                });
            }
            if !seen.insert(column.name()) {
                return Err(Error::InvalidFrame {
                    details: format!("duplicate column name '{}'", column.name()).into(),
                });
            }
        }
        Ok(Self { columns, rows })
    }

    #[must_use]
    pub const fn nrows(&self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn ncols(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name() == name)
    }

    /// Float column `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] or [`Error::TypeMismatch`].
    pub fn series(&self, name: &str) -> Result<&Series> {
        let column = self.column(name).ok_or_else(|| Error::UnknownColumn {
            name: name.to_owned(),
        })?;
        column.as_series().ok_or_else(|| Error::TypeMismatch {
            column: name.to_owned(),
            expected: "float64",
        })
    }

    /// Mutable float column `name`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] or [`Error::TypeMismatch`].
    pub fn series_mut(&mut self, name: &str) -> Result<&mut Series> {
        let column = self
            .columns
            .iter_mut()
            .find(|column| column.name() == name)
            .ok_or_else(|| Error::UnknownColumn {
                name: name.to_owned(),
            })?;
        column.as_series_mut().ok_or_else(|| Error::TypeMismatch {
            column: name.to_owned(),
            expected: "float64",
        })
    }

    /// Positional accessor: the cell at (`row`, `column`).
    ///
    /// Rows or columns outside the frame read as [`Value::Missing`].
    #[must_use]
    pub fn value(&self, row: usize, column: usize) -> Value<'_> {
        self.columns
            .get(column)
            .map_or(Value::Missing, |column| column.value(row))
    }

    /// Every cell of `row`, in column order.
    #[must_use]
    pub fn row(&self, row: usize) -> Vec<Value<'_>> {
        self.columns.iter().map(|column| column.value(row)).collect()
    }

    /// Interpolates the float column `name`.
    ///
    /// # Errors
    ///
    /// Lookup errors from [`DataFrame::series_mut`] plus any error from
    /// [`Series::interpolate`].
    pub fn interpolate_column(
        &mut self,
        token: &CancellationToken,
        name: &str,
        options: &InterpolateOptions,
    ) -> Result<Option<Overlay>> {
        self.series_mut(name)?.interpolate(token, options)
    }

    /// Interpolates every float column, one rayon task per column.
    ///
    /// All columns observe the same token; on error the first failure is
    /// returned and in-place fills already made by other columns stay.
    ///
    /// # Errors
    ///
    /// Any error from [`Series::interpolate`].
    pub fn interpolate_numeric(
        &mut self,
        token: &CancellationToken,
        options: &InterpolateOptions,
    ) -> Result<Vec<ColumnFill>> {
        self.fill_where(token, options, |_| true)
    }

    /// Interpolates the named float columns in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] or [`Error::TypeMismatch`] before any
    /// column is touched, then any error from [`Series::interpolate`].
    pub fn interpolate_columns<S: AsRef<str> + Sync>(
        &mut self,
        token: &CancellationToken,
        names: &[S],
        options: &InterpolateOptions,
    ) -> Result<Vec<ColumnFill>> {
        for name in names {
            self.series(name.as_ref())?;
        }
        self.fill_where(token, options, |series| {
            names.iter().any(|name| name.as_ref() == series.name())
        })
    }

    fn fill_where<F>(
        &mut self,
        token: &CancellationToken,
        options: &InterpolateOptions,
        select: F,
    ) -> Result<Vec<ColumnFill>>
    where
        F: Fn(&Series) -> bool + Sync,
    {
        let fills = self
            .columns
            .par_iter_mut()
            .filter_map(Column::as_series_mut)
            .filter(|series| select(series))
            .map(|series| {
                let overlay = series.interpolate(token, options)?;
                Ok(ColumnFill {
                    name: series.name().to_owned(),
                    overlay,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        debug!(columns = fills.len(), rows = self.rows, "frame interpolation finished");
        Ok(fills)
    }

    /// Writes overlays returned by a non-destructive call back into the frame.
    ///
    /// # Errors
    ///
    /// Returns lookup errors for fills naming columns the frame lacks.
    pub fn apply(&mut self, fills: &[ColumnFill]) -> Result<()> {
        for fill in fills {
            if let Some(overlay) = &fill.overlay {
                self.series_mut(&fill.name)?.apply(overlay);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Column::float64("a", vec![1.0, f64::NAN, 3.0]),
            Column::int64("b", vec![Some(1), None, Some(3)]),
            Column::utf8("c", vec![None, Some("x".into()), Some("y".into())]),
        ])
        .unwrap()
    }

    #[test]
    fn rejects_ragged_and_duplicate_columns() {
        let ragged = DataFrame::new(vec![
            Column::float64("a", vec![1.0]),
            Column::float64("b", vec![1.0, 2.0]),
        ]);
        assert!(matches!(ragged, Err(Error::InvalidFrame { .. })));

        let duplicate = DataFrame::new(vec![
            Column::float64("a", vec![1.0]),
            Column::int64("a", vec![Some(1)]),
        ]);
        assert!(matches!(duplicate, Err(Error::InvalidFrame { .. })));
    }

    #[test]
    fn positional_values() {
        let frame = frame();
        assert_eq!(frame.value(0, 0), Value::Float(1.0));
        assert_eq!(frame.value(1, 0), Value::Missing);
        assert_eq!(frame.value(2, 1), Value::Int64(3));
        assert_eq!(frame.value(1, 2), Value::Str("x".into()));
        assert_eq!(frame.value(0, 9), Value::Missing);
    }

    #[test]
    fn interpolating_non_float_column_is_a_type_error() {
        let mut frame = frame();
        let token = CancellationToken::new();
        let err = frame
            .interpolate_column(&token, "b", &InterpolateOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::TypeMismatch { .. }));
        let err = frame
            .interpolate_columns(&token, &["zz"], &InterpolateOptions::new())
            .unwrap_err();
        assert!(matches!(err, Error::UnknownColumn { .. }));
    }
}
