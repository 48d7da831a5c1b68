pub mod cancel;
pub mod error;
pub mod frame;
pub mod interpolate;
pub mod logger;
pub mod range;
pub mod series;
pub mod sinks;
pub mod value;

pub use crate::cancel::CancellationToken;
pub use crate::error::{Error, Result};
pub use crate::range::RowRange;
pub use frame::{Column, ColumnFill, CsvReadOptions, DataFrame, read_csv};
pub use interpolate::{
    FillSummary, Gap, GapKind, InterpolateOptions, LimitArea, LimitDirection, Method, Overlay,
};
pub use series::{Series, SharedSeries};
pub use sinks::{ColumnDescriptor, ColumnKind, CsvSink, ParquetSink, RowSink, SinkContext, export};
pub use value::Value;

/// Fills missing values in `series`.
///
/// In-place calls (`options.in_place`) modify the series and return `None`;
/// otherwise the series is untouched and the fills come back as an [`Overlay`].
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] or [`Error::InvalidOptions`] before any
/// change, or [`Error::Cancelled`] if `token` fires between gaps.
pub fn interpolate(
    token: &CancellationToken,
    series: &mut Series,
    options: &InterpolateOptions,
) -> Result<Option<Overlay>> {
    series.interpolate(token, options)
}
