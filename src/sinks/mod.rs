mod csv;
mod parquet;
mod schema;

use tracing::debug;

use crate::cancel::CancellationToken;
use crate::error::Result;
use crate::frame::DataFrame;
use crate::range::RowRange;
use crate::value::Value;

pub use csv::CsvSink;
pub use parquet::ParquetSink;
pub use schema::{ColumnDescriptor, ColumnKind};

/// Describes the exported table to sinks during initialisation.
pub struct SinkContext<'a> {
    pub columns: &'a [ColumnDescriptor],
    /// Number of rows the export will write.
    pub row_count: usize,
}

impl<'a> SinkContext<'a> {
    #[must_use]
    pub const fn new(columns: &'a [ColumnDescriptor], row_count: usize) -> Self {
        Self { columns, row_count }
    }
}

/// Trait implemented by sinks that consume frame rows.
pub trait RowSink {
    /// Called before any rows are written to allow the sink to initialise internal state.
    ///
    /// # Errors
    ///
    /// Returns an error if the sink is already in use or cannot build its schema.
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()>;

    /// Invoked for every exported row, values in column order.
    ///
    /// # Errors
    ///
    /// Returns an error if the row does not match the schema given to `begin`.
    fn write_row(&mut self, row: &[Value<'_>]) -> Result<()>;

    /// Called once all rows have been forwarded to the sink.
    ///
    /// # Errors
    ///
    /// Returns an error if buffered rows cannot be written.
    fn finish(&mut self) -> Result<()>;
}

/// Streams the rows of `frame` selected by `range` through `sink`.
///
/// The column schema is derived once from the frame's column types. An empty
/// frame still produces `begin` and `finish`, so sinks emit a valid empty file.
/// The token is checked before every row; when it fires the sink is left
/// unfinished and [`Error::Cancelled`](crate::Error::Cancelled) is returned.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`](crate::Error::InvalidRange) before the sink
/// is touched, [`Error::Cancelled`](crate::Error::Cancelled), or any sink error.
pub fn export<S: RowSink + ?Sized>(
    token: &CancellationToken,
    frame: &DataFrame,
    sink: &mut S,
    range: Option<RowRange>,
) -> Result<usize> {
    let bounds = range.unwrap_or_default().limits(frame.nrows())?;
    let columns = ColumnDescriptor::describe(frame);
    let rows = bounds.map_or(0, |(start, end)| end - start + 1);

    sink.begin(SinkContext::new(&columns, rows))?;
    if let Some((start, end)) = bounds {
        for row in start..=end {
            token.check()?;
            sink.write_row(&frame.row(row))?;
        }
    }
    sink.finish()?;

    debug!(rows, columns = columns.len(), "export finished");
    Ok(rows)
}
