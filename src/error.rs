use std::borrow::Cow;
use std::fmt;
use std::io;

use parquet::errors::ParquetError;

/// Result type used across the interpolation engine and its export sinks.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type surfaced by the engine, the frame layer and the sinks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O failure while reading input or writing an export.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// Row range request that does not resolve to valid bounds.
    #[error("invalid row range {} for {len} rows", Bounds(.start, .end))]
    InvalidRange {
        start: Option<isize>,
        end: Option<isize>,
        len: usize,
    },

    /// Interpolation options that cannot be honoured.
    #[error("invalid interpolation options: {details}")]
    InvalidOptions { details: Cow<'static, str> },

    /// The cancellation token fired while work was in progress.
    #[error("operation cancelled")]
    Cancelled,

    /// Column lookup by name failed.
    #[error("column '{name}' not found")]
    UnknownColumn { name: String },

    /// Column exists but does not hold the expected type.
    #[error("column '{column}' is not a {expected} column")]
    TypeMismatch {
        column: String,
        expected: &'static str,
    },

    /// Frame construction or CSV loading produced an inconsistent table.
    #[error("invalid frame: {details}")]
    InvalidFrame { details: Cow<'static, str> },

    /// Failure encountered while reading or writing delimited text.
    #[error("csv error: {details}")]
    Csv { details: Cow<'static, str> },

    /// Failure encountered while interacting with the Parquet writer.
    #[error("parquet error: {details}")]
    Parquet { details: Cow<'static, str> },

    /// Sink misuse or a feature the sinks do not provide.
    #[error("unsupported: {feature}")]
    Unsupported { feature: Cow<'static, str> },
}

impl Error {
    pub(crate) const fn invalid_range(start: Option<isize>, end: Option<isize>, len: usize) -> Self {
        Self::InvalidRange { start, end, len }
    }
}

impl From<ParquetError> for Error {
    fn from(err: ParquetError) -> Self {
        Self::Parquet {
            details: Cow::Owned(err.to_string()),
        }
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Self::Csv {
            details: Cow::Owned(err.to_string()),
        }
    }
}

/// Display helper for a partially specified range.
struct Bounds<'a>(&'a Option<isize>, &'a Option<isize>);

impl fmt::Display for Bounds<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        match self.0 {
            Some(start) => write!(f, "{start}")?,
            None => f.write_str("..")?,
        }
        f.write_str(", ")?;
        match self.1 {
            Some(end) => write!(f, "{end}")?,
            None => f.write_str("..")?,
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_range_message_names_bounds() {
        let err = Error::invalid_range(Some(3), None, 2);
        assert_eq!(err.to_string(), "invalid row range [3, ..] for 2 rows");
    }
}
