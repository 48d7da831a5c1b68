use std::borrow::Cow;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

/// A single cell read from a [`DataFrame`](crate::frame::DataFrame) by position.
#[derive(Debug, Clone, PartialEq)]
pub enum Value<'a> {
    /// 64-bit floating point number (never NaN; NaN reads as `Missing`).
    Float(f64),
    /// 64-bit signed integer.
    Int64(i64),
    /// UTF-8 string.
    Str(Cow<'a, str>),
    /// Point in time with millisecond significance on export.
    Timestamp(OffsetDateTime),
    /// No value at this row.
    Missing,
}

impl Value<'_> {
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }
}

impl From<Option<f64>> for Value<'_> {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Value::Missing, Value::Float)
    }
}

/// Renders a timestamp the way text sinks write it.
pub(crate) fn format_rfc3339(datetime: &OffsetDateTime) -> Result<String> {
    datetime.format(&Rfc3339).map_err(|err| Error::Unsupported {
        feature: Cow::Owned(format!("timestamp {datetime} cannot be rendered: {err}")),
    })
}
