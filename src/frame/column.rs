use std::borrow::Cow;

use time::OffsetDateTime;

use crate::series::Series;
use crate::value::Value;

/// Named column of optional values.
#[derive(Debug, Clone, PartialEq)]
pub struct TypedColumn<T> {
    name: String,
    values: Vec<Option<T>>,
}

impl<T> TypedColumn<T> {
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<Option<T>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
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

    #[must_use]
    pub fn get(&self, row: usize) -> Option<&T> {
        self.values.get(row).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn values(&self) -> &[Option<T>] {
        &self.values
    }
}

/// One typed column of a [`DataFrame`](super::DataFrame).
///
/// Only `Float64` columns take part in interpolation.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float64(Series),
    Int64(TypedColumn<i64>),
    Utf8(TypedColumn<String>),
    Timestamp(TypedColumn<OffsetDateTime>),
}

impl Column {
    #[must_use]
    pub fn float64(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self::Float64(Series::new(name, values))
    }

    #[must_use]
    pub fn int64(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::Int64(TypedColumn::new(name, values))
    }

    #[must_use]
    pub fn utf8(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self::Utf8(TypedColumn::new(name, values))
    }

    #[must_use]
    pub fn timestamp(name: impl Into<String>, values: Vec<Option<OffsetDateTime>>) -> Self {
        Self::Timestamp(TypedColumn::new(name, values))
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Float64(series) => series.name(),
            Self::Int64(column) => column.name(),
            Self::Utf8(column) => column.name(),
            Self::Timestamp(column) => column.name(),
        }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        match self {
            Self::Float64(series) => series.len(),
            Self::Int64(column) => column.len(),
            Self::Utf8(column) => column.len(),
            Self::Timestamp(column) => column.len(),
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Float64(_) => "float64",
            Self::Int64(_) => "int64",
            Self::Utf8(_) => "utf8",
            Self::Timestamp(_) => "timestamp",
        }
    }

    /// Cell at `row`; out-of-range rows read as missing.
    #[must_use]
    pub fn value(&self, row: usize) -> Value<'_> {
        match self {
            Self::Float64(series) => series.value(row).into(),
            Self::Int64(column) => column.get(row).map_or(Value::Missing, |v| Value::Int64(*v)),
            Self::Utf8(column) => column
                .get(row)
                .map_or(Value::Missing, |text| Value::Str(Cow::Borrowed(text))),
            Self::Timestamp(column) => column
                .get(row)
                .map_or(Value::Missing, |ts| Value::Timestamp(*ts)),
        }
    }

    #[must_use]
    pub const fn as_series(&self) -> Option<&Series> {
        match self {
            Self::Float64(series) => Some(series),
            _ => None,
        }
    }

    pub const fn as_series_mut(&mut self) -> Option<&mut Series> {
        match self {
            Self::Float64(series) => Some(series),
            _ => None,
        }
    }

    /// Number of rows reading as [`Value::Missing`].
    #[must_use]
    pub fn missing_count(&self) -> usize {
        match self {
            Self::Float64(series) => series.missing_count(),
            Self::Int64(column) => column.values().iter().filter(|v| v.is_none()).count(),
            Self::Utf8(column) => column.values().iter().filter(|v| v.is_none()).count(),
            Self::Timestamp(column) => column.values().iter().filter(|v| v.is_none()).count(),
        }
    }
}
