use serde::Serialize;

use crate::frame::{Column, DataFrame};

/// Storage kind a sink uses for one exported column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Double,
    Int64,
    Utf8,
    /// Milliseconds since the Unix epoch, UTC.
    TimestampMillis,
}

impl ColumnKind {
    #[must_use]
    pub const fn of(column: &Column) -> Self {
        match column {
            Column::Float64(_) => Self::Double,
            Column::Int64(_) => Self::Int64,
            Column::Utf8(_) => Self::Utf8,
            Column::Timestamp(_) => Self::TimestampMillis,
        }
    }
}

/// Name and storage kind of one exported column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    #[must_use]
    pub fn describe(frame: &DataFrame) -> Vec<Self> {
        frame
            .columns()
            .iter()
            .map(|column| Self::new(column.name(), ColumnKind::of(column)))
            .collect()
    }
}
