use std::io::Read;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::error::{Error, Result};

use super::{Column, DataFrame};

const DEFAULT_MISSING: [&str; 4] = ["", "NA", "NaN", "null"];

/// Declared column types and missing tokens for [`read_csv`].
///
/// Columns not named in any list are parsed as `f64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsvReadOptions {
    delimiter: u8,
    text_columns: Vec<String>,
    int_columns: Vec<String>,
    timestamp_columns: Vec<String>,
    missing_tokens: Vec<String>,
}

impl Default for CsvReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            text_columns: Vec::new(),
            int_columns: Vec::new(),
            timestamp_columns: Vec::new(),
            missing_tokens: DEFAULT_MISSING.iter().map(|&t| t.to_owned()).collect(),
        }
    }
}

impl CsvReadOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub fn with_text_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.text_columns = names.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_int_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.int_columns = names.into_iter().map(Into::into).collect();
        self
    }

    /// Columns holding RFC 3339 timestamps.
    #[must_use]
    pub fn with_timestamp_columns<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.timestamp_columns = names.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the tokens read as missing (by default empty, `NA`, `NaN`, `null`).
    #[must_use]
    pub fn with_missing_tokens<I, S>(mut self, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.missing_tokens = tokens.into_iter().map(Into::into).collect();
        self
    }

    fn is_missing(&self, field: &str) -> bool {
        let field = field.trim();
        self.missing_tokens.iter().any(|token| token == field)
    }

    fn kind_of(&self, name: &str) -> Kind {
        let listed = |names: &[String]| names.iter().any(|n| n == name);
        if listed(&self.text_columns) {
            Kind::Text
        } else if listed(&self.int_columns) {
            Kind::Int
        } else if listed(&self.timestamp_columns) {
            Kind::Timestamp
        } else {
            Kind::Float
        }
    }
}

#[derive(Clone, Copy)]
enum Kind {
    Float,
    Int,
    Text,
    Timestamp,
}

enum Builder {
    Float(Vec<f64>),
    Int(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
    Timestamp(Vec<Option<OffsetDateTime>>),
}

impl Builder {
    const fn new(kind: Kind) -> Self {
        match kind {
            Kind::Float => Self::Float(Vec::new()),
            Kind::Int => Self::Int(Vec::new()),
            Kind::Text => Self::Text(Vec::new()),
            Kind::Timestamp => Self::Timestamp(Vec::new()),
        }
    }

    fn push(&mut self, field: Option<&str>) -> std::result::Result<(), String> {
        match self {
            Self::Float(values) => values.push(match field {
                Some(text) => text
                    .trim()
                    .parse::<f64>()
                    .map_err(|err| format!("'{text}' is not a number: {err}"))?,
                None => f64::NAN,
            }),
            Self::Int(values) => values.push(
                field
                    .map(|text| {
                        text.trim()
                            .parse::<i64>()
                            .map_err(|err| format!("'{text}' is not an integer: {err}"))
                    })
                    .transpose()?,
            ),
            Self::Text(values) => values.push(field.map(str::to_owned)),
            Self::Timestamp(values) => values.push(
                field
                    .map(|text| {
                        OffsetDateTime::parse(text.trim(), &Rfc3339)
                            .map_err(|err| format!("'{text}' is not an RFC 3339 timestamp: {err}"))
                    })
                    .transpose()?,
            ),
        }
        Ok(())
    }

    fn finish(self, name: String) -> Column {
        match self {
            Self::Float(values) => Column::float64(name, values),
            Self::Int(values) => Column::int64(name, values),
            Self::Text(values) => Column::utf8(name, values),
            Self::Timestamp(values) => Column::timestamp(name, values),
        }
    }
}

/// Loads a headed CSV document into a [`DataFrame`].
///
/// Fields matching a missing token become missing; text columns keep every
/// other field verbatim.
///
/// # Errors
///
/// Returns [`Error::Csv`] for malformed records or fields that do not parse as
/// their declared type, and [`Error::InvalidFrame`] for duplicate headers.
pub fn read_csv<R: Read>(reader: R, options: &CsvReadOptions) -> Result<DataFrame> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .from_reader(reader);

    let names: Vec<String> = reader.headers()?.iter().map(str::to_owned).collect();
    let mut builders: Vec<Builder> = names
        .iter()
        .map(|name| Builder::new(options.kind_of(name)))
        .collect();

    for (line, record) in reader.records().enumerate() {
        let record = record?;
        for (column, builder) in builders.iter_mut().enumerate() {
            let field = record.get(column).filter(|f| !options.is_missing(f));
            builder.push(field).map_err(|details| Error::Csv {
                details: format!("row {}, column '{}': {details}", line + 1, names[column])
                    .into(),
            })?;
        }
    }

    DataFrame::new(
        builders
            .into_iter()
            .zip(names)
            .map(|(builder, name)| builder.finish(name))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn declared_types_and_missing_tokens() {
        let data = "when,site,count,level\n\
                    2024-01-01T00:00:00Z,north,3,1.5\n\
                    NA,south,,NaN\n\
                    2024-01-01T02:00:00Z,,7,4.5\n";
        let options = CsvReadOptions::new()
            .with_text_columns(["site"])
            .with_int_columns(["count"])
            .with_timestamp_columns(["when"]);
        let frame = read_csv(data.as_bytes(), &options).unwrap();

        assert_eq!(frame.nrows(), 3);
        assert_eq!(frame.ncols(), 4);
        assert!(frame.value(1, 0).is_missing());
        assert_eq!(frame.value(1, 1), Value::Str("south".into()));
        assert!(frame.value(2, 1).is_missing());
        assert_eq!(frame.value(2, 2), Value::Int64(7));
        assert!(frame.value(1, 3).is_missing());
        assert_eq!(frame.series("level").unwrap().missing_count(), 1);
    }

    #[test]
    fn bad_number_reports_row_and_column() {
        let err = read_csv("a\n1\nx\n".as_bytes(), &CsvReadOptions::new()).unwrap_err();
        let Error::Csv { details } = err else {
            panic!("unexpected error {err:?}");
        };
        assert!(details.contains("row 2"));
        assert!(details.contains("'a'"));
    }
}
