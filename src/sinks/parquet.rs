use std::borrow::Cow;
use std::io::Write;
use std::sync::Arc;

use parquet::basic::{LogicalType, Repetition, TimeUnit, Type as PhysicalType};
use parquet::data_type::{ByteArray, ByteArrayType, DoubleType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::{SerializedColumnWriter, SerializedFileWriter};
use parquet::schema::types::{Type, TypePtr};

use crate::error::{Error, Result};
use crate::sinks::{ColumnDescriptor, ColumnKind, RowSink, SinkContext};
use crate::value::Value;

const DEFAULT_ROW_GROUP_SIZE: usize = 8_192;
const NANOS_PER_MILLI: i128 = 1_000_000;

/// Writes frame rows into a Parquet file, one optional column per frame column.
pub struct ParquetSink<W: Write + Send> {
    output: Option<W>,
    writer: Option<SerializedFileWriter<W>>,
    row_group_size: usize,
    columns: Vec<ColumnPlan>,
    rows_buffered: usize,
}

impl<W: Write + Send> ParquetSink<W> {
    /// Creates a new sink that writes to the supplied writer.
    #[must_use]
    pub const fn new(writer: W) -> Self {
        Self {
            output: Some(writer),
            writer: None,
            row_group_size: DEFAULT_ROW_GROUP_SIZE,
            columns: Vec::new(),
            rows_buffered: 0,
        }
    }

    /// Configures the number of rows buffered per Parquet row group.
    ///
    /// A size of zero buffers everything into a single row group.
    #[must_use]
    pub const fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Returns the underlying writer once the sink has been finalised.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer has not been finished or if the
    /// internal output has already been taken.
    pub fn into_inner(mut self) -> Result<W> {
        if self.writer.is_some() {
            return Err(Error::Unsupported {
                feature: Cow::from("attempted to take Parquet writer before sink was finished"),
            });
        }
        self.output.take().ok_or_else(|| Error::Unsupported {
            feature: Cow::from("Parquet sink output already consumed"),
        })
    }

    fn flush(&mut self) -> Result<()> {
        if self.rows_buffered == 0 {
            return Ok(());
        }

        let writer = self.writer.as_mut().ok_or_else(|| Error::Unsupported {
            feature: Cow::from("Parquet sink has not been initialised"),
        })?;
        let mut row_group = writer.next_row_group()?;

        for plan in &mut self.columns {
            let column_writer = row_group.next_column()?.ok_or_else(|| Error::Parquet {
                details: Cow::from("writer returned fewer columns than the schema described"),
            })?;
            plan.flush(column_writer)?;
        }

        if row_group.next_column()?.is_some() {
            return Err(Error::Parquet {
                details: Cow::from("writer returned more columns than the schema described"),
            });
        }

        row_group.close()?;
        self.rows_buffered = 0;
        Ok(())
    }
}

impl<W: Write + Send> RowSink for ParquetSink<W> {
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()> {
        if self.writer.is_some() {
            return Err(Error::Unsupported {
                feature: Cow::from("Parquet sink cannot be reused without finishing"),
            });
        }

        let reserve = if self.row_group_size == 0 {
            context.row_count
        } else {
            self.row_group_size.min(context.row_count)
        };

        let mut plans = Vec::with_capacity(context.columns.len());
        let mut fields: Vec<TypePtr> = Vec::with_capacity(context.columns.len());
        for descriptor in context.columns {
            let (mut plan, field) = ColumnPlan::new(descriptor)?;
            plan.reserve_capacity(reserve);
            fields.push(field);
            plans.push(plan);
        }

        let schema = Type::group_type_builder("schema")
            .with_fields(fields)
            .build()?;
        let schema = Arc::new(schema);

        let props = WriterProperties::builder().build();
        let output = self.output.take().ok_or_else(|| Error::Unsupported {
            feature: Cow::from("Parquet sink output already taken"),
        })?;
        let writer = SerializedFileWriter::new(output, schema, props.into())?;

        self.columns = plans;
        self.writer = Some(writer);
        self.rows_buffered = 0;
        Ok(())
    }

    fn write_row(&mut self, row: &[Value<'_>]) -> Result<()> {
        if self.writer.is_none() {
            return Err(Error::Unsupported {
                feature: Cow::from("rows written before Parquet sink initialised"),
            });
        }

        if row.len() != self.columns.len() {
            return Err(Error::InvalidFrame {
                details: Cow::Owned(format!(
                    "row length {} does not match column count {}",
                    row.len(),
                    self.columns.len()
                )),
            });
        }

        for (value, plan) in row.iter().zip(self.columns.iter_mut()) {
            plan.push(value)?;
        }

        self.rows_buffered = self.rows_buffered.saturating_add(1);

        if self.row_group_size > 0 && self.rows_buffered >= self.row_group_size {
            self.flush()?;
        }

        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if self.writer.is_none() {
            return Ok(());
        }

        if self.rows_buffered > 0 {
            self.flush()?;
        }

        if let Some(writer) = self.writer.take() {
            let output = writer.into_inner()?;
            self.output = Some(output);
        }
        self.columns.clear();
        self.rows_buffered = 0;
        Ok(())
    }
}

enum ColumnValues {
    Double(Vec<f64>),
    Int64(Vec<i64>),
    ByteArray(Vec<ByteArray>),
}

struct ColumnPlan {
    name: String,
    kind: ColumnKind,
    def_levels: Vec<i16>,
    values: ColumnValues,
}

impl ColumnPlan {
    fn new(descriptor: &ColumnDescriptor) -> Result<(Self, TypePtr)> {
        let (physical_type, logical_type, values) = match descriptor.kind {
            ColumnKind::Double => (PhysicalType::DOUBLE, None, ColumnValues::Double(Vec::new())),
            ColumnKind::Int64 => (PhysicalType::INT64, None, ColumnValues::Int64(Vec::new())),
            ColumnKind::Utf8 => (
                PhysicalType::BYTE_ARRAY,
                Some(LogicalType::String),
                ColumnValues::ByteArray(Vec::new()),
            ),
            ColumnKind::TimestampMillis => (
                PhysicalType::INT64,
                Some(LogicalType::Timestamp {
                    is_adjusted_to_u_t_c: true,
                    unit: TimeUnit::MILLIS,
                }),
                ColumnValues::Int64(Vec::new()),
            ),
        };

        let field = Type::primitive_type_builder(&descriptor.name, physical_type)
            .with_repetition(Repetition::OPTIONAL)
            .with_logical_type(logical_type)
            .build()?;

        let plan = Self {
            name: descriptor.name.clone(),
            kind: descriptor.kind,
            def_levels: Vec::new(),
            values,
        };
        Ok((plan, Arc::new(field)))
    }

    fn reserve_capacity(&mut self, capacity: usize) {
        self.def_levels.reserve(capacity);
        match &mut self.values {
            ColumnValues::Double(values) => values.reserve(capacity),
            ColumnValues::Int64(values) => values.reserve(capacity),
            ColumnValues::ByteArray(values) => values.reserve(capacity),
        }
    }

    fn push(&mut self, value: &Value<'_>) -> Result<()> {
        match self.kind {
            ColumnKind::Double => {
                let coerced = self.coerce_double(value)?;
                if let ColumnValues::Double(values) = &mut self.values {
                    Self::push_optional(&mut self.def_levels, values, coerced);
                }
            }
            ColumnKind::Int64 => {
                let coerced = self.coerce_int64(value)?;
                if let ColumnValues::Int64(values) = &mut self.values {
                    Self::push_optional(&mut self.def_levels, values, coerced);
                }
            }
            ColumnKind::TimestampMillis => {
                let coerced = self.coerce_timestamp(value)?;
                if let ColumnValues::Int64(values) = &mut self.values {
                    Self::push_optional(&mut self.def_levels, values, coerced);
                }
            }
            ColumnKind::Utf8 => {
                let coerced = self.coerce_utf8(value)?;
                if let ColumnValues::ByteArray(values) = &mut self.values {
                    Self::push_optional(&mut self.def_levels, values, coerced);
                }
            }
        }
        Ok(())
    }

    #[inline]
    fn push_optional<T>(def_levels: &mut Vec<i16>, values: &mut Vec<T>, value: Option<T>) {
        match value {
            Some(v) => {
                def_levels.push(1);
                values.push(v);
            }
            None => def_levels.push(0),
        }
    }

    fn flush(&mut self, mut column_writer: SerializedColumnWriter<'_>) -> Result<()> {
        match &mut self.values {
            ColumnValues::Double(values) => {
                let writer = column_writer.typed::<DoubleType>();
                writer.write_batch(values, Some(&self.def_levels), None)?;
                values.clear();
            }
            ColumnValues::Int64(values) => {
                let writer = column_writer.typed::<Int64Type>();
                writer.write_batch(values, Some(&self.def_levels), None)?;
                values.clear();
            }
            ColumnValues::ByteArray(values) => {
                let writer = column_writer.typed::<ByteArrayType>();
                writer.write_batch(values, Some(&self.def_levels), None)?;
                values.clear();
            }
        }
        self.def_levels.clear();
        column_writer.close()?;
        Ok(())
    }

    fn coerce_double(&self, value: &Value<'_>) -> Result<Option<f64>> {
        match value {
            Value::Missing => Ok(None),
            Value::Float(v) if v.is_nan() => Ok(None),
            Value::Float(v) => Ok(Some(*v)),
            other => Err(self.type_mismatch_error(other)),
        }
    }

    fn coerce_int64(&self, value: &Value<'_>) -> Result<Option<i64>> {
        match value {
            Value::Missing => Ok(None),
            Value::Int64(v) => Ok(Some(*v)),
            other => Err(self.type_mismatch_error(other)),
        }
    }

    fn coerce_timestamp(&self, value: &Value<'_>) -> Result<Option<i64>> {
        match value {
            Value::Missing => Ok(None),
            Value::Timestamp(datetime) => {
                let millis = datetime.unix_timestamp_nanos().div_euclid(NANOS_PER_MILLI);
                let millis = i64::try_from(millis).map_err(|_| Error::Parquet {
                    details: Cow::Owned(format!(
                        "column '{}' contains timestamp outside Parquet range",
                        self.name
                    )),
                })?;
                Ok(Some(millis))
            }
            other => Err(self.type_mismatch_error(other)),
        }
    }

    fn coerce_utf8(&self, value: &Value<'_>) -> Result<Option<ByteArray>> {
        match value {
            Value::Missing => Ok(None),
            Value::Str(text) => Ok(Some(ByteArray::from(text.as_ref()))),
            other => Err(self.type_mismatch_error(other)),
        }
    }

    fn type_mismatch_error(&self, value: &Value<'_>) -> Error {
        Error::Parquet {
            details: Cow::Owned(format!(
                "column '{}' expected {:?} value but received {value:?}",
                self.name, self.kind
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_before_begin_are_rejected() {
        let mut sink = ParquetSink::new(Vec::new());
        let err = sink.write_row(&[Value::Float(1.0)]).unwrap_err();
        assert!(matches!(err, Error::Unsupported { .. }));
    }

    #[test]
    fn kind_mismatch_names_the_column() {
        let columns = [ColumnDescriptor::new("count", ColumnKind::Int64)];
        let mut sink = ParquetSink::new(Vec::new());
        sink.begin(SinkContext::new(&columns, 1)).unwrap();
        let err = sink.write_row(&[Value::Str("x".into())]).unwrap_err();
        assert!(err.to_string().contains("'count'"));
    }

    #[test]
    fn text_columns_take_only_strings() {
        let columns = [ColumnDescriptor::new("site", ColumnKind::Utf8)];
        let mut sink = ParquetSink::new(Vec::new());
        sink.begin(SinkContext::new(&columns, 3)).unwrap();
        sink.write_row(&[Value::Str("north".into())]).unwrap();
        sink.write_row(&[Value::Missing]).unwrap();
        let err = sink.write_row(&[Value::Float(1.5)]).unwrap_err();
        assert!(err.to_string().contains("'site'"));
    }

    #[test]
    fn finished_sink_hands_back_parquet_bytes() {
        let columns = [ColumnDescriptor::new("x", ColumnKind::Double)];
        let mut sink = ParquetSink::new(Vec::new());
        sink.begin(SinkContext::new(&columns, 0)).unwrap();
        sink.write_row(&[Value::Float(1.0)]).unwrap();
        sink.finish().unwrap();
        let bytes = sink.into_inner().unwrap();
        assert!(bytes.starts_with(b"PAR1"));
        assert!(bytes.ends_with(b"PAR1"));
    }
}
