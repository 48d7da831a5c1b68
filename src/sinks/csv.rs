use std::borrow::Cow;
use std::io::Write;

use csv::{ByteRecord, Writer, WriterBuilder};
use itoa::Buffer as ItoaBuffer;
use ryu::Buffer as RyuBuffer;

use crate::error::{Error, Result};
use crate::sinks::{RowSink, SinkContext};
use crate::value::{Value, format_rfc3339};

/// Writes frame rows into a delimited text file (CSV/TSV).
///
/// Missing cells become empty fields; timestamps are written as RFC 3339.
pub struct CsvSink<W: Write> {
    output: Option<W>,
    writer: Option<Writer<W>>,
    delimiter: u8,
    write_headers: bool,
    column_count: usize,
    record: ByteRecord,
    ryu: RyuBuffer,
    itoa: ItoaBuffer,
}

impl<W: Write> CsvSink<W> {
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            output: Some(writer),
            writer: None,
            delimiter: b',',
            write_headers: true,
            column_count: 0,
            record: ByteRecord::new(),
            ryu: RyuBuffer::new(),
            itoa: ItoaBuffer::new(),
        }
    }

    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    #[must_use]
    pub const fn with_headers(mut self, headers: bool) -> Self {
        self.write_headers = headers;
        self
    }

    /// Returns the underlying writer once the sink has been finished.
    ///
    /// # Errors
    ///
    /// Returns an error while the sink is still writing or after the output
    /// was already taken.
    pub fn into_inner(mut self) -> Result<W> {
        if self.writer.is_some() {
            return Err(Error::Unsupported {
                feature: Cow::from("attempted to take CSV writer before sink was finished"),
            });
        }
        self.output.take().ok_or_else(|| Error::Unsupported {
            feature: Cow::from("CSV sink output already consumed"),
        })
    }

    fn push_value(&mut self, value: &Value<'_>) -> Result<()> {
        match value {
            Value::Missing => self.record.push_field(b""),
            Value::Float(v) => self.record.push_field(self.ryu.format(*v).as_bytes()),
            Value::Int64(v) => self.record.push_field(self.itoa.format(*v).as_bytes()),
            Value::Str(text) => self.record.push_field(text.as_bytes()),
            Value::Timestamp(datetime) => {
                self.record.push_field(format_rfc3339(datetime)?.as_bytes());
            }
        }
        Ok(())
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn begin(&mut self, context: SinkContext<'_>) -> Result<()> {
        if self.writer.is_some() {
            return Err(Error::Unsupported {
                feature: Cow::from("CSV sink cannot be reused without finishing"),
            });
        }
        let output = self.output.take().ok_or_else(|| Error::Unsupported {
            feature: Cow::from("CSV sink output already taken"),
        })?;
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(output);

        if self.write_headers {
            let mut header = ByteRecord::with_capacity(0, context.columns.len());
            for column in context.columns {
                header.push_field(column.name.as_bytes());
            }
            writer.write_byte_record(&header)?;
        }

        self.column_count = context.columns.len();
        self.record = ByteRecord::with_capacity(0, self.column_count);
        self.writer = Some(writer);
        Ok(())
    }

    fn write_row(&mut self, row: &[Value<'_>]) -> Result<()> {
        if self.writer.is_none() {
            return Err(Error::Unsupported {
                feature: Cow::from("rows written before CSV sink initialised"),
            });
        }
        if row.len() != self.column_count {
            return Err(Error::InvalidFrame {
                details: Cow::Owned(format!(
                    "row length {} does not match expected {}",
                    row.len(),
                    self.column_count
                )),
            });
        }
        self.record.clear();
        for value in row {
            self.push_value(value)?;
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write_byte_record(&self.record)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            let output = writer.into_inner().map_err(|err| Error::Csv {
                details: Cow::Owned(format!("csv writer could not be unwrapped: {err}")),
            })?;
            self.output = Some(output);
        }
        self.column_count = 0;
        self.record.clear();
        Ok(())
    }
}
