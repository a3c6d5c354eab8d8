//! Streaming record writer

use crate::config::Dialect;
use crate::csv::RowEncoder;
use crate::error::Result;
use crate::sink::{CharSink, EncodingSink};
use crate::types::QuoteMode;
use std::io::Write;

/// Writes records to a character sink, one at a time
///
/// Each record is encoded into a reused buffer and handed to the sink, so
/// memory use does not grow with the number of rows.
///
/// # Examples
///
/// ```
/// use delimstream::config::Dialect;
/// use delimstream::csv_writer::RowWriter;
/// use delimstream::types::QuoteMode;
///
/// let mut out = Vec::new();
/// let mut writer = RowWriter::from_writer(&mut out, &Dialect::csv(), QuoteMode::AsNeeded);
/// writer.write_row(["Name", "City"]).unwrap();
/// writer.write_row(["Alice", "New York, NY"]).unwrap();
/// writer.finish().unwrap();
///
/// assert_eq!(String::from_utf8(out).unwrap(), "Name,City\nAlice,\"New York, NY\"\n");
/// ```
pub struct RowWriter<K: CharSink> {
    sink: K,
    encoder: RowEncoder,
    buffer: String,
    row_count: u64,
}

impl<W: Write> RowWriter<EncodingSink<W>> {
    /// Encode to `writer` with the dialect's charset and delimiters
    pub fn from_writer(writer: W, dialect: &Dialect, mode: QuoteMode) -> Self {
        let encoder = RowEncoder::new(
            &dialect.column_delimiter,
            &dialect.row_delimiter,
            dialect.quote,
            mode,
        );
        RowWriter::new(EncodingSink::new(writer, dialect.charset), encoder)
    }

    /// Flush remaining output and return the underlying writer
    pub fn finish(self) -> Result<W> {
        self.sink.finish()
    }
}

impl<K: CharSink> RowWriter<K> {
    /// Write into `sink` using `encoder`
    pub fn new(sink: K, encoder: RowEncoder) -> Self {
        RowWriter {
            sink,
            encoder,
            buffer: String::with_capacity(4096),
            row_count: 0,
        }
    }

    /// Write one record followed by the row delimiter
    pub fn write_row<I, S>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let fields: Vec<S> = fields.into_iter().collect();
        self.write_fields(&fields)
    }

    /// Write one record given as a slice
    pub fn write_fields<S: AsRef<str>>(&mut self, fields: &[S]) -> Result<()> {
        self.buffer.clear();
        self.encoder.encode_row(fields, &mut self.buffer);
        self.buffer.push_str(self.encoder.row_delimiter());
        self.sink.write_str(&self.buffer)?;
        self.row_count += 1;
        Ok(())
    }

    /// Number of records written
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Flush the sink
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    /// Give back the sink without flushing
    pub fn into_inner(self) -> K {
        self.sink
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Charset;

    #[test]
    fn test_write_to_string_sink() -> Result<()> {
        let encoder = RowEncoder::new("||", "##\n", Some('"'), QuoteMode::AsNeeded);
        let mut writer = RowWriter::new(String::new(), encoder);
        writer.write_row(["id", "name"])?;
        writer.write_fields(&["1".to_string(), "a||b".to_string()])?;
        assert_eq!(writer.row_count(), 2);
        assert_eq!(writer.into_inner(), "id||name##\n1||\"a||b\"##\n");
        Ok(())
    }

    #[test]
    fn test_charset_output() -> Result<()> {
        let cs = Charset::for_label("CP949")?;
        let dialect = Dialect::csv().charset(cs);
        let mut writer = RowWriter::from_writer(Vec::new(), &dialect, QuoteMode::Never);
        writer.write_row(["사용자1", "Seoul"])?;
        let bytes = writer.finish()?;
        assert_eq!(cs.decode(&bytes), "사용자1,Seoul\n");
        Ok(())
    }

    #[test]
    fn test_empty_record() -> Result<()> {
        let encoder = RowEncoder::new(",", "\n", Some('"'), QuoteMode::AsNeeded);
        let mut writer = RowWriter::new(String::new(), encoder);
        writer.write_row(Vec::<String>::new())?;
        writer.write_row([""])?;
        assert_eq!(writer.into_inner(), "\n\n");
        Ok(())
    }
}
