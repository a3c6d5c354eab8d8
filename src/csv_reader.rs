//! Streaming record reader with column-count validation

use crate::config::Dialect;
use crate::csv::RowParser;
use crate::error::{Result, RowLocation, TranscodeError};
use crate::hex_dump::hex_dump;
use crate::source::{CharSource, DecodingSource};
use crate::types::Record;
use std::io::Read;

const BYTE_ORDER_MARK: char = '\u{FEFF}';

/// Required field count for every validated record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnCheck {
    /// Configured number of columns
    pub expected: usize,
    /// Each column is followed by a delimiter, adding one empty trailing field
    pub trailing_delimiter: bool,
}

impl ColumnCheck {
    /// Check for `expected` columns without trailing delimiter
    pub fn new(expected: usize) -> Self {
        ColumnCheck {
            expected,
            trailing_delimiter: false,
        }
    }

    /// Field count a parsed record must have
    pub fn effective(&self) -> usize {
        if self.trailing_delimiter {
            self.expected + 1
        } else {
            self.expected
        }
    }

    /// Fail when `record` does not have the effective field count
    pub fn verify(
        &self,
        record: &Record,
        location: RowLocation,
        column_delimiter: &str,
    ) -> Result<()> {
        let expected = self.effective();
        if record.len() == expected {
            return Ok(());
        }

        let row = record.join(column_delimiter);
        tracing::warn!(
            %location,
            configured = self.expected,
            expected,
            actual = record.len(),
            "column count mismatch, reconstructed row:\n{}",
            hex_dump(row.as_bytes())
        );
        Err(TranscodeError::ColumnCount {
            location,
            expected,
            actual: record.len(),
            row,
        })
    }
}

/// Reads records one at a time from a character source
///
/// Only one record is held in memory at a time.
///
/// # Examples
///
/// ```
/// use delimstream::config::Dialect;
/// use delimstream::csv_reader::RowReader;
///
/// let data = "id^|name@@\n1^|alice@@\n";
/// let mut reader = RowReader::from_reader(data.as_bytes(), &Dialect::default());
///
/// while let Some(row) = reader.read_row().unwrap() {
///     println!("{:?}", row);
/// }
/// assert_eq!(reader.row_count(), 2);
/// ```
pub struct RowReader<S: CharSource> {
    source: S,
    parser: RowParser,
    column_delimiter: String,
    column_check: Option<ColumnCheck>,
    skip_empty_rows: bool,
    row_count: u64,
    empty_rows: u64,
}

impl<R: Read> RowReader<DecodingSource<R>> {
    /// Decode `reader` with the dialect's charset and parse with its delimiters
    pub fn from_reader(reader: R, dialect: &Dialect) -> Self {
        let parser =
            RowParser::new(&dialect.row_delimiter, &dialect.column_delimiter, dialect.quote);
        RowReader::new(DecodingSource::new(reader, dialect.charset), parser)
    }
}

impl<S: CharSource> RowReader<S> {
    /// Read records from `source` using `parser`
    pub fn new(source: S, parser: RowParser) -> Self {
        let column_delimiter = parser.column_delimiter();
        RowReader {
            source,
            parser,
            column_delimiter,
            column_check: None,
            skip_empty_rows: false,
            row_count: 0,
            empty_rows: 0,
        }
    }

    /// Validate the field count of every returned record (builder pattern)
    pub fn column_check(mut self, check: Option<ColumnCheck>) -> Self {
        self.column_check = check;
        self
    }

    /// Silently drop records made of a single empty field (builder pattern)
    pub fn skip_empty_rows(mut self, skip: bool) -> Self {
        self.skip_empty_rows = skip;
        self
    }

    /// Consume a leading byte-order mark if one is present
    pub fn strip_bom(&mut self) -> Result<bool> {
        match self.source.read_char()? {
            Some(BYTE_ORDER_MARK) => Ok(true),
            Some(other) => {
                self.source.unread(&[other]);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Parse and discard one record without validation
    ///
    /// Neither the column check nor the newline policy applies. Returns
    /// `false` when the input is exhausted.
    pub fn skip_row(&mut self) -> Result<bool> {
        self.parser.skip_record(&mut self.source)
    }

    /// Read the header record; validated but not counted as a data row
    pub fn read_header(&mut self) -> Result<Option<Record>> {
        let header = self.next_non_empty()?;
        if let (Some(check), Some(record)) = (self.column_check, header.as_ref()) {
            check.verify(record, RowLocation::Header, &self.column_delimiter)?;
        }
        Ok(header)
    }

    /// Read the next data record
    ///
    /// Returns `Ok(None)` at end of input.
    pub fn read_row(&mut self) -> Result<Option<Record>> {
        let record = match self.next_non_empty()? {
            Some(record) => record,
            None => return Ok(None),
        };
        self.row_count += 1;
        if let Some(check) = self.column_check {
            check.verify(&record, RowLocation::Data(self.row_count), &self.column_delimiter)?;
        }
        Ok(Some(record))
    }

    fn next_non_empty(&mut self) -> Result<Option<Record>> {
        loop {
            match self.parser.next_record(&mut self.source)? {
                Some(record) if self.skip_empty_rows && is_empty_record(&record) => {
                    self.empty_rows += 1;
                }
                other => return Ok(other),
            }
        }
    }

    /// Iterator over the remaining data records
    pub fn rows(&mut self) -> RowIterator<'_, S> {
        RowIterator { reader: self }
    }

    /// Data records returned so far
    pub fn row_count(&self) -> u64 {
        self.row_count
    }

    /// Empty records dropped so far
    pub fn empty_rows_skipped(&self) -> u64 {
        self.empty_rows
    }

    /// Records parsed so far, including skipped and header records
    pub fn records_parsed(&self) -> u64 {
        self.parser.record_count()
    }

    /// Give back the character source
    pub fn into_inner(self) -> S {
        self.source
    }
}

fn is_empty_record(record: &Record) -> bool {
    record.len() == 1 && record[0].is_empty()
}

/// Iterator over data records
pub struct RowIterator<'a, S: CharSource> {
    reader: &'a mut RowReader<S>,
}

impl<S: CharSource> Iterator for RowIterator<'_, S> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_row().transpose()
    }
}
