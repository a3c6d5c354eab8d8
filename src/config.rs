//! Transcoding configuration
//!
//! A [`Dialect`] describes one side of the conversion (delimiters, quote,
//! charset). [`PipelineConfig`] pairs an input and an output dialect with the
//! run options. Both use consuming builder methods and are validated once,
//! before any I/O, by [`PipelineConfig::validate`].

use crate::charset::Charset;
use crate::error::{Result, TranscodeError};
use crate::escape::{parse_delimiter, parse_quote, printable};
use crate::types::{NewlinePolicy, QuoteMode, WidthCheck};

/// Delimiters, quote character and charset of one direction
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Dialect {
    /// Separator between fields
    pub column_delimiter: String,
    /// Separator after each record
    pub row_delimiter: String,
    /// Quote character; `None` disables quoting
    pub quote: Option<char>,
    /// Character set of the byte stream
    pub charset: Charset,
}

impl Default for Dialect {
    /// `^|` columns, `@@\n` rows, `"` quotes, UTF-8
    fn default() -> Self {
        Dialect {
            column_delimiter: "^|".to_string(),
            row_delimiter: "@@\n".to_string(),
            quote: Some('"'),
            charset: Charset::utf8(),
        }
    }
}

impl Dialect {
    /// Default dialect (`^|`, `@@\n`, `"`, UTF-8)
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain comma-separated, newline-terminated text in UTF-8
    pub fn csv() -> Self {
        Dialect {
            column_delimiter: ",".to_string(),
            row_delimiter: "\n".to_string(),
            ..Self::default()
        }
    }

    /// Build a dialect from raw settings in escape syntax
    ///
    /// # Examples
    ///
    /// ```
    /// use delimstream::config::Dialect;
    ///
    /// let dialect = Dialect::from_escaped("^|", "@@\\n", "\"", "CP949").unwrap();
    /// assert_eq!(dialect.row_delimiter, "@@\n");
    /// assert_eq!(dialect.charset.name(), "EUC-KR");
    /// ```
    pub fn from_escaped(column: &str, row: &str, quote: &str, charset: &str) -> Result<Self> {
        Ok(Dialect {
            column_delimiter: parse_delimiter(column, "column delimiter")?,
            row_delimiter: parse_delimiter(row, "row delimiter")?,
            quote: parse_quote(quote)?,
            charset: Charset::for_label(charset)?,
        })
    }

    /// Set the column delimiter (builder pattern)
    pub fn column_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.column_delimiter = delimiter.into();
        self
    }

    /// Set the row delimiter (builder pattern)
    pub fn row_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.row_delimiter = delimiter.into();
        self
    }

    /// Set or clear the quote character (builder pattern)
    pub fn quote(mut self, quote: Option<char>) -> Self {
        self.quote = quote;
        self
    }

    /// Set the charset (builder pattern)
    pub fn charset(mut self, charset: Charset) -> Self {
        self.charset = charset;
        self
    }

    fn validate(&self, side: &str) -> Result<()> {
        if self.column_delimiter.is_empty() {
            return Err(TranscodeError::Config(format!(
                "{} column delimiter must not be empty",
                side
            )));
        }
        if self.row_delimiter.is_empty() {
            return Err(TranscodeError::Config(format!(
                "{} row delimiter must not be empty",
                side
            )));
        }
        Ok(())
    }
}

/// Full configuration of one transcoding run
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    /// Format of the input
    pub input: Dialect,
    /// Format of the output
    pub output: Dialect,
    /// When output fields get quoted
    pub quote_mode: QuoteMode,
    /// Keep input quote characters as part of field values
    pub preserve_input_quotes: bool,
    /// Required field count per record; 0 disables the check
    pub expected_columns: usize,
    /// Every column, the last included, is followed by a column delimiter,
    /// so records carry one extra empty field
    pub trailing_column_delimiter: bool,
    /// Fixed-width check for data rows
    pub width_check: Option<WidthCheck>,
    /// Records to discard before anything else
    pub skip_leading_rows: usize,
    /// Pass the first record after the skipped ones through as a header
    pub read_header_after_skip: bool,
    /// Drop records that consist of one empty field
    pub skip_empty_rows: bool,
    /// Treatment of newlines in unquoted input content
    pub newline_policy: NewlinePolicy,
    /// Drop a leading U+FEFF from the input
    pub strip_bom: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig {
            input: Dialect::default(),
            output: Dialect::default(),
            quote_mode: QuoteMode::AsNeeded,
            preserve_input_quotes: false,
            expected_columns: 0,
            trailing_column_delimiter: false,
            width_check: None,
            skip_leading_rows: 0,
            read_header_after_skip: false,
            skip_empty_rows: false,
            newline_policy: NewlinePolicy::Preserve,
            strip_bom: true,
        }
    }
}

impl PipelineConfig {
    /// Configuration with default dialects on both sides
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input dialect (builder pattern)
    pub fn input(mut self, dialect: Dialect) -> Self {
        self.input = dialect;
        self
    }

    /// Set the output dialect (builder pattern)
    pub fn output(mut self, dialect: Dialect) -> Self {
        self.output = dialect;
        self
    }

    /// Set the output quote mode (builder pattern)
    pub fn quote_mode(mut self, mode: QuoteMode) -> Self {
        self.quote_mode = mode;
        self
    }

    /// Keep input quotes literally (builder pattern)
    pub fn preserve_input_quotes(mut self, preserve: bool) -> Self {
        self.preserve_input_quotes = preserve;
        self
    }

    /// Require this many fields per record; 0 disables (builder pattern)
    pub fn expected_columns(mut self, columns: usize) -> Self {
        self.expected_columns = columns;
        self
    }

    /// Input rows end every column with a delimiter (builder pattern)
    pub fn trailing_column_delimiter(mut self, trailing: bool) -> Self {
        self.trailing_column_delimiter = trailing;
        self
    }

    /// Enable a fixed-width check on data rows (builder pattern)
    pub fn width_check(mut self, check: Option<WidthCheck>) -> Self {
        self.width_check = check;
        self
    }

    /// Discard this many leading records (builder pattern)
    pub fn skip_leading_rows(mut self, rows: usize) -> Self {
        self.skip_leading_rows = rows;
        self
    }

    /// Treat the first record after skipping as a header (builder pattern)
    pub fn read_header_after_skip(mut self, header: bool) -> Self {
        self.read_header_after_skip = header;
        self
    }

    /// Drop empty records (builder pattern)
    pub fn skip_empty_rows(mut self, skip: bool) -> Self {
        self.skip_empty_rows = skip;
        self
    }

    /// Set the unquoted-newline policy (builder pattern)
    pub fn newline_policy(mut self, policy: NewlinePolicy) -> Self {
        self.newline_policy = policy;
        self
    }

    /// Strip a leading byte-order mark (builder pattern)
    pub fn strip_bom(mut self, strip: bool) -> Self {
        self.strip_bom = strip;
        self
    }

    /// Field count records must have, with the trailing-delimiter shift applied
    pub fn effective_columns(&self) -> Option<usize> {
        match self.expected_columns {
            0 => None,
            n if self.trailing_column_delimiter => Some(n + 1),
            n => Some(n),
        }
    }

    /// Check every setting; called before any input is read
    pub fn validate(&self) -> Result<()> {
        self.input.validate("input")?;
        self.output.validate("output")?;
        if let Some(check) = self.width_check {
            if check.width() == 0 {
                return Err(TranscodeError::Config(
                    "fixed width must be greater than zero".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// One-line summary used in logs
    pub fn describe(&self) -> String {
        format!(
            "in[col='{}' row='{}' charset={}] out[col='{}' row='{}' charset={}] quote_mode={}",
            printable(&self.input.column_delimiter),
            printable(&self.input.row_delimiter),
            self.input.charset,
            printable(&self.output.column_delimiter),
            printable(&self.output.row_delimiter),
            self.output.charset,
            self.quote_mode,
        )
    }
}
