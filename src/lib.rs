//! # delimstream
//!
//! Streaming transcoder for delimited text with multi-character delimiters.
//!
//! Records are read from a byte stream in one charset and dialect (column
//! delimiter, row delimiter, quote character) and written in another. The
//! input is parsed one record at a time, so memory use stays flat no matter
//! how large the file is.
//!
//! Along the way a run can:
//! - skip leading rows and pass a header row through untouched
//! - validate the column count of every record
//! - validate fixed field or row widths
//! - transform each data row with a [`RowProcessor`]
//!
//! ## Quick Start
//!
//! ```
//! use delimstream::{Charset, Dialect, Pipeline, PipelineConfig, QuoteMode};
//!
//! let config = PipelineConfig::new()
//!     .input(Dialect::new().charset(Charset::for_label("CP949").unwrap()))
//!     .output(Dialect::csv())
//!     .quote_mode(QuoteMode::AsNeeded)
//!     .expected_columns(2);
//! let pipeline = Pipeline::new(config).unwrap();
//!
//! let cp949 = Charset::for_label("CP949").unwrap();
//! let input = cp949.encode("이름^|도시@@\n홍길동^|서울, 한국@@\n");
//! let mut output = Vec::new();
//! let stats = pipeline.run_identity(&input[..], &mut output).unwrap();
//!
//! assert_eq!(String::from_utf8(output).unwrap(), "이름,도시\n홍길동,\"서울, 한국\"\n");
//! assert_eq!(stats.rows_out, 2);
//! ```
//!
//! ## Row processing
//!
//! ```
//! use delimstream::{Dialect, Pipeline, PipelineConfig, Record, Result};
//!
//! let pipeline = Pipeline::new(PipelineConfig::new().output(Dialect::csv())).unwrap();
//! let trim = |row: Record| -> Result<Record> {
//!     Ok(row.into_iter().map(|f| f.trim().to_string()).collect())
//! };
//!
//! let (text, _) = pipeline.transcode_str(" a ^| b @@\n", trim).unwrap();
//! assert_eq!(text, "a,b\n");
//! ```

pub mod charset;
pub mod config;
pub mod csv;
pub mod csv_reader;
pub mod csv_writer;
pub mod error;
pub mod escape;
pub mod files;
pub mod hex_dump;
pub mod pipeline;
pub mod processor;
pub mod sink;
pub mod source;
pub mod types;

pub use charset::Charset;
pub use config::{Dialect, PipelineConfig};
pub use csv_reader::{ColumnCheck, RowReader};
pub use csv_writer::RowWriter;
pub use error::{Phase, Result, RowLocation, TranscodeError};
pub use files::transcode_file;
pub use pipeline::Pipeline;
pub use processor::{Identity, NewlineToSpace, RowProcessor};
pub use types::{NewlinePolicy, QuoteMode, Record, RunStats, WidthCheck};
