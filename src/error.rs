//! Error types for transcoding runs

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Stage of a pipeline run, attached to I/O failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Discarding leading rows
    Skip,
    /// Reading or writing the header row
    Header,
    /// Processing data rows
    Data,
    /// Final flush of the output
    Finish,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Skip => "skip",
            Phase::Header => "header",
            Phase::Data => "data",
            Phase::Finish => "finish",
        };
        f.write_str(name)
    }
}

/// Which row a structural error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowLocation {
    /// The header row read after skipping
    Header,
    /// A data row (1-based, counted after skip and header)
    Data(u64),
}

impl fmt::Display for RowLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowLocation::Header => f.write_str("header row"),
            RowLocation::Data(n) => write!(f, "data row {}", n),
        }
    }
}

/// Errors raised while configuring or running a transcode
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// Invalid configuration, detected before any I/O
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Charset label could not be resolved
    #[error("unknown charset: {0}")]
    UnknownCharset(String),

    /// Parsed field count differs from the expected count
    #[error("column count mismatch at {location} (expected={expected}, actual={actual}): {row}")]
    ColumnCount {
        location: RowLocation,
        expected: usize,
        actual: usize,
        /// Row reconstructed with the input column delimiter
        row: String,
    },

    /// A field does not have the configured fixed character length
    #[error(
        "field width mismatch at data row {row}, column {column} \
         (expected={expected}, actual={actual})"
    )]
    FieldWidth {
        row: u64,
        column: usize,
        expected: usize,
        actual: usize,
    },

    /// The concatenated row content does not have the configured length
    #[error("row width mismatch at data row {row} (expected={expected}, actual={actual})")]
    RowWidth {
        row: u64,
        expected: usize,
        actual: usize,
    },

    /// Literal newline in unquoted content while newlines are rejected
    #[error("unquoted newline in record {row}")]
    UnquotedNewline { row: u64 },

    /// Input ended before the header row could be read
    #[error("EOF while skipping first {skipped} rows: no header present")]
    MissingHeader { skipped: usize },

    /// Row processing callback aborted the run
    #[error("row processor failed at data row {row}: {message}")]
    Processor { row: u64, message: String },

    /// Raw I/O failure not yet attributed to a phase
    #[error("I/O error: {0}")]
    Stream(#[from] io::Error),

    /// I/O failure with the phase it happened in
    #[error("I/O error during {phase} phase: {source}")]
    Io {
        phase: Phase,
        #[source]
        source: io::Error,
    },

    /// Input or output file could not be opened
    #[error("cannot open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Compressed container could not be opened or finalized
    #[error("archive error: {0}")]
    Archive(String),
}

impl TranscodeError {
    /// Attach `phase` to a raw stream error; other variants pass through
    pub fn in_phase(self, phase: Phase) -> Self {
        match self {
            TranscodeError::Stream(source) => TranscodeError::Io { phase, source },
            other => other,
        }
    }

    /// Build a processor error from any displayable cause
    pub fn processor(row: u64, cause: impl fmt::Display) -> Self {
        TranscodeError::Processor {
            row,
            message: cause.to_string(),
        }
    }

    /// True for failures caused by the content of the input
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TranscodeError::ColumnCount { .. }
                | TranscodeError::FieldWidth { .. }
                | TranscodeError::RowWidth { .. }
                | TranscodeError::UnquotedNewline { .. }
                | TranscodeError::MissingHeader { .. }
        )
    }
}
