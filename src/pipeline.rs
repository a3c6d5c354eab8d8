//! Transcoding pipeline
//!
//! A run strips an optional byte-order mark, discards leading rows, passes
//! an optional header through untouched and then streams every data row
//! through validation, the row processor and the output encoder. Only one
//! record is in memory at a time.
//!
//! Rows that were already written when a run fails stay written; the output
//! is flushed on the error path too.
//!
//! I/O failures are reported with the [`Phase`] they happened in. The header
//! is flushed as soon as it is written. Data rows are buffered by the output
//! encoder, so a failing writer may only surface in the `finish` phase.

use crate::charset::Charset;
use crate::config::PipelineConfig;
use crate::csv::{RowEncoder, RowParser};
use crate::csv_reader::{ColumnCheck, RowReader};
use crate::csv_writer::RowWriter;
use crate::error::{Phase, Result, TranscodeError};
use crate::hex_dump::hex_dump;
use crate::processor::{Identity, RowProcessor};
use crate::sink::{CharSink, EncodingSink};
use crate::source::{CharSource, DecodingSource};
use crate::types::{Record, RunStats, WidthCheck};
use std::io::{Read, Write};

/// A validated configuration, ready to run any number of times
///
/// # Examples
///
/// ```
/// use delimstream::config::{Dialect, PipelineConfig};
/// use delimstream::pipeline::Pipeline;
///
/// let config = PipelineConfig::new()
///     .output(Dialect::csv())
///     .read_header_after_skip(true);
/// let pipeline = Pipeline::new(config).unwrap();
///
/// let mut out = Vec::new();
/// let stats = pipeline
///     .run_identity("id^|name@@\n1^|alice@@\n".as_bytes(), &mut out)
///     .unwrap();
///
/// assert_eq!(String::from_utf8(out).unwrap(), "id,name\n1,alice\n");
/// assert_eq!(stats.rows_out, 1);
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Validate `config` and build a pipeline from it
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Pipeline { config })
    }

    /// The configuration this pipeline runs with
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transcode `input` bytes into `output` bytes
    ///
    /// Both streams are taken by value: pass `&mut` to keep using them after
    /// the run. The output is flushed before returning.
    pub fn run<R, W, P>(&self, input: R, output: W, processor: P) -> Result<RunStats>
    where
        R: Read,
        W: Write,
        P: RowProcessor,
    {
        let mut reader = self.reader(DecodingSource::new(input, self.config.input.charset));
        let sink = EncodingSink::new(output, self.config.output.charset);
        let mut writer = RowWriter::new(sink, self.encoder());

        match self.drive(&mut reader, &mut writer, processor) {
            Ok(stats) => {
                writer.finish().map_err(|e| e.in_phase(Phase::Finish))?;
                log_finished(&stats);
                Ok(stats)
            }
            Err(e) => {
                // the run error is reported even if this flush fails too
                let _ = writer.flush();
                Err(e)
            }
        }
    }

    /// [`Pipeline::run`] without a row transformation
    pub fn run_identity<R: Read, W: Write>(&self, input: R, output: W) -> Result<RunStats> {
        self.run(input, output, Identity)
    }

    /// Transcode between already-decoded character streams
    ///
    /// The charsets of both dialects are ignored here.
    pub fn run_chars<S, K, P>(&self, source: S, sink: K, processor: P) -> Result<RunStats>
    where
        S: CharSource,
        K: CharSink,
        P: RowProcessor,
    {
        let mut reader = self.reader(source);
        let mut writer = RowWriter::new(sink, self.encoder());

        match self.drive(&mut reader, &mut writer, processor) {
            Ok(stats) => {
                writer.flush().map_err(|e| e.in_phase(Phase::Finish))?;
                log_finished(&stats);
                Ok(stats)
            }
            Err(e) => {
                let _ = writer.flush();
                Err(e)
            }
        }
    }

    /// Transcode text held in memory, returning the output text
    pub fn transcode_str<P: RowProcessor>(
        &self,
        text: &str,
        processor: P,
    ) -> Result<(String, RunStats)> {
        let mut source = DecodingSource::new(text.as_bytes(), Charset::utf8());
        let mut out = String::with_capacity(text.len());
        let stats = self.run_chars(&mut source, &mut out, processor)?;
        Ok((out, stats))
    }

    fn reader<S: CharSource>(&self, source: S) -> RowReader<S> {
        let cfg = &self.config;
        let input = &cfg.input;
        let parser = RowParser::new(&input.row_delimiter, &input.column_delimiter, input.quote)
            .preserve_quotes(cfg.preserve_input_quotes)
            .newline_policy(cfg.newline_policy);
        let check = match cfg.expected_columns {
            0 => None,
            expected => Some(ColumnCheck {
                expected,
                trailing_delimiter: cfg.trailing_column_delimiter,
            }),
        };
        RowReader::new(source, parser)
            .column_check(check)
            .skip_empty_rows(cfg.skip_empty_rows)
    }

    fn encoder(&self) -> RowEncoder {
        let out = &self.config.output;
        RowEncoder::new(
            &out.column_delimiter,
            &out.row_delimiter,
            out.quote,
            self.config.quote_mode,
        )
    }

    fn drive<S, K, P>(
        &self,
        reader: &mut RowReader<S>,
        writer: &mut RowWriter<K>,
        mut processor: P,
    ) -> Result<RunStats>
    where
        S: CharSource,
        K: CharSink,
        P: RowProcessor,
    {
        let cfg = &self.config;
        let mut stats = RunStats::default();

        tracing::debug!(
            config = %cfg.describe(),
            skip = cfg.skip_leading_rows,
            header = cfg.read_header_after_skip,
            expected_columns = cfg.expected_columns,
            "starting transcode"
        );

        // the mark is probed as part of whichever phase reads first
        let first_phase = if cfg.skip_leading_rows > 0 {
            Phase::Skip
        } else if cfg.read_header_after_skip {
            Phase::Header
        } else {
            Phase::Data
        };
        if cfg.strip_bom && reader.strip_bom().map_err(|e| e.in_phase(first_phase))? {
            tracing::trace!("stripped byte-order mark");
        }

        for _ in 0..cfg.skip_leading_rows {
            if !reader.skip_row().map_err(|e| e.in_phase(Phase::Skip))? {
                if cfg.read_header_after_skip {
                    return Err(TranscodeError::MissingHeader {
                        skipped: cfg.skip_leading_rows,
                    });
                }
                tracing::debug!(
                    requested = cfg.skip_leading_rows,
                    skipped = stats.rows_skipped,
                    "input ended while skipping leading rows"
                );
                return Ok(stats);
            }
            stats.rows_skipped += 1;
            tracing::trace!(row = stats.rows_skipped, "skipped leading row");
        }

        if cfg.read_header_after_skip {
            let header = reader
                .read_header()
                .map_err(|e| e.in_phase(Phase::Header))?
                .ok_or(TranscodeError::MissingHeader {
                    skipped: cfg.skip_leading_rows,
                })?;
            // flushed right away so output failures here are reported as header failures
            writer
                .write_fields(&header)
                .and_then(|_| writer.flush())
                .map_err(|e| e.in_phase(Phase::Header))?;
            stats.header_written = true;
        }

        while let Some(row) = reader.read_row().map_err(|e| e.in_phase(Phase::Data))? {
            stats.rows_in += 1;
            if let Some(check) = cfg.width_check {
                check_width(check, &row, stats.rows_in, cfg.trailing_column_delimiter)?;
            }
            let row = processor.process(row).map_err(|e| e.in_phase(Phase::Data))?;
            writer.write_fields(&row).map_err(|e| e.in_phase(Phase::Data))?;
            stats.rows_out += 1;
        }

        Ok(stats)
    }
}

fn log_finished(stats: &RunStats) {
    tracing::info!(
        rows_skipped = stats.rows_skipped,
        header_written = stats.header_written,
        rows_in = stats.rows_in,
        rows_out = stats.rows_out,
        "transcode finished"
    );
}

/// Fixed-width validation of one data row, measured in characters
///
/// The empty field produced by a trailing column delimiter is not measured.
fn check_width(
    check: WidthCheck,
    row: &Record,
    row_number: u64,
    trailing_delimiter: bool,
) -> Result<()> {
    let fields = match row.split_last() {
        Some((last, rest)) if trailing_delimiter && last.is_empty() => rest,
        _ => &row[..],
    };

    let err = match check {
        WidthCheck::PerField(expected) => fields
            .iter()
            .map(|f| f.chars().count())
            .enumerate()
            .find(|&(_, actual)| actual != expected)
            .map(|(i, actual)| TranscodeError::FieldWidth {
                row: row_number,
                column: i + 1,
                expected,
                actual,
            }),
        WidthCheck::RowTotal(expected) => {
            let actual: usize = fields.iter().map(|f| f.chars().count()).sum();
            (actual != expected).then_some(TranscodeError::RowWidth {
                row: row_number,
                expected,
                actual,
            })
        }
    };

    match err {
        None => Ok(()),
        Some(err) => {
            tracing::warn!(
                row = row_number,
                "{}, row content:\n{}",
                err,
                hex_dump(row.concat().as_bytes())
            );
            Err(err)
        }
    }
}
