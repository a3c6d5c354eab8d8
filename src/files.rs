//! File-to-file transcoding with optional compression
//!
//! The container is picked from the file extension on each side:
//! - `.zst` and `.zip`: single-entry ZIP archive, Zstd level 3
//! - `.gz`: single-entry ZIP archive, Deflate level 6
//! - anything else: plain file
//!
//! Compressed input is read fully into memory before parsing; compressed
//! output is streamed into the archive entry.

use crate::error::{Result, TranscodeError};
use crate::pipeline::Pipeline;
use crate::processor::RowProcessor;
use crate::types::RunStats;
use s_zip::{CompressionMethod, StreamingZipReader, StreamingZipWriter};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read, Write};
use std::path::Path;

const DEFAULT_ENTRY: &str = "data";

/// Archive flavour derived from a file name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    /// `.zst` or `.zip`
    Zstd,
    /// `.gz`
    Deflate,
}

impl Compression {
    /// Compression for `path`, or `None` for a plain file
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "zst" | "zip" => Some(Compression::Zstd),
            "gz" => Some(Compression::Deflate),
            _ => None,
        }
    }

    fn method(self) -> CompressionMethod {
        match self {
            Compression::Zstd => CompressionMethod::Zstd,
            Compression::Deflate => CompressionMethod::Deflate,
        }
    }

    /// Compression level used when writing
    pub fn level(self) -> u32 {
        match self {
            Compression::Zstd => 3,
            Compression::Deflate => 6,
        }
    }
}

/// Transcode the file at `input` into a new file at `output`
///
/// # Examples
///
/// ```no_run
/// use delimstream::config::{Dialect, PipelineConfig};
/// use delimstream::files::transcode_file;
/// use delimstream::pipeline::Pipeline;
/// use delimstream::processor::Identity;
///
/// let pipeline = Pipeline::new(PipelineConfig::new().output(Dialect::csv())).unwrap();
///
/// // Plain in, Zstd-compressed archive out
/// let stats = transcode_file(&pipeline, "export.dat", "export.csv.zst", Identity).unwrap();
/// println!("{}", stats);
/// ```
pub fn transcode_file<P, Q, F>(
    pipeline: &Pipeline,
    input: P,
    output: Q,
    processor: F,
) -> Result<RunStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    F: RowProcessor,
{
    let input = input.as_ref();
    let output = output.as_ref();

    tracing::debug!(input = %input.display(), output = %output.display(), "transcoding file");

    match Compression::for_path(input) {
        Some(_) => {
            let data = read_archive(input)?;
            write_output(pipeline, Cursor::new(data), output, processor)
        }
        None => {
            let file = File::open(input).map_err(|source| TranscodeError::Open {
                path: input.to_path_buf(),
                source,
            })?;
            write_output(pipeline, BufReader::new(file), output, processor)
        }
    }
}

fn write_output<R: Read, F: RowProcessor>(
    pipeline: &Pipeline,
    reader: R,
    output: &Path,
    processor: F,
) -> Result<RunStats> {
    match Compression::for_path(output) {
        Some(compression) => {
            let mut sink = ArchiveSink::create(output, compression)?;
            let result = pipeline.run(reader, &mut sink, processor);
            // close the archive even after a failed run so written rows stay readable
            let finished = sink.finish();
            let stats = result?;
            finished?;
            Ok(stats)
        }
        None => {
            let file = File::create(output).map_err(|source| TranscodeError::Open {
                path: output.to_path_buf(),
                source,
            })?;
            pipeline.run(reader, BufWriter::new(file), processor)
        }
    }
}

/// Name of the single archive entry for `path`: the file name without the
/// compression extension
fn entry_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_ENTRY)
        .to_string()
}

fn read_archive(path: &Path) -> Result<Vec<u8>> {
    let mut zip = StreamingZipReader::open(path)
        .map_err(|e| TranscodeError::Archive(format!("failed to open {}: {}", path.display(), e)))?;

    let wanted = entry_name(path);
    let name = zip
        .entries()
        .iter()
        .find(|e| e.name == wanted)
        .or_else(|| zip.entries().first())
        .ok_or_else(|| TranscodeError::Archive(format!("{} contains no entries", path.display())))?
        .name
        .clone();

    zip.read_entry_by_name(&name)
        .map_err(|e| TranscodeError::Archive(format!("failed to read entry {}: {}", name, e)))
}

/// Byte sink writing into the single entry of a new archive
struct ArchiveSink {
    zip: Option<StreamingZipWriter<File>>,
}

impl ArchiveSink {
    fn create(path: &Path, compression: Compression) -> Result<Self> {
        let mut zip =
            StreamingZipWriter::with_method(path, compression.method(), compression.level())
                .map_err(|e| {
                    TranscodeError::Archive(format!("failed to create {}: {}", path.display(), e))
                })?;
        zip.start_entry(&entry_name(path))
            .map_err(|e| TranscodeError::Archive(format!("failed to start entry: {}", e)))?;
        Ok(ArchiveSink { zip: Some(zip) })
    }

    fn finish(mut self) -> Result<()> {
        if let Some(zip) = self.zip.take() {
            zip.finish()
                .map_err(|e| TranscodeError::Archive(format!("failed to finish archive: {}", e)))?;
        }
        Ok(())
    }
}

impl Write for ArchiveSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let zip = self
            .zip
            .as_mut()
            .ok_or_else(|| io::Error::other("archive already finished"))?;
        zip.write_data(buf).map_err(|e| io::Error::other(e.to_string()))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Dialect, PipelineConfig};
    use crate::processor::Identity;
    use std::fs;
    use tempfile::TempDir;

    fn pipeline() -> Pipeline {
        Pipeline::new(PipelineConfig::new().output(Dialect::csv())).unwrap()
    }

    #[test]
    fn test_compression_for_path() {
        assert_eq!(Compression::for_path(Path::new("a.csv")), None);
        assert_eq!(Compression::for_path(Path::new("a.csv.zst")), Some(Compression::Zstd));
        assert_eq!(Compression::for_path(Path::new("a.csv.zip")), Some(Compression::Zstd));
        assert_eq!(
            Compression::for_path(Path::new("a.csv.GZ")).map(Compression::level),
            Some(6)
        );
        assert_eq!(entry_name(Path::new("dir/out.csv.zst")), "out.csv");
    }

    #[test]
    fn test_plain_file_transcode() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.dat");
        let output = dir.path().join("out.csv");
        fs::write(&input, "a^|b@@\nc^|d@@\n").unwrap();

        let stats = transcode_file(&pipeline(), &input, &output, Identity).unwrap();
        assert_eq!(stats.rows_out, 2);
        assert_eq!(fs::read_to_string(&output).unwrap(), "a,b\nc,d\n");
    }

    #[test]
    fn test_compressed_roundtrip() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.dat");
        let packed = dir.path().join("packed.dat.zst");
        let unpacked = dir.path().join("unpacked.dat");
        fs::write(&input, "x^|y@@\n").unwrap();

        let keep = Pipeline::new(PipelineConfig::new()).unwrap();
        transcode_file(&keep, &input, &packed, Identity).unwrap();
        assert!(fs::metadata(&packed).unwrap().len() > 0);

        transcode_file(&keep, &packed, &unpacked, Identity).unwrap();
        assert_eq!(fs::read_to_string(&unpacked).unwrap(), "x^|y@@\n");
    }

    #[test]
    fn test_failed_run_leaves_readable_archive() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.dat");
        let packed = dir.path().join("partial.dat.zst");
        let unpacked = dir.path().join("partial.dat");
        fs::write(&input, "1^|2@@\n3^|4@@\n5^|6^|7@@\n").unwrap();

        let checked = Pipeline::new(PipelineConfig::new().expected_columns(2)).unwrap();
        let err = transcode_file(&checked, &input, &packed, Identity).unwrap_err();
        assert!(matches!(err, TranscodeError::ColumnCount { .. }));

        let keep = Pipeline::new(PipelineConfig::new()).unwrap();
        let stats = transcode_file(&keep, &packed, &unpacked, Identity).unwrap();
        assert_eq!(stats.rows_out, 2);
        assert_eq!(fs::read_to_string(&unpacked).unwrap(), "1^|2@@\n3^|4@@\n");
    }

    #[test]
    fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let err = transcode_file(
            &pipeline(),
            dir.path().join("nope.dat"),
            dir.path().join("out.csv"),
            Identity,
        )
        .unwrap_err();
        assert!(matches!(err, TranscodeError::Open { .. }));
    }
}
