//! Per-row transformation callbacks
//!
//! A processor sees every data record (never the header) after validation
//! and returns the record to write. Returning an error aborts the run.

use crate::error::Result;
use crate::types::Record;

/// Transformation applied to each data record
pub trait RowProcessor {
    /// Transform one record
    fn process(&mut self, row: Record) -> Result<Record>;
}

impl<F> RowProcessor for F
where
    F: FnMut(Record) -> Result<Record>,
{
    fn process(&mut self, row: Record) -> Result<Record> {
        self(row)
    }
}

/// Writes records unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl RowProcessor for Identity {
    fn process(&mut self, row: Record) -> Result<Record> {
        Ok(row)
    }
}

/// Replaces `\r\n` and `\n` with a single space in every field
///
/// Unlike [`crate::types::NewlinePolicy::Space`], this also rewrites quoted
/// content.
#[derive(Debug, Clone, Copy, Default)]
pub struct NewlineToSpace;

impl RowProcessor for NewlineToSpace {
    fn process(&mut self, row: Record) -> Result<Record> {
        Ok(row
            .into_iter()
            .map(|field| {
                if field.contains('\n') {
                    field.replace("\r\n", " ").replace('\n', " ")
                } else {
                    field
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TranscodeError;

    fn row(fields: &[&str]) -> Record {
        fields.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identity() {
        assert_eq!(Identity.process(row(&["a", "b"])).unwrap(), row(&["a", "b"]));
    }

    #[test]
    fn test_newline_to_space() {
        let out = NewlineToSpace
            .process(row(&["a\r\nb", "c\nd\n", "e\rf"]))
            .unwrap();
        assert_eq!(out, row(&["a b", "c d ", "e\rf"]));
    }

    #[test]
    fn test_closure_processor() {
        let mut seen = 0;
        let mut upper = |r: Record| -> Result<Record> {
            seen += 1;
            Ok(r.into_iter().map(|f| f.to_uppercase()).collect())
        };
        assert_eq!(upper.process(row(&["x"])).unwrap(), row(&["X"]));
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_closure_can_abort() {
        let mut reject =
            |_: Record| -> Result<Record> { Err(TranscodeError::processor(1, "bad row")) };
        assert!(reject.process(row(&["x"])).is_err());
    }
}
