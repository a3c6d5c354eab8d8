//! Multi-character delimiter matching over a push-back source

use crate::error::Result;
use crate::source::CharSource;

/// Outcome of a delimiter probe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterMatch {
    /// The character is ordinary data
    None,
    /// A row delimiter ends here
    Row,
    /// A column delimiter ends here
    Column,
}

/// Decides whether the upcoming characters form the row or column delimiter
///
/// Rules:
/// - read-ahead only happens when the current character starts a delimiter
/// - when both delimiters match, the longer one wins, and the row delimiter
///   wins a tie
/// - at end of input, a partial row delimiter still ends the row
/// - everything read but not part of the match is pushed back
pub struct DelimiterMatcher {
    row: Vec<char>,
    column: Vec<char>,
    lookahead: usize,
    scratch: Vec<char>,
    consumed: usize,
}

impl DelimiterMatcher {
    /// Create a matcher; both delimiters must be non-empty
    pub fn new(row: &str, column: &str) -> Self {
        let row: Vec<char> = row.chars().collect();
        let column: Vec<char> = column.chars().collect();
        let longest = row.len().max(column.len());
        DelimiterMatcher {
            lookahead: longest.saturating_sub(1),
            scratch: Vec::with_capacity(longest),
            row,
            column,
            consumed: 0,
        }
    }

    /// Number of characters, `first` included, used by the last probe
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Row delimiter characters
    pub fn row_delimiter(&self) -> &[char] {
        &self.row
    }

    /// Column delimiter characters
    pub fn column_delimiter(&self) -> &[char] {
        &self.column
    }

    /// Probe the delimiters starting at `first`, which was just read from `src`
    pub fn try_match<S: CharSource>(&mut self, first: char, src: &mut S) -> Result<DelimiterMatch> {
        self.consumed = 1;
        if self.row.first() != Some(&first) && self.column.first() != Some(&first) {
            return Ok(DelimiterMatch::None);
        }

        self.scratch.clear();
        self.scratch.push(first);
        let read = src.read_chars(&mut self.scratch, self.lookahead)?;
        let truncated = read < self.lookahead;

        let row_hit = self.scratch.starts_with(&self.row);
        let column_hit = self.scratch.starts_with(&self.column);

        let winner = match (row_hit, column_hit) {
            (true, true) if self.column.len() > self.row.len() => Some(DelimiterMatch::Column),
            (true, _) => Some(DelimiterMatch::Row),
            (false, true) => Some(DelimiterMatch::Column),
            (false, false) => None,
        };

        match winner {
            Some(hit) => {
                let len = if hit == DelimiterMatch::Row {
                    self.row.len()
                } else {
                    self.column.len()
                };
                src.unread(&self.scratch[len..]);
                self.consumed = len;
                Ok(hit)
            }
            None if truncated
                && self.scratch.len() < self.row.len()
                && self.row.starts_with(&self.scratch) =>
            {
                self.consumed = self.scratch.len();
                Ok(DelimiterMatch::Row)
            }
            None => {
                src.unread(&self.scratch[1..]);
                Ok(DelimiterMatch::None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charset::Charset;
    use crate::source::DecodingSource;

    fn source(text: &str) -> DecodingSource<&[u8]> {
        DecodingSource::new(text.as_bytes(), Charset::utf8())
    }

    fn rest<S: CharSource>(src: &mut S) -> String {
        let mut out = String::new();
        while let Some(c) = src.read_char().unwrap() {
            out.push(c);
        }
        out
    }

    #[test]
    fn test_no_candidate_reads_nothing() {
        let mut m = DelimiterMatcher::new("@@\n", "^|");
        let mut src = source("bc");
        assert_eq!(m.try_match('a', &mut src).unwrap(), DelimiterMatch::None);
        assert_eq!(m.consumed(), 1);
        assert_eq!(rest(&mut src), "bc");
    }

    #[test]
    fn test_column_match_pushes_back_extra() {
        let mut m = DelimiterMatcher::new("@@\n", "^|");
        let mut src = source("|xy");
        assert_eq!(m.try_match('^', &mut src).unwrap(), DelimiterMatch::Column);
        assert_eq!(m.consumed(), 2);
        assert_eq!(rest(&mut src), "xy");
    }

    #[test]
    fn test_row_match() {
        let mut m = DelimiterMatcher::new("@@\n", "^|");
        let mut src = source("@\nnext");
        assert_eq!(m.try_match('@', &mut src).unwrap(), DelimiterMatch::Row);
        assert_eq!(m.consumed(), 3);
        assert_eq!(rest(&mut src), "next");
    }

    #[test]
    fn test_failed_probe_restores_stream() {
        let mut m = DelimiterMatcher::new("@@\n", "^|");
        let mut src = source("@x@@\n");
        assert_eq!(m.try_match('@', &mut src).unwrap(), DelimiterMatch::None);
        assert_eq!(rest(&mut src), "@x@@\n");
    }

    #[test]
    fn test_longest_match_wins() {
        // column delimiter is a prefix of the row delimiter
        let mut m = DelimiterMatcher::new("^|\n", "^|");
        let mut src = source("|\nz");
        assert_eq!(m.try_match('^', &mut src).unwrap(), DelimiterMatch::Row);
        assert_eq!(rest(&mut src), "z");

        let mut src = source("|z");
        assert_eq!(m.try_match('^', &mut src).unwrap(), DelimiterMatch::Column);
        assert_eq!(rest(&mut src), "z");
    }

    #[test]
    fn test_longer_column_beats_row_prefix() {
        let mut m = DelimiterMatcher::new("|", "||");
        let mut src = source("|a");
        assert_eq!(m.try_match('|', &mut src).unwrap(), DelimiterMatch::Column);
        assert_eq!(rest(&mut src), "a");

        let mut src = source("a");
        assert_eq!(m.try_match('|', &mut src).unwrap(), DelimiterMatch::Row);
        assert_eq!(rest(&mut src), "a");
    }

    #[test]
    fn test_equal_length_prefers_row() {
        let mut m = DelimiterMatcher::new("##", "##");
        let mut src = source("#");
        assert_eq!(m.try_match('#', &mut src).unwrap(), DelimiterMatch::Row);
    }

    #[test]
    fn test_partial_row_delimiter_at_eof() {
        let mut m = DelimiterMatcher::new("@@\n", "^|");
        let mut src = source("@");
        assert_eq!(m.try_match('@', &mut src).unwrap(), DelimiterMatch::Row);
        assert_eq!(m.consumed(), 2);
        assert_eq!(src.read_char().unwrap(), None);
    }

    #[test]
    fn test_partial_column_delimiter_at_eof_is_data() {
        let mut m = DelimiterMatcher::new("@@\n", "^|~");
        let mut src = source("|");
        assert_eq!(m.try_match('^', &mut src).unwrap(), DelimiterMatch::None);
        assert_eq!(rest(&mut src), "|");
    }

    #[test]
    fn test_single_char_delimiters() {
        let mut m = DelimiterMatcher::new("\n", ",");
        let mut src = source("x");
        assert_eq!(m.try_match(',', &mut src).unwrap(), DelimiterMatch::Column);
        assert_eq!(m.try_match('\n', &mut src).unwrap(), DelimiterMatch::Row);
        assert_eq!(rest(&mut src), "x");
    }
}
