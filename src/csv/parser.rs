//! Record parsing with multi-character delimiters and RFC 4180-like quoting

use super::matcher::{DelimiterMatch, DelimiterMatcher};
use crate::charset::Charset;
use crate::error::{Result, TranscodeError};
use crate::source::{CharSource, DecodingSource};
use crate::types::{NewlinePolicy, Record};

/// Quote state of the field being assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    /// Delimiters are active
    Unquoted,
    /// Inside a quoted span: delimiters are plain data
    Quoted,
}

/// Pull parser producing one record per call
pub struct RowParser {
    matcher: DelimiterMatcher,
    quote: Option<char>,
    preserve_quotes: bool,
    newline_policy: NewlinePolicy,
    records: u64,
    finished: bool,
}

impl RowParser {
    /// Create a parser for the given delimiters and optional quote character
    pub fn new(row_delimiter: &str, column_delimiter: &str, quote: Option<char>) -> Self {
        RowParser {
            matcher: DelimiterMatcher::new(row_delimiter, column_delimiter),
            quote,
            preserve_quotes: false,
            newline_policy: NewlinePolicy::Preserve,
            records: 0,
            finished: false,
        }
    }

    /// Keep quote characters from the input in field values (builder pattern)
    pub fn preserve_quotes(mut self, preserve: bool) -> Self {
        self.preserve_quotes = preserve;
        self
    }

    /// How to treat `\n` in unquoted content (builder pattern)
    pub fn newline_policy(mut self, policy: NewlinePolicy) -> Self {
        self.newline_policy = policy;
        self
    }

    /// Records produced so far
    pub fn record_count(&self) -> u64 {
        self.records
    }

    /// The column delimiter, for reconstructing rows in diagnostics
    pub fn column_delimiter(&self) -> String {
        self.matcher.column_delimiter().iter().collect()
    }

    /// Read the next record, or `None` once the input is exhausted
    ///
    /// A quote left open at end of input is closed implicitly. A final
    /// record without a trailing row delimiter is still returned.
    pub fn next_record<S: CharSource>(&mut self, src: &mut S) -> Result<Option<Record>> {
        if self.finished {
            return Ok(None);
        }

        let mut record = Vec::new();
        let mut field = String::new();
        let mut state = QuoteState::Unquoted;
        let mut field_started = false;
        // `\r` just pushed outside quotes, eligible for `\r\n` collapsing
        let mut unquoted_cr = false;

        while let Some(ch) = src.read_char()? {
            let after_cr = std::mem::take(&mut unquoted_cr);
            match state {
                QuoteState::Unquoted => {
                    if !field_started {
                        field_started = true;
                        if self.quote == Some(ch) {
                            state = QuoteState::Quoted;
                            if self.preserve_quotes {
                                field.push(ch);
                            }
                            continue;
                        }
                    }

                    match self.matcher.try_match(ch, src)? {
                        DelimiterMatch::Row => {
                            record.push(field);
                            self.records += 1;
                            return Ok(Some(record));
                        }
                        DelimiterMatch::Column => {
                            record.push(std::mem::take(&mut field));
                            field_started = false;
                        }
                        DelimiterMatch::None => {
                            self.push_unquoted(&mut field, ch, after_cr)?;
                            unquoted_cr = ch == '\r';
                        }
                    }
                }
                QuoteState::Quoted => {
                    if self.quote != Some(ch) {
                        field.push(ch);
                        continue;
                    }
                    match src.read_char()? {
                        // Doubled quote is an escaped literal quote
                        Some(next) if next == ch => {
                            field.push(ch);
                            if self.preserve_quotes {
                                field.push(next);
                            }
                        }
                        Some(next) => {
                            if self.preserve_quotes {
                                field.push(ch);
                            }
                            state = QuoteState::Unquoted;
                            src.unread(&[next]);
                        }
                        None => {
                            if self.preserve_quotes {
                                field.push(ch);
                            }
                            break;
                        }
                    }
                }
            }
        }

        self.finished = true;
        if field_started || !record.is_empty() {
            record.push(field);
            self.records += 1;
            return Ok(Some(record));
        }
        Ok(None)
    }

    fn push_unquoted(&self, field: &mut String, ch: char, after_cr: bool) -> Result<()> {
        if ch != '\n' {
            field.push(ch);
            return Ok(());
        }
        match self.newline_policy {
            NewlinePolicy::Preserve => field.push(ch),
            NewlinePolicy::Space => {
                if after_cr {
                    field.pop();
                }
                field.push(' ');
            }
            NewlinePolicy::Reject => {
                return Err(TranscodeError::UnquotedNewline {
                    row: self.records + 1,
                })
            }
        }
        Ok(())
    }

    /// Parse and drop one record, ignoring the newline policy
    ///
    /// Returns `false` when the input is exhausted.
    pub fn skip_record<S: CharSource>(&mut self, src: &mut S) -> Result<bool> {
        let policy = std::mem::replace(&mut self.newline_policy, NewlinePolicy::Preserve);
        let record = self.next_record(src);
        self.newline_policy = policy;
        Ok(record?.is_some())
    }

    /// Parse a complete in-memory text into records
    ///
    /// Convenient for small inputs and tests; streaming callers should use
    /// [`RowParser::next_record`] or [`crate::csv_reader::RowReader`].
    pub fn parse_text(&mut self, text: &str) -> Result<Vec<Record>> {
        let mut src = DecodingSource::new(text.as_bytes(), Charset::utf8());
        let mut records = Vec::new();
        while let Some(record) = self.next_record(&mut src)? {
            records.push(record);
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser() -> RowParser {
        RowParser::new("@@\n", "^|", Some('"'))
    }

    #[test]
    fn test_simple() {
        let rows = parser().parse_text("a^|b^|c@@\nd^|e^|f@@\n").unwrap();
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
    }

    #[test]
    fn test_no_trailing_row_delimiter() {
        let rows = parser().parse_text("x^|y^|z").unwrap();
        assert_eq!(rows, vec![vec!["x", "y", "z"]]);
    }

    #[test]
    fn test_quoted_delimiters_and_escapes() {
        let input = "foo^|\"bar^|baz\"^|\"He said \"\"Hi\"\"\"@@\n";
        let rows = parser().parse_text(input).unwrap();
        assert_eq!(rows, vec![vec!["foo", "bar^|baz", "He said \"Hi\""]]);
    }

    #[test]
    fn test_preserve_quotes() {
        let input = "\"a\"\"b\"^|c@@\n";
        let rows = parser().preserve_quotes(true).parse_text(input).unwrap();
        assert_eq!(rows, vec![vec!["\"a\"\"b\"", "c"]]);
    }

    #[test]
    fn test_quoted_row_delimiter_is_data() {
        let rows = parser().parse_text("\"line1@@\nline2\"^|x@@\n").unwrap();
        assert_eq!(rows, vec![vec!["line1@@\nline2", "x"]]);
    }

    #[test]
    fn test_unterminated_quote_at_eof() {
        let rows = parser().parse_text("a^|\"open^|still").unwrap();
        assert_eq!(rows, vec![vec!["a", "open^|still"]]);
    }

    #[test]
    fn test_quote_as_last_char_of_input() {
        let rows = parser().parse_text("a^|\"b\"").unwrap();
        assert_eq!(rows, vec![vec!["a", "b"]]);
        let rows = parser().preserve_quotes(true).parse_text("a^|\"b\"").unwrap();
        assert_eq!(rows, vec![vec!["a", "\"b\""]]);
    }

    #[test]
    fn test_quote_mid_field_is_literal() {
        let rows = parser().parse_text("ab\"c^|d@@\n").unwrap();
        assert_eq!(rows, vec![vec!["ab\"c", "d"]]);
    }

    #[test]
    fn test_text_after_closing_quote() {
        let rows = parser().parse_text("\"ab\"cd^|e@@\n").unwrap();
        assert_eq!(rows, vec![vec!["abcd", "e"]]);
    }

    #[test]
    fn test_empty_fields() {
        let rows = parser().parse_text("a^|^|c@@\n^|^|@@\n").unwrap();
        assert_eq!(rows, vec![vec!["a", "", "c"], vec!["", "", ""]]);
    }

    #[test]
    fn test_empty_row() {
        let rows = parser().parse_text("@@\na@@\n").unwrap();
        assert_eq!(rows, vec![vec![""], vec!["a"]]);
    }

    #[test]
    fn test_quoted_empty_at_eof() {
        let rows = parser().parse_text("\"\"").unwrap();
        assert_eq!(rows, vec![vec![""]]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parser().parse_text("").unwrap().is_empty());
    }

    #[test]
    fn test_without_quote_char() {
        let mut p = RowParser::new("@@\n", "^|", None);
        let rows = p.parse_text("\"a^|b\"@@\n").unwrap();
        assert_eq!(rows, vec![vec!["\"a", "b\""]]);
    }

    #[test]
    fn test_newline_preserved_by_default() {
        let rows = parser().parse_text("a\nb^|c@@\n").unwrap();
        assert_eq!(rows, vec![vec!["a\nb", "c"]]);
    }

    #[test]
    fn test_newline_to_space() {
        let mut p = parser().newline_policy(NewlinePolicy::Space);
        let rows = p.parse_text("a\r\nb^|c\nd^|\"q\nq\"@@\n").unwrap();
        assert_eq!(rows, vec![vec!["a b", "c d", "q\nq"]]);
    }

    #[test]
    fn test_space_keeps_quoted_carriage_return() {
        let mut p = parser().newline_policy(NewlinePolicy::Space);
        let rows = p.parse_text("\"a\r\"\nb@@\n").unwrap();
        assert_eq!(rows, vec![vec!["a\r b"]]);
    }

    #[test]
    fn test_space_collapses_unquoted_crlf_only() {
        let mut p = parser().newline_policy(NewlinePolicy::Space);
        let rows = p.parse_text("x\r\ny^|z\r^|\n@@\n").unwrap();
        assert_eq!(rows, vec![vec!["x y", "z\r", " "]]);
    }

    #[test]
    fn test_skip_record_ignores_reject_policy() {
        let mut p = parser().newline_policy(NewlinePolicy::Reject);
        let mut src = DecodingSource::new("pre\namble@@\nok@@\n".as_bytes(), Charset::utf8());
        assert!(p.skip_record(&mut src).unwrap());
        assert_eq!(p.next_record(&mut src).unwrap(), Some(vec!["ok".to_string()]));
        assert!(!p.skip_record(&mut src).unwrap());
    }

    #[test]
    fn test_newline_rejected() {
        let mut p = parser().newline_policy(NewlinePolicy::Reject);
        let err = p.parse_text("ok@@\nbad\nrow@@\n").unwrap_err();
        assert!(matches!(err, TranscodeError::UnquotedNewline { row: 2 }));
    }

    #[test]
    fn test_custom_delimiters_csv() {
        let mut p = RowParser::new("\n", ",", Some('"'));
        let rows = p.parse_text("a,\"b,c\",d\n\"Say \"\"Hello\"\"\",world\n").unwrap();
        assert_eq!(
            rows,
            vec![vec!["a", "b,c", "d"], vec!["Say \"Hello\"", "world"]]
        );
    }

    #[test]
    fn test_record_count() {
        let mut p = parser();
        p.parse_text("a@@\nb@@\nc").unwrap();
        assert_eq!(p.record_count(), 3);
    }

    #[test]
    fn test_partial_row_delimiter_at_end() {
        let rows = parser().parse_text("a^|b@@").unwrap();
        assert_eq!(rows, vec![vec!["a", "b"]]);
    }
}
