//! Record encoding with multi-character delimiters

use crate::types::QuoteMode;

/// Encodes records into delimited text
pub struct RowEncoder {
    column_delimiter: String,
    row_delimiter: String,
    quote: Option<char>,
    mode: QuoteMode,
}

impl RowEncoder {
    /// Create an encoder; without a quote character nothing is ever quoted
    pub fn new(
        column_delimiter: &str,
        row_delimiter: &str,
        quote: Option<char>,
        mode: QuoteMode,
    ) -> Self {
        Self {
            column_delimiter: column_delimiter.to_string(),
            row_delimiter: row_delimiter.to_string(),
            quote,
            mode,
        }
    }

    /// Row delimiter written after each record
    pub fn row_delimiter(&self) -> &str {
        &self.row_delimiter
    }

    /// Encode the fields of one record into `buffer`, without the row delimiter
    pub fn encode_row<S: AsRef<str>>(&self, fields: &[S], buffer: &mut String) {
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                buffer.push_str(&self.column_delimiter);
            }
            self.encode_field(field.as_ref(), buffer);
        }
    }

    /// Encode a single field with quoting/escaping per the quote mode
    fn encode_field(&self, field: &str, buffer: &mut String) {
        let quote = match self.quote {
            Some(q) if self.needs_quoting(field, q) => q,
            _ => {
                buffer.push_str(field);
                return;
            }
        };

        buffer.push(quote);
        for ch in field.chars() {
            if ch == quote {
                // Escape quotes by doubling: " -> ""
                buffer.push(quote);
            }
            buffer.push(ch);
        }
        buffer.push(quote);
    }

    fn needs_quoting(&self, field: &str, quote: char) -> bool {
        match self.mode {
            QuoteMode::Never => false,
            QuoteMode::Always => true,
            QuoteMode::AsNeeded => {
                field.contains(quote)
                    || field.contains(self.column_delimiter.as_str())
                    || field.contains(self.row_delimiter.as_str())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(encoder: &RowEncoder, fields: &[&str]) -> String {
        let mut buffer = String::new();
        encoder.encode_row(fields, &mut buffer);
        buffer
    }

    fn as_needed() -> RowEncoder {
        RowEncoder::new("^|", "@@\n", Some('"'), QuoteMode::AsNeeded)
    }

    #[test]
    fn test_simple_fields() {
        assert_eq!(encode(&as_needed(), &["a", "b", "c"]), "a^|b^|c");
    }

    #[test]
    fn test_quoted_fields() {
        assert_eq!(encode(&as_needed(), &["a^|b", "c"]), "\"a^|b\"^|c");
        assert_eq!(encode(&as_needed(), &["x@@\ny"]), "\"x@@\ny\"");
    }

    #[test]
    fn test_partial_delimiter_not_quoted() {
        assert_eq!(encode(&as_needed(), &["a^b", "c|d", "@@"]), "a^b^|c|d^|@@");
    }

    #[test]
    fn test_escaped_quotes() {
        assert_eq!(
            encode(&as_needed(), &[r#"Say "Hello""#, "world"]),
            r#""Say ""Hello"""^|world"#
        );
    }

    #[test]
    fn test_newlines_not_special_for_custom_row_delimiter() {
        assert_eq!(encode(&as_needed(), &["Line 1\nLine 2"]), "Line 1\nLine 2");
    }

    #[test]
    fn test_always_and_never() {
        let always = RowEncoder::new(",", "\n", Some('\''), QuoteMode::Always);
        assert_eq!(encode(&always, &["a", "", "it's"]), "'a','','it''s'");

        let never = RowEncoder::new(",", "\n", Some('"'), QuoteMode::Never);
        assert_eq!(encode(&never, &["a,b", "\"c\""]), "a,b,\"c\"");
    }

    #[test]
    fn test_no_quote_char_never_quotes() {
        let encoder = RowEncoder::new(",", "\n", None, QuoteMode::Always);
        assert_eq!(encode(&encoder, &["a,b"]), "a,b");
    }

    #[test]
    fn test_empty_fields() {
        assert_eq!(encode(&as_needed(), &["a", "", "c"]), "a^|^|c");
        assert_eq!(encode(&as_needed(), &["", "", ""]), "^|^|");
    }
}
