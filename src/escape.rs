//! Escape syntax for delimiter and quote settings
//!
//! Configuration values are usually typed into property files or command
//! lines where control characters are awkward, so delimiters accept
//! `\n`, `\r`, `\t`, `\\` and `\uXXXX`. Any other escaped character stands
//! for itself.

use crate::error::{Result, TranscodeError};

/// Resolve escape sequences in a delimiter or quote setting
///
/// # Examples
///
/// ```
/// use delimstream::escape::unescape;
///
/// assert_eq!(unescape("@@\\n"), "@@\n");
/// assert_eq!(unescape("\\u001F"), "\u{1F}");
/// ```
pub fn unescape(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::with_capacity(raw.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' || i >= chars.len() {
            out.push(c);
            continue;
        }

        let n = chars[i];
        i += 1;
        match n {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            '\\' => out.push('\\'),
            'u' => match decode_hex4(&chars[i..]) {
                Some(ch) => {
                    out.push(ch);
                    i += 4;
                }
                None => out.push_str("\\u"),
            },
            other => out.push(other),
        }
    }

    out
}

fn decode_hex4(chars: &[char]) -> Option<char> {
    if chars.len() < 4 {
        return None;
    }
    let hex: String = chars[..4].iter().collect();
    let code = u32::from_str_radix(&hex, 16).ok()?;
    char::from_u32(code)
}

/// Render control characters back to escapes, for logs and diagnostics
pub fn printable(value: &str) -> String {
    value
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Resolve a quote setting
///
/// An empty setting disables quoting. Anything else must unescape to
/// exactly one character.
pub fn parse_quote(raw: &str) -> Result<Option<char>> {
    if raw.is_empty() {
        return Ok(None);
    }
    let resolved = unescape(raw);
    let mut chars = resolved.chars();
    match (chars.next(), chars.next()) {
        (Some(q), None) => Ok(Some(q)),
        _ => Err(TranscodeError::Config(format!(
            "quote must be exactly one character after unescape, got '{}'",
            printable(&resolved)
        ))),
    }
}

/// Resolve a delimiter setting, rejecting values that end up empty
pub fn parse_delimiter(raw: &str, what: &str) -> Result<String> {
    let resolved = unescape(raw);
    if resolved.is_empty() {
        return Err(TranscodeError::Config(format!(
            "{} must not be empty after unescape",
            what
        )));
    }
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_escapes() {
        assert_eq!(unescape("\\r\\n"), "\r\n");
        assert_eq!(unescape("a\\tb"), "a\tb");
        assert_eq!(unescape("\\\\"), "\\");
        assert_eq!(unescape("^|"), "^|");
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(unescape("\\u001E\\u001F"), "\u{1E}\u{1F}");
        assert_eq!(unescape("x\\u00e9y"), "xéy");
    }

    #[test]
    fn test_incomplete_unicode_stays_literal() {
        assert_eq!(unescape("\\u12"), "\\u12");
        assert_eq!(unescape("\\uZZZZ"), "\\uZZZZ");
    }

    #[test]
    fn test_trailing_backslash_and_unknown_escape() {
        assert_eq!(unescape("abc\\"), "abc\\");
        assert_eq!(unescape("\\|"), "|");
    }

    #[test]
    fn test_printable() {
        assert_eq!(printable("@@\r\n\t"), "@@\\r\\n\\t");
    }

    #[test]
    fn test_parse_quote() {
        assert_eq!(parse_quote("").unwrap(), None);
        assert_eq!(parse_quote("\"").unwrap(), Some('"'));
        assert_eq!(parse_quote("\\u0027").unwrap(), Some('\''));
        assert!(parse_quote("''").is_err());
    }

    #[test]
    fn test_parse_delimiter_rejects_empty() {
        assert!(parse_delimiter("", "row delimiter").is_err());
        assert_eq!(parse_delimiter("@@\\n", "row delimiter").unwrap(), "@@\n");
    }
}
