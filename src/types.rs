//! Type definitions shared by the parser, writer and pipeline

use std::fmt;

/// One parsed row: fields in column order
pub type Record = Vec<String>;

/// Output quoting policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum QuoteMode {
    /// Never wrap fields in quotes
    Never,
    /// Always wrap fields in quotes
    Always,
    /// Quote a field only when it contains the quote character,
    /// the output column delimiter or the output row delimiter
    #[default]
    AsNeeded,
}

impl QuoteMode {
    /// Parse the names used by configuration files (`NEVER`, `ALWAYS`, `AS_NEEDED`)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "NEVER" => Some(QuoteMode::Never),
            "ALWAYS" => Some(QuoteMode::Always),
            "AS_NEEDED" | "ASNEEDED" => Some(QuoteMode::AsNeeded),
            _ => None,
        }
    }
}

impl fmt::Display for QuoteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QuoteMode::Never => "NEVER",
            QuoteMode::Always => "ALWAYS",
            QuoteMode::AsNeeded => "AS_NEEDED",
        };
        f.write_str(name)
    }
}

/// Treatment of a literal `\n` inside unquoted field content
///
/// Quoted content is never affected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum NewlinePolicy {
    /// Keep the newline as data
    #[default]
    Preserve,
    /// Replace `\n` (and `\r\n`) with a single space
    Space,
    /// Fail the run
    Reject,
}

/// Fixed-width validation applied to data rows
///
/// Lengths are counted in characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WidthCheck {
    /// Every field must have exactly this many characters
    PerField(usize),
    /// All fields concatenated must have exactly this many characters
    RowTotal(usize),
}

impl WidthCheck {
    /// Configured width
    pub fn width(&self) -> usize {
        match self {
            WidthCheck::PerField(w) | WidthCheck::RowTotal(w) => *w,
        }
    }
}

/// Counters reported at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunStats {
    /// Leading records discarded (may be less than requested on short input)
    pub rows_skipped: u64,
    /// Whether a header row was passed through
    pub header_written: bool,
    /// Data records parsed after skip and header
    pub rows_in: u64,
    /// Data records written
    pub rows_out: u64,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "skipped={} header={} in={} out={}",
            self.rows_skipped, self.header_written, self.rows_in, self.rows_out
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_mode_names() {
        assert_eq!(QuoteMode::from_name("as_needed"), Some(QuoteMode::AsNeeded));
        assert_eq!(QuoteMode::from_name(" ALWAYS "), Some(QuoteMode::Always));
        assert_eq!(QuoteMode::from_name("sometimes"), None);
        assert_eq!(QuoteMode::Never.to_string(), "NEVER");
        assert_eq!(QuoteMode::default(), QuoteMode::AsNeeded);
    }

    #[test]
    fn test_run_stats_display() {
        let stats = RunStats {
            rows_skipped: 2,
            header_written: true,
            rows_in: 10,
            rows_out: 10,
        };
        assert_eq!(stats.to_string(), "skipped=2 header=true in=10 out=10");
    }

    #[test]
    fn test_width_check_width() {
        assert_eq!(WidthCheck::PerField(4).width(), 4);
        assert_eq!(WidthCheck::RowTotal(12).width(), 12);
    }
}
