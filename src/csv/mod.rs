//! Delimited-text codec: delimiter matching, record parsing and encoding

mod encoder;
mod matcher;
mod parser;

pub use encoder::RowEncoder;
pub use matcher::{DelimiterMatch, DelimiterMatcher};
pub use parser::{QuoteState, RowParser};
