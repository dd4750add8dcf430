//! iCalendar parsing primitives (RFC 5545).
//!
//! - Lexer: line unfolding and content line tokenization
//! - Values: value type parsing (DATE, DATE-TIME, DURATION, RECUR, TEXT)
//! - Parser: block-tolerant document parsing into typed components

mod error;
mod lexer;
mod parser;
mod values;

pub use error::{ParseError, ParseErrorKind, ParseResult};
pub use lexer::{parse_content_line, split_lines, unfold};
pub use parser::{ParsedCalendar, parse};
pub use values::{
    parse_date, parse_datetime, parse_duration, parse_integer, parse_rrule, unescape_text,
};
