//! Content line lexer for iCalendar (RFC 5545 §3.1).
//!
//! Handles line unfolding and tokenization of content lines.

use std::iter::Peekable;
use std::str::CharIndices;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{ContentLine, Parameter};

/// Unfolds content lines by removing line breaks followed by whitespace.
///
/// Both CRLF and bare LF are accepted. A fold is the line break plus a
/// single SPACE or HTAB, and is removed entirely. Remaining line breaks are
/// normalized to CRLF.
#[must_use]
pub fn unfold(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        let is_break = match c {
            '\r' if chars.peek() == Some(&'\n') => {
                chars.next();
                true
            }
            '\n' => true,
            _ => false,
        };

        if !is_break {
            result.push(c);
            continue;
        }

        if matches!(chars.peek(), Some(' ' | '\t')) {
            chars.next();
        } else {
            result.push_str("\r\n");
        }
    }

    result
}

/// Splits input into content lines, merging folded continuations.
///
/// Returns `(line_number, line)` pairs where the line number is the 1-based
/// physical line the logical line started on. Blank lines are dropped.
/// Lines without a colon are treated as continuations of the previous line,
/// which tolerates exporters that fold without the leading whitespace.
#[must_use]
pub fn split_lines(input: &str) -> Vec<(usize, String)> {
    let mut lines: Vec<(usize, String)> = Vec::new();

    for (i, raw_line) in input.lines().enumerate() {
        let line = raw_line.trim_end_matches('\r');
        if line.trim().is_empty() {
            continue;
        }

        let continuation = if let Some(rest) = line.strip_prefix([' ', '\t']) {
            Some(rest)
        } else if line.contains(':') {
            None
        } else {
            Some(line)
        };

        match (continuation, lines.last_mut()) {
            (Some(rest), Some((_, prev))) => prev.push_str(rest),
            (Some(rest), None) => lines.push((i + 1, rest.to_string())),
            (None, _) => lines.push((i + 1, line.to_string())),
        }
    }

    lines
}

/// Parses a single content line.
///
/// Format: `name *(";" param) ":" value`
///
/// ## Errors
/// Returns an error if the line is malformed or contains invalid characters.
pub fn parse_content_line(line: &str, line_num: usize) -> ParseResult<ContentLine> {
    let mut chars = line.char_indices().peekable();
    let mut name_end = None;
    let mut colon_pos = None;

    while let Some(&(i, c)) = chars.peek() {
        if c == ';' || c == ':' {
            name_end = Some(i);
            if c == ':' {
                colon_pos = Some(i);
            }
            chars.next();
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidPropertyName,
                line_num,
                i + 1,
            ));
        }
        chars.next();
    }

    let name_end = match name_end {
        Some(0) => {
            return Err(ParseError::new(
                ParseErrorKind::MissingPropertyName,
                line_num,
                1,
            ));
        }
        Some(end) => end,
        None => {
            return Err(ParseError::new(
                ParseErrorKind::MissingColon,
                line_num,
                line.len(),
            ));
        }
    };

    let name = line[..name_end].to_ascii_uppercase();

    let mut params = Vec::new();
    while colon_pos.is_none() {
        let (param, colon) = parse_parameter(&mut chars, line, line_num)?;
        params.push(param);
        colon_pos = colon;
    }

    let value = colon_pos.map_or("", |pos| &line[pos + 1..]);

    Ok(ContentLine {
        name,
        params,
        raw_value: value.to_string(),
    })
}

/// Parses a single parameter from the character stream.
///
/// Returns the parameter and, when the parameter list ended, the byte
/// position of the colon that starts the value.
fn parse_parameter(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<(Parameter, Option<usize>)> {
    let start = chars.peek().map_or(line.len(), |&(i, _)| i);

    let mut name_end = None;
    while let Some(&(i, c)) = chars.peek() {
        chars.next();
        if c == '=' {
            name_end = Some(i);
            break;
        }
        if !c.is_ascii_alphanumeric() && c != '-' {
            return Err(ParseError::new(
                ParseErrorKind::InvalidParameter,
                line_num,
                i + 1,
            ));
        }
    }

    let name_end = name_end
        .filter(|&end| end > start)
        .ok_or_else(|| ParseError::new(ParseErrorKind::InvalidParameter, line_num, start + 1))?;

    let param_name = line[start..name_end].to_ascii_uppercase();

    let mut values = Vec::new();
    loop {
        values.push(parse_param_value(chars, line, line_num)?);

        match chars.next() {
            Some((_, ',')) => {}
            Some((_, ';')) => return Ok((Parameter::with_values(param_name, values), None)),
            Some((i, ':')) => return Ok((Parameter::with_values(param_name, values), Some(i))),
            Some((i, c)) => {
                return Err(
                    ParseError::new(ParseErrorKind::InvalidParameter, line_num, i + 1)
                        .with_context(format!("unexpected character '{c}'")),
                );
            }
            None => {
                return Err(ParseError::new(
                    ParseErrorKind::MissingColon,
                    line_num,
                    line.len(),
                ));
            }
        }
    }
}

/// Parses a parameter value (possibly quoted, with RFC 6868 caret escapes).
fn parse_param_value(
    chars: &mut Peekable<CharIndices<'_>>,
    line: &str,
    line_num: usize,
) -> ParseResult<String> {
    let Some(&(start, first)) = chars.peek() else {
        return Err(ParseError::new(
            ParseErrorKind::InvalidParameter,
            line_num,
            line.len(),
        ));
    };

    if first != '"' {
        let mut end = start;
        while let Some(&(i, c)) = chars.peek() {
            if c == ',' || c == ';' || c == ':' {
                break;
            }
            end = i + c.len_utf8();
            chars.next();
        }
        return Ok(line[start..end].to_string());
    }

    chars.next();
    let mut value = String::new();

    while let Some((_, c)) = chars.next() {
        match c {
            '"' => return Ok(value),
            '^' => match chars.peek() {
                Some(&(_, '^')) => {
                    value.push('^');
                    chars.next();
                }
                Some(&(_, 'n')) => {
                    value.push('\n');
                    chars.next();
                }
                Some(&(_, '\'')) => {
                    value.push('"');
                    chars.next();
                }
                _ => value.push('^'),
            },
            _ => value.push(c),
        }
    }

    Err(ParseError::new(
        ParseErrorKind::UnclosedQuote,
        line_num,
        start + 1,
    ))
}
