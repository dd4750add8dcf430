//! iCalendar document parser (RFC 5545).
//!
//! Parses documents block by block. A component whose lines or values fail
//! to parse, or that never reaches its END line, is dropped and reported in
//! [`ParsedCalendar::skipped`]; its siblings are unaffected.

use std::iter::Peekable;

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{
    parse_date, parse_datetime, parse_duration, parse_integer, parse_rrule, unescape_text,
};
use crate::rfc::ical::core::{Component, ContentLine, ICalendar, Property, Value};

/// Result of a lenient document parse.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedCalendar {
    /// Every component that parsed cleanly.
    pub calendar: ICalendar,
    /// One entry per dropped line or component.
    pub skipped: Vec<ParseError>,
}

type LexedLine = (usize, ParseResult<ContentLine>);

/// Parses an iCalendar document from a string.
///
/// Never fails as a whole: input without a `BEGIN:VCALENDAR` line yields an
/// empty calendar, and broken components are skipped individually.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParsedCalendar {
    tracing::debug!("Parsing iCalendar document");

    let mut lines = split_lines(input)
        .into_iter()
        .map(|(line_num, line)| (line_num, parse_content_line(&line, line_num)))
        .peekable();

    let mut parsed = ParsedCalendar::default();

    let found_calendar = lines
        .by_ref()
        .any(|(_, cl)| cl.is_ok_and(|cl| cl.is_begin("VCALENDAR")));
    if !found_calendar {
        tracing::warn!("No VCALENDAR found in input");
        return parsed;
    }

    loop {
        let Some((line_num, cl)) = lines.next() else {
            tracing::warn!("Input ended before END:VCALENDAR");
            break;
        };

        let cl = match cl {
            Ok(cl) => cl,
            Err(err) => {
                tracing::warn!(%err, "Skipping malformed calendar line");
                parsed.skipped.push(err);
                continue;
            }
        };

        match cl.name.as_str() {
            "BEGIN" => {
                let name = cl.raw_value.to_ascii_uppercase();
                match parse_block(&mut lines, line_num, &name) {
                    Ok(component) => parsed.calendar.root.add_child(component),
                    Err(err) => {
                        tracing::warn!(component = %name, %err, "Skipping malformed component");
                        parsed.skipped.push(err);
                    }
                }
            }
            "END" if cl.is_end("VCALENDAR") => break,
            "END" => {
                let err = ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                    .with_context(format!("unexpected END:{}", cl.raw_value));
                tracing::warn!(%err, "Skipping stray END line");
                parsed.skipped.push(err);
            }
            _ => match parse_property(cl, line_num) {
                Ok(property) => parsed.calendar.root.add_property(property),
                Err(err) => {
                    tracing::warn!(%err, "Skipping malformed calendar property");
                    parsed.skipped.push(err);
                }
            },
        }
    }

    tracing::debug!(
        components = parsed.calendar.root.children.len(),
        skipped = parsed.skipped.len(),
        "iCalendar document parsed"
    );

    parsed
}

/// Collects the lines of one top-level component and parses them.
///
/// Always consumes the component's lines up to and including its END, even
/// when they contain errors, so parsing can resume at the next sibling. A
/// `BEGIN` of the same component name at top level, or `END:VCALENDAR`, ends
/// the component early and is left in the stream.
fn parse_block<I>(
    lines: &mut Peekable<I>,
    begin_line: usize,
    name: &str,
) -> ParseResult<Component>
where
    I: Iterator<Item = LexedLine>,
{
    let mut body = Vec::new();
    let mut open = vec![name.to_string()];
    let mut first_error = None;

    while !open.is_empty() {
        let restarts = match lines.peek() {
            None => true,
            Some((_, Ok(cl))) => {
                cl.is_end("VCALENDAR") || (open.len() == 1 && cl.is_begin(name))
            }
            Some((_, Err(_))) => false,
        };
        if restarts {
            return Err(ParseError::new(ParseErrorKind::MissingEnd, begin_line, 1)
                .with_context(format!("missing END:{name}")));
        }

        let Some((line_num, cl)) = lines.next() else {
            break;
        };
        let cl = match cl {
            Ok(cl) => cl,
            Err(err) => {
                first_error.get_or_insert(err);
                continue;
            }
        };

        match cl.name.as_str() {
            "BEGIN" => open.push(cl.raw_value.to_ascii_uppercase()),
            "END" => {
                let end_name = cl.raw_value.to_ascii_uppercase();
                if open.last() == Some(&end_name) {
                    open.pop();
                } else {
                    first_error.get_or_insert(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!("unexpected END:{end_name}")),
                    );
                    continue;
                }
            }
            _ => {}
        }
        body.push((line_num, cl));
    }

    if let Some(err) = first_error {
        return Err(err);
    }

    // The closing END line was collected too.
    body.pop();
    parse_component_body(&mut body.into_iter(), name)
}

/// Parses a component body whose BEGIN line has already been consumed.
///
/// The lines are known to be balanced, so running out of input simply ends
/// the outermost component.
fn parse_component_body(
    iter: &mut impl Iterator<Item = (usize, ContentLine)>,
    name: &str,
) -> ParseResult<Component> {
    let mut component = Component::named(name);

    while let Some((line_num, content_line)) = iter.next() {
        match content_line.name.as_str() {
            "BEGIN" => {
                let nested_name = content_line.raw_value.to_ascii_uppercase();
                let nested = parse_component_body(iter, &nested_name)?;
                component.add_child(nested);
            }
            "END" => {
                let end_name = content_line.raw_value.to_ascii_uppercase();
                if end_name != name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!("expected END:{name}, got END:{end_name}")),
                    );
                }
                return Ok(component);
            }
            _ => component.add_property(parse_property(content_line, line_num)?),
        }
    }

    Ok(component)
}

/// Parses a property from a content line, resolving the value type.
fn parse_property(cl: ContentLine, line_num: usize) -> ParseResult<Property> {
    let value_type = determine_value_type(&cl);
    let value = parse_value(&cl.raw_value, value_type, cl.tzid(), line_num)?;

    Ok(Property {
        name: cl.name,
        params: cl.params,
        value,
        raw_value: cl.raw_value,
    })
}

/// Determines the value type for a property.
fn determine_value_type(cl: &ContentLine) -> ValueType {
    if let Some(value_type) = cl.value_type() {
        return ValueType::from_param(value_type);
    }

    match cl.name.as_str() {
        // A bare YYYYMMDD is accepted as a DATE even without VALUE=DATE.
        "DTSTART" | "DTEND" | "DTSTAMP" | "CREATED" | "LAST-MODIFIED" | "RECURRENCE-ID"
        | "EXDATE" | "RDATE" => {
            if cl.raw_value.contains('T') {
                ValueType::DateTime
            } else {
                ValueType::Date
            }
        }
        "DURATION" => ValueType::Duration,
        "SEQUENCE" | "PRIORITY" => ValueType::Integer,
        "RRULE" => ValueType::Recur,
        "URL" | "ATTENDEE" | "ORGANIZER" => ValueType::Uri,
        _ => ValueType::Text,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueType {
    Date,
    DateTime,
    Duration,
    Integer,
    Recur,
    Text,
    Uri,
    Unknown,
}

impl ValueType {
    fn from_param(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "DATE" => Self::Date,
            "DATE-TIME" => Self::DateTime,
            "DURATION" => Self::Duration,
            "INTEGER" => Self::Integer,
            "RECUR" => Self::Recur,
            "TEXT" => Self::Text,
            "URI" | "CAL-ADDRESS" => Self::Uri,
            _ => Self::Unknown,
        }
    }
}

/// Parses a raw value string into a typed Value.
fn parse_value(
    raw: &str,
    value_type: ValueType,
    tzid: Option<&str>,
    line_num: usize,
) -> ParseResult<Value> {
    match value_type {
        ValueType::Text => Ok(Value::Text(unescape_text(raw))),
        ValueType::DateTime if raw.contains(',') => Ok(Value::DateTimeList(
            raw.split(',')
                .map(|s| parse_datetime(s.trim(), tzid, line_num, 1))
                .collect::<ParseResult<_>>()?,
        )),
        ValueType::DateTime => Ok(Value::DateTime(parse_datetime(raw, tzid, line_num, 1)?)),
        ValueType::Date if raw.contains(',') => Ok(Value::DateList(
            raw.split(',')
                .map(|s| parse_date(s.trim(), line_num, 1))
                .collect::<ParseResult<_>>()?,
        )),
        ValueType::Date => Ok(Value::Date(parse_date(raw, line_num, 1)?)),
        ValueType::Duration => Ok(Value::Duration(parse_duration(raw, line_num, 1)?)),
        ValueType::Integer => Ok(Value::Integer(parse_integer(raw, line_num, 1)?)),
        ValueType::Recur => Ok(Value::Recur(Box::new(parse_rrule(raw, line_num, 1)?))),
        ValueType::Uri => Ok(Value::Uri(raw.to_string())),
        ValueType::Unknown => Ok(Value::Unknown(raw.to_string())),
    }
}
