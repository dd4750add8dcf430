//! Value type parsers for iCalendar (RFC 5545 §3.3).

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{
    Date, DateTime, DateTimeForm, Duration, Frequency, RRule, RRuleUntil, Weekday, WeekdayNum,
};

/// Parses a fixed-width run of ASCII digits.
fn digits<T: std::str::FromStr>(s: &str, len: usize) -> Option<T> {
    if s.len() != len || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "20260105")
///
/// ## Errors
/// Returns an error if the string is not a valid 8-digit date.
pub fn parse_date(s: &str, line: usize, col: usize) -> ParseResult<Date> {
    let err = || ParseError::new(ParseErrorKind::InvalidDate, line, col);

    if s.len() != 8 || !s.is_ascii() {
        return Err(err().with_context(format!("expected YYYYMMDD, got '{s}'")));
    }

    let year = digits::<u16>(&s[0..4], 4).ok_or_else(err)?;
    let month = digits::<u8>(&s[4..6], 2).ok_or_else(err)?;
    let day = digits::<u8>(&s[6..8], 2).ok_or_else(err)?;

    if !(1..=12).contains(&month) || !(1..=31).contains(&day) {
        return Err(err().with_context(format!("month or day out of range in '{s}'")));
    }

    Ok(Date { year, month, day })
}

/// Parses a TIME value (RFC 5545 §3.3.12) into `(hour, minute, second, is_utc)`.
fn parse_time(s: &str, line: usize, col: usize) -> ParseResult<(u8, u8, u8, bool)> {
    let err = || ParseError::new(ParseErrorKind::InvalidTime, line, col);

    let (time_str, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };

    if time_str.len() != 6 || !time_str.is_ascii() {
        return Err(err().with_context(format!("expected HHMMSS, got '{s}'")));
    }

    let hour = digits::<u8>(&time_str[0..2], 2).ok_or_else(err)?;
    let minute = digits::<u8>(&time_str[2..4], 2).ok_or_else(err)?;
    let second = digits::<u8>(&time_str[4..6], 2).ok_or_else(err)?;

    // 60 is a leap second
    if hour > 23 || minute > 59 || second > 60 {
        return Err(err());
    }

    Ok((hour, minute, second, is_utc))
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Format: YYYYMMDD"T"HHMMSS[Z] (e.g., "20260105T090000Z")
///
/// The TZID comes from the property parameters, not from the value.
///
/// ## Errors
/// Returns an error if the string is not a valid datetime format.
pub fn parse_datetime(
    s: &str,
    tzid: Option<&str>,
    line: usize,
    col: usize,
) -> ParseResult<DateTime> {
    let (date_str, time_str) = s.split_once('T').ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidDateTime, line, col)
            .with_context(format!("missing 'T' in '{s}'"))
    })?;

    let date = parse_date(date_str, line, col)?;
    let (hour, minute, second, is_utc) = parse_time(time_str, line, col + date_str.len() + 1)?;

    let form = if is_utc {
        DateTimeForm::Utc
    } else if let Some(tz) = tzid {
        DateTimeForm::Zoned {
            tzid: tz.to_string(),
        }
    } else {
        DateTimeForm::Floating
    };

    Ok(DateTime {
        year: date.year,
        month: date.month,
        day: date.day,
        hour,
        minute,
        second,
        form,
    })
}

/// Parses a DURATION value (RFC 5545 §3.3.6).
///
/// Format: [+|-]P[nW] or [+|-]P[nD][T[nH][nM][nS]]
///
/// ## Errors
/// Returns an error if the string is not a valid duration format.
pub fn parse_duration(s: &str, line: usize, col: usize) -> ParseResult<Duration> {
    let err = || {
        ParseError::new(ParseErrorKind::InvalidDuration, line, col)
            .with_context(format!("'{s}'"))
    };

    let mut dur = Duration::zero();
    let rest = if let Some(rest) = s.strip_prefix('-') {
        dur.negative = true;
        rest
    } else {
        s.strip_prefix('+').unwrap_or(s)
    };

    let body = rest.strip_prefix('P').ok_or_else(err)?;
    if body.is_empty() {
        return Err(err());
    }

    let mut in_time = false;
    let mut number: Option<u32> = None;
    let mut seen_component = false;

    for c in body.chars() {
        if let Some(digit) = c.to_digit(10) {
            let current = number.unwrap_or(0);
            number = Some(
                current
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(digit))
                    .ok_or_else(err)?,
            );
            continue;
        }

        if c == 'T' {
            if in_time || number.is_some() {
                return Err(err());
            }
            in_time = true;
            continue;
        }

        let value = number.take().ok_or_else(err)?;
        match (c, in_time) {
            ('W', false) => dur.weeks = value,
            ('D', false) => dur.days = value,
            ('H', true) => dur.hours = value,
            ('M', true) => dur.minutes = value,
            ('S', true) => dur.seconds = value,
            _ => return Err(err()),
        }
        seen_component = true;
    }

    if number.is_some() || !seen_component {
        return Err(err());
    }

    Ok(dur)
}

/// Parses a RECUR (RRULE) value (RFC 5545 §3.3.10).
///
/// FREQ is required. Unsupported BY* parts are ignored.
///
/// ## Errors
/// Returns an error if the string is not a valid recurrence rule.
pub fn parse_rrule(s: &str, line: usize, col: usize) -> ParseResult<RRule> {
    let mut rrule = RRule::new();

    for part in s.split(';').filter(|part| !part.trim().is_empty()) {
        let (key, value) = part.split_once('=').ok_or_else(|| {
            ParseError::new(ParseErrorKind::InvalidRRule, line, col)
                .with_context(format!("expected KEY=VALUE, got '{part}'"))
        })?;

        parse_rrule_part(&mut rrule, key.trim(), value.trim(), line, col)?;
    }

    if rrule.freq.is_none() {
        return Err(
            ParseError::new(ParseErrorKind::InvalidRRule, line, col).with_context("FREQ is required")
        );
    }

    Ok(rrule)
}

/// Parses a single RRULE key-value pair.
fn parse_rrule_part(
    rrule: &mut RRule,
    key: &str,
    value: &str,
    line: usize,
    col: usize,
) -> ParseResult<()> {
    let invalid =
        |ctx: String| ParseError::new(ParseErrorKind::InvalidRRule, line, col).with_context(ctx);

    match key.to_ascii_uppercase().as_str() {
        "FREQ" => {
            rrule.freq = Some(Frequency::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidFrequency, line, col)
                    .with_context(format!("'{value}'"))
            })?);
        }
        "INTERVAL" => {
            let interval = value.parse::<u32>().ok().filter(|&n| n > 0).ok_or_else(|| {
                invalid(format!("INTERVAL must be a positive integer, got '{value}'"))
            })?;
            rrule.interval = Some(interval);
        }
        "COUNT" => {
            if rrule.until.is_some() {
                return Err(ParseError::new(
                    ParseErrorKind::UntilCountConflict,
                    line,
                    col,
                ));
            }
            rrule.count = Some(
                value
                    .parse()
                    .ok()
                    .ok_or_else(|| invalid(format!("COUNT must be an integer, got '{value}'")))?,
            );
        }
        "UNTIL" => {
            if rrule.count.is_some() {
                return Err(ParseError::new(
                    ParseErrorKind::UntilCountConflict,
                    line,
                    col,
                ));
            }
            rrule.until = Some(if value.contains('T') {
                RRuleUntil::DateTime(parse_datetime(value, None, line, col)?)
            } else {
                RRuleUntil::Date(parse_date(value, line, col)?)
            });
        }
        "WKST" => {
            rrule.wkst = Some(Weekday::parse(value).ok_or_else(|| {
                ParseError::new(ParseErrorKind::InvalidWeekday, line, col)
                    .with_context(format!("'{value}'"))
            })?);
        }
        "BYDAY" => rrule.by_day = parse_byday(value, line, col)?,
        other => {
            tracing::trace!(part = other, "Ignoring unsupported RRULE part");
        }
    }
    Ok(())
}

/// Parses a BYDAY value (weekdays with optional ordinals).
fn parse_byday(s: &str, line: usize, col: usize) -> ParseResult<Vec<WeekdayNum>> {
    s.split(',')
        .map(|v| parse_weekday_num(v.trim(), line, col))
        .collect()
}

/// Parses a single weekday with optional ordinal (e.g., "MO", "1MO", "-1FR").
fn parse_weekday_num(s: &str, line: usize, col: usize) -> ParseResult<WeekdayNum> {
    let err = || {
        ParseError::new(ParseErrorKind::InvalidWeekday, line, col).with_context(format!("'{s}'"))
    };

    if s.len() < 2 || !s.is_ascii() {
        return Err(err());
    }

    let (ordinal_str, weekday_str) = s.split_at(s.len() - 2);
    let weekday = Weekday::parse(weekday_str).ok_or_else(err)?;

    let ordinal = if ordinal_str.is_empty() {
        None
    } else {
        let n = ordinal_str
            .trim_start_matches('+')
            .parse::<i8>()
            .ok()
            .filter(|n| *n != 0 && (-53..=53).contains(n))
            .ok_or_else(err)?;
        Some(n)
    };

    Ok(WeekdayNum { ordinal, weekday })
}

/// Unescapes text values (RFC 5545 §3.3.11).
///
/// Escape sequences: \\ \, \; \n \N
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(',') => result.push(','),
            Some(';') => result.push(';'),
            Some('\\') | None => result.push('\\'),
            Some(other) => {
                // Unknown escape, keep it verbatim
                result.push('\\');
                result.push(other);
            }
        }
    }

    result
}

/// Parses an INTEGER value (RFC 5545 §3.3.8).
///
/// ## Errors
/// Returns an error if the string is not a valid integer.
pub fn parse_integer(s: &str, line: usize, col: usize) -> ParseResult<i32> {
    s.trim_start_matches('+').parse().ok().ok_or_else(|| {
        ParseError::new(ParseErrorKind::InvalidInteger, line, col).with_context(format!("'{s}'"))
    })
}
