//! iCalendar DATE value type and the typed property value (RFC 5545 §3.3).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use super::{DateTime, Duration, RRule};
use crate::error::{RfcError, RfcResult};

/// DATE value (RFC 5545 §3.3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Date {
    /// Year (e.g., 2026).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
}

impl Date {
    /// Creates a new date.
    #[must_use]
    pub const fn new(year: u16, month: u8, day: u8) -> Self {
        Self { year, month, day }
    }

    /// Converts to a `NaiveDate`.
    ///
    /// ## Errors
    /// Returns an error if the fields do not form a real calendar date.
    pub fn to_naive(&self) -> RfcResult<NaiveDate> {
        NaiveDate::from_ymd_opt(
            i32::from(self.year),
            u32::from(self.month),
            u32::from(self.day),
        )
        .ok_or_else(|| RfcError::InvalidValue(format!("no such date: {self}")))
    }

    /// Converts to midnight at the start of this date.
    ///
    /// ## Errors
    /// Returns an error if the fields do not form a real calendar date.
    pub fn to_naive_midnight(&self) -> RfcResult<NaiveDateTime> {
        Ok(self.to_naive()?.and_time(chrono::NaiveTime::MIN))
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}{:02}", self.year, self.month, self.day)
    }
}

/// Value types (RFC 5545 §3.3) for the properties a schedule carries.
///
/// The raw string is preserved separately on the property.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// DATE value.
    Date(Date),
    /// Comma separated DATE values (EXDATE, RDATE).
    DateList(Vec<Date>),
    /// DATE-TIME value.
    DateTime(DateTime),
    /// Comma separated DATE-TIME values (EXDATE, RDATE).
    DateTimeList(Vec<DateTime>),
    /// DURATION value.
    Duration(Duration),
    /// INTEGER value.
    Integer(i32),
    /// RECUR value (recurrence rule).
    Recur(Box<RRule>),
    /// TEXT value (unescaped).
    Text(String),
    /// URI or CAL-ADDRESS value, kept verbatim.
    Uri(String),
    /// Unknown or unparsed value.
    Unknown(String),
}

impl Value {
    /// Returns this value as text, if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns this value as a date-time, if it is a date-time value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        match self {
            Self::DateTime(dt) => Some(dt),
            _ => None,
        }
    }

    /// Returns this value as a date, if it is a date value.
    #[must_use]
    pub fn as_date(&self) -> Option<&Date> {
        match self {
            Self::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Returns this value as a duration, if it is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        match self {
            Self::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Returns this value as a recurrence rule, if it is a recur value.
    #[must_use]
    pub fn as_recur(&self) -> Option<&RRule> {
        match self {
            Self::Recur(r) => Some(r),
            _ => None,
        }
    }

    /// Interprets a DATE or DATE-TIME value as a wall-clock instant.
    ///
    /// DATE values resolve to midnight. Returns `None` for other value types.
    ///
    /// ## Errors
    /// Returns an error if the value is not a real calendar date.
    pub fn to_naive_datetime(&self) -> RfcResult<Option<NaiveDateTime>> {
        match self {
            Self::DateTime(dt) => dt.to_naive().map(Some),
            Self::Date(d) => d.to_naive_midnight().map(Some),
            _ => Ok(None),
        }
    }

    /// Flattens DATE, DATE-TIME and their list forms into wall-clock instants.
    ///
    /// ## Errors
    /// Returns an error if any entry is not a real calendar date.
    pub fn to_naive_datetimes(&self) -> RfcResult<Vec<NaiveDateTime>> {
        match self {
            Self::DateTimeList(list) => list.iter().map(DateTime::to_naive).collect(),
            Self::DateList(list) => list.iter().map(Date::to_naive_midnight).collect(),
            other => Ok(other.to_naive_datetime()?.into_iter().collect()),
        }
    }
}
