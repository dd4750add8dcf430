//! iCalendar RRULE (Recurrence Rule) value type (RFC 5545 §3.3.10).
//!
//! Only the parts a teaching timetable uses are modelled: FREQ, INTERVAL,
//! COUNT, UNTIL, BYDAY and WKST. Other BY* parts are accepted and dropped.

use std::fmt;

use super::{Date, DateTime};

/// Recurrence frequency (RFC 5545 §3.3.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frequency {
    Secondly,
    Minutely,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Secondly => "SECONDLY",
            Self::Minutely => "MINUTELY",
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Yearly => "YEARLY",
        }
    }

    /// Parses a frequency from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SECONDLY" => Self::Secondly,
            "MINUTELY" => Self::Minutely,
            "HOURLY" => Self::Hourly,
            "DAILY" => Self::Daily,
            "WEEKLY" => Self::Weekly,
            "MONTHLY" => Self::Monthly,
            "YEARLY" => Self::Yearly,
            _ => return None,
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Day of the week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Weekday {
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl Weekday {
    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sunday => "SU",
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "SU" => Self::Sunday,
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            _ => return None,
        })
    }

    /// Converts to the chrono weekday.
    #[must_use]
    pub const fn to_chrono(self) -> chrono::Weekday {
        match self {
            Self::Sunday => chrono::Weekday::Sun,
            Self::Monday => chrono::Weekday::Mon,
            Self::Tuesday => chrono::Weekday::Tue,
            Self::Wednesday => chrono::Weekday::Wed,
            Self::Thursday => chrono::Weekday::Thu,
            Self::Friday => chrono::Weekday::Fri,
            Self::Saturday => chrono::Weekday::Sat,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Weekday with optional occurrence number, as used in BYDAY.
///
/// `MO` is every Monday, `1MO` the first Monday, `-1FR` the last Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekdayNum {
    /// Optional occurrence number (-53 to 53, excluding 0).
    pub ordinal: Option<i8>,
    /// The day of the week.
    pub weekday: Weekday,
}

impl WeekdayNum {
    /// Creates a weekday occurrence without an ordinal.
    #[must_use]
    pub const fn every(weekday: Weekday) -> Self {
        Self {
            ordinal: None,
            weekday,
        }
    }
}

impl fmt::Display for WeekdayNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.weekday)
    }
}

/// UNTIL value for RRULE, either DATE or DATE-TIME.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RRuleUntil {
    /// Date-only boundary (inclusive).
    Date(Date),
    /// Date-time boundary (inclusive).
    DateTime(DateTime),
}

impl fmt::Display for RRuleUntil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{d}"),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

/// Recurrence rule (RFC 5545 §3.3.10, §3.8.5.3).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RRule {
    /// Recurrence frequency (required).
    pub freq: Option<Frequency>,

    /// Recurrence interval (default: 1).
    pub interval: Option<u32>,

    /// End date/time of the recurrence (mutually exclusive with count).
    pub until: Option<RRuleUntil>,

    /// Number of occurrences (mutually exclusive with until).
    pub count: Option<u32>,

    /// Week start day (default: Monday).
    pub wkst: Option<Weekday>,

    /// By-day list with optional occurrence numbers.
    pub by_day: Vec<WeekdayNum>,
}

impl RRule {
    /// Creates a new empty recurrence rule.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a weekly recurrence rule.
    #[must_use]
    pub fn weekly() -> Self {
        Self {
            freq: Some(Frequency::Weekly),
            ..Self::default()
        }
    }

    /// Sets the count.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self.until = None;
        self
    }

    /// Sets the by-day list.
    #[must_use]
    pub fn with_by_day(mut self, days: Vec<WeekdayNum>) -> Self {
        self.by_day = days;
        self
    }
}

impl fmt::Display for RRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(freq) = self.freq {
            parts.push(format!("FREQ={freq}"));
        }
        if let Some(interval) = self.interval {
            parts.push(format!("INTERVAL={interval}"));
        }
        if let Some(count) = self.count {
            parts.push(format!("COUNT={count}"));
        }
        if let Some(until) = &self.until {
            parts.push(format!("UNTIL={until}"));
        }
        if !self.by_day.is_empty() {
            let days: Vec<String> = self.by_day.iter().map(ToString::to_string).collect();
            parts.push(format!("BYDAY={}", days.join(",")));
        }
        if let Some(wkst) = self.wkst {
            parts.push(format!("WKST={wkst}"));
        }
        write!(f, "{}", parts.join(";"))
    }
}
