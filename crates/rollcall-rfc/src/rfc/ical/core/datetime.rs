//! iCalendar DATE-TIME value type (RFC 5545 §3.3.5).

use std::fmt;

use chrono::NaiveDateTime;

use super::Date;
use crate::error::{RfcError, RfcResult};

/// Form of DATE-TIME value (RFC 5545 §3.3.5).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeForm {
    /// Floating time, e.g. `19980118T230000`.
    Floating,

    /// UTC time, indicated by 'Z' suffix, e.g. `19980119T070000Z`.
    Utc,

    /// Local time with TZID reference, e.g. `TZID=America/New_York:19980119T020000`.
    Zoned {
        /// The timezone identifier as written in the document.
        tzid: String,
    },
}

/// DATE-TIME value (RFC 5545 §3.3.5).
///
/// The form is recorded but schedules are treated as wall-clock time;
/// [`DateTime::to_naive`] ignores it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTime {
    /// Year (e.g., 2026).
    pub year: u16,
    /// Month (1-12).
    pub month: u8,
    /// Day of month (1-31).
    pub day: u8,
    /// Hour (0-23).
    pub hour: u8,
    /// Minute (0-59).
    pub minute: u8,
    /// Second (0-60, allowing for leap seconds).
    pub second: u8,
    /// The form of this DATE-TIME (floating, UTC, or zoned).
    pub form: DateTimeForm,
}

impl DateTime {
    /// Creates a floating DATE-TIME.
    #[must_use]
    pub fn floating(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            form: DateTimeForm::Floating,
        }
    }

    /// Creates a UTC DATE-TIME.
    #[must_use]
    pub fn utc(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        Self {
            form: DateTimeForm::Utc,
            ..Self::floating(year, month, day, hour, minute, second)
        }
    }

    /// Returns whether this is a UTC time.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    /// Returns whether this is a floating time.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self.form, DateTimeForm::Floating)
    }

    /// Returns the timezone ID if this is a zoned time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            DateTimeForm::Floating | DateTimeForm::Utc => None,
        }
    }

    /// Returns the calendar date part.
    #[must_use]
    pub const fn date(&self) -> Date {
        Date::new(self.year, self.month, self.day)
    }

    /// Converts to a wall-clock `NaiveDateTime`, ignoring UTC markers and TZID.
    ///
    /// A leap second (`60`) is clamped to `59`.
    ///
    /// ## Errors
    /// Returns an error if the fields do not form a real calendar date and time.
    pub fn to_naive(&self) -> RfcResult<NaiveDateTime> {
        let date = self.date().to_naive()?;
        date.and_hms_opt(
            u32::from(self.hour),
            u32::from(self.minute),
            u32::from(self.second.min(59)),
        )
        .ok_or_else(|| RfcError::InvalidValue(format!("no such time of day: {self}")))
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}T{:02}{:02}{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}
