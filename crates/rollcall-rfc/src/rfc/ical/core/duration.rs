//! iCalendar DURATION value type (RFC 5545 §3.3.6).

use std::fmt;

/// Duration value (RFC 5545 §3.3.6).
///
/// Either week-based (`P2W`) or day/time-based (`P1DT2H30M`). Year and
/// month designators do not exist in iCalendar durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Duration {
    /// Whether this duration is negative.
    pub negative: bool,
    /// Number of weeks (mutually exclusive with the other fields).
    pub weeks: u32,
    /// Number of days.
    pub days: u32,
    /// Number of hours.
    pub hours: u32,
    /// Number of minutes.
    pub minutes: u32,
    /// Number of seconds.
    pub seconds: u32,
}

impl Duration {
    /// Creates a new zero duration.
    #[must_use]
    pub const fn zero() -> Self {
        Self {
            negative: false,
            weeks: 0,
            days: 0,
            hours: 0,
            minutes: 0,
            seconds: 0,
        }
    }

    /// Creates a duration from weeks.
    #[must_use]
    pub const fn weeks(weeks: u32) -> Self {
        Self {
            weeks,
            ..Self::zero()
        }
    }

    /// Creates a duration from hours.
    #[must_use]
    pub const fn hours(hours: u32) -> Self {
        Self {
            hours,
            ..Self::zero()
        }
    }

    /// Creates a duration from minutes.
    #[must_use]
    pub const fn minutes(minutes: u32) -> Self {
        Self {
            minutes,
            ..Self::zero()
        }
    }

    /// Returns the total duration as seconds.
    #[must_use]
    pub fn as_seconds(&self) -> i64 {
        let total = (i64::from(self.weeks) * 7 * 24 * 3600)
            + (i64::from(self.days) * 24 * 3600)
            + (i64::from(self.hours) * 3600)
            + (i64::from(self.minutes) * 60)
            + i64::from(self.seconds);

        if self.negative { -total } else { total }
    }

    /// Converts to a `chrono::TimeDelta`.
    #[must_use]
    pub fn to_time_delta(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(self.as_seconds())
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negative {
            write!(f, "-")?;
        }
        write!(f, "P")?;

        if self.weeks > 0 {
            return write!(f, "{}W", self.weeks);
        }
        if self.days > 0 {
            write!(f, "{}D", self.days)?;
        }
        if self.hours > 0 || self.minutes > 0 || self.seconds > 0 {
            write!(f, "T")?;
            if self.hours > 0 {
                write!(f, "{}H", self.hours)?;
            }
            if self.minutes > 0 {
                write!(f, "{}M", self.minutes)?;
            }
            if self.seconds > 0 {
                write!(f, "{}S", self.seconds)?;
            }
        } else if self.days == 0 {
            write!(f, "0D")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_display() {
        assert_eq!(Duration::weeks(2).to_string(), "P2W");
        assert_eq!(Duration::minutes(90).to_string(), "PT90M");
        let early = Duration {
            negative: true,
            ..Duration::minutes(15)
        };
        assert_eq!(early.to_string(), "-PT15M");
        assert_eq!(Duration::zero().to_string(), "P0D");

        let d = Duration {
            days: 1,
            hours: 2,
            minutes: 30,
            ..Duration::zero()
        };
        assert_eq!(d.to_string(), "P1DT2H30M");
    }

    #[test]
    fn duration_as_seconds() {
        let d = Duration {
            days: 1,
            hours: 2,
            minutes: 30,
            ..Duration::zero()
        };
        assert_eq!(d.as_seconds(), 24 * 3600 + 2 * 3600 + 30 * 60);
        let early = Duration {
            negative: true,
            ..Duration::minutes(15)
        };
        assert_eq!(early.as_seconds(), -15 * 60);
    }

    #[test]
    fn duration_to_time_delta() {
        assert_eq!(
            Duration::hours(2).to_time_delta(),
            chrono::TimeDelta::hours(2)
        );
    }
}
