//! Lenient ISO-8601 reading for persisted wall-clock timestamps.
//!
//! Values are written in chrono's default form (`2026-01-05T09:00:00`).
//! Older or hand-edited payloads may carry a `Z`, a numeric offset or a bare
//! date; those are accepted too. The wall-clock part is kept as written and no
//! time zone conversion takes place.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, de::Error as _};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parses a date-time in any of the accepted shapes.
#[must_use]
pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.naive_local())
        })
        .or_else(|| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parses a calendar date, taking the date part of a full timestamp if needed.
#[must_use]
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .ok()
        .or_else(|| parse_datetime(raw).map(|dt| dt.date()))
}

/// `deserialize_with` adapter for [`parse_datetime`].
///
/// ## Errors
/// Fails when the value is not a string or matches none of the accepted shapes.
pub fn deserialize_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_datetime(&raw).ok_or_else(|| D::Error::custom(format!("invalid date-time: {raw}")))
}

/// `deserialize_with` adapter for [`parse_date`].
///
/// ## Errors
/// Fails when the value is not a string or matches none of the accepted shapes.
pub fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| D::Error::custom(format!("invalid date: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .unwrap()
    }

    #[test]
    fn plain_iso() {
        assert_eq!(parse_datetime("2026-01-05T09:00:00"), Some(at(2026, 1, 5, 9, 0)));
        assert_eq!(
            parse_datetime("2026-01-05T09:00:00.250"),
            NaiveDate::from_ymd_opt(2026, 1, 5).and_then(|d| d.and_hms_milli_opt(9, 0, 0, 250))
        );
    }

    #[test]
    fn space_separated() {
        assert_eq!(parse_datetime("2026-01-05 09:30:00"), Some(at(2026, 1, 5, 9, 30)));
    }

    #[test]
    fn utc_marker_keeps_wall_clock() {
        assert_eq!(parse_datetime("2026-01-05T09:00:00Z"), Some(at(2026, 1, 5, 9, 0)));
    }

    #[test]
    fn offset_keeps_wall_clock() {
        assert_eq!(
            parse_datetime("2026-01-05T09:00:00-03:00"),
            Some(at(2026, 1, 5, 9, 0))
        );
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(parse_datetime("2026-01-05"), Some(at(2026, 1, 5, 0, 0)));
    }

    #[test]
    fn date_from_timestamp() {
        assert_eq!(
            parse_date("2026-01-05T23:59:00Z"),
            NaiveDate::from_ymd_opt(2026, 1, 5)
        );
    }

    #[test]
    fn garbage_rejected() {
        assert_eq!(parse_datetime("next tuesday"), None);
        assert_eq!(parse_date("2026-13-01"), None);
    }
}
