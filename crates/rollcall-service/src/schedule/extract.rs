//! Turns parsed VEVENT components into schedule blocks.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rollcall_rfc::error::RfcResult;
use rollcall_rfc::rfc::ical::core::{Component, DateTime, Property, RRule, RRuleUntil};
use thiserror::Error;
use uuid::Uuid;

use crate::model::Occurrence;

/// Title used for blocks without a SUMMARY.
pub const UNTITLED: &str = "Untitled";

const LAST_SECOND: NaiveTime = match NaiveTime::from_hms_opt(23, 59, 59) {
    Some(time) => time,
    None => NaiveTime::MIN,
};

/// Why a VEVENT did not produce any occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("missing DTSTART")]
    MissingStart,

    #[error("missing both DTEND and DURATION")]
    MissingEnd,

    #[error("end {end} is before start {start}")]
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("RRULE has COUNT=0")]
    ZeroCount,

    #[error("RRULE UNTIL {until} is before DTSTART {start}")]
    UntilBeforeStart {
        start: NaiveDateTime,
        until: NaiveDateTime,
    },

    #[error("unusable RRULE: {0}")]
    InvalidRule(String),

    #[error("invalid {property} value: {message}")]
    InvalidValue {
        property: &'static str,
        message: String,
    },

    #[error("malformed block: {0}")]
    Malformed(String),
}

/// What a block contributes to the expanded schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// A one-off event.
    Single,
    /// A base event carrying an RRULE.
    Recurring(Recurrence),
    /// Replaces the instance of the base event `uid` that falls on `original_date`.
    Override { original_date: NaiveDate },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recurrence {
    pub rule: RRule,
    /// UNTIL as a wall-clock instant; DATE values cover the whole day.
    pub until: Option<NaiveDateTime>,
    pub exdates: Vec<NaiveDateTime>,
}

/// A VEVENT reduced to the fields the attendance schedule needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleBlock {
    pub uid: String,
    pub title: Option<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub location: Option<String>,
    pub description: Option<String>,
    pub kind: BlockKind,
}

impl ScheduleBlock {
    #[must_use]
    pub fn duration(&self) -> chrono::TimeDelta {
        self.end - self.start
    }

    #[must_use]
    pub fn title_or_default(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }

    /// Builds the occurrence starting at `start`, keeping this block's length.
    #[must_use]
    pub fn occurrence_at(&self, start: NaiveDateTime) -> Occurrence {
        let mut occurrence = Occurrence::new(
            self.uid.clone(),
            self.title_or_default(),
            start,
            start + self.duration(),
        );
        occurrence.location.clone_from(&self.location);
        occurrence.description.clone_from(&self.description);
        occurrence
    }
}

/// ## Summary
/// Extracts a [`ScheduleBlock`] from a VEVENT.
///
/// A RECURRENCE-ID makes the block an override even when it also carries an
/// RRULE. A block without a UID gets a fresh one, so it can never be matched
/// by an override.
///
/// ## Errors
/// Returns the [`SkipReason`] when the block cannot produce occurrences.
pub fn extract_block(component: &Component) -> Result<ScheduleBlock, SkipReason> {
    let uid = component
        .uid()
        .map_or_else(|| Uuid::new_v4().to_string(), str::to_string);

    let start = extract_datetime(component, "DTSTART")?.ok_or(SkipReason::MissingStart)?;
    let end = extract_end(component, start)?;
    if end < start {
        return Err(SkipReason::EndBeforeStart { start, end });
    }

    let kind = if let Some(original) = extract_datetime(component, "RECURRENCE-ID")? {
        tracing::trace!(%uid, original = %original, "Found RECURRENCE-ID");
        BlockKind::Override {
            original_date: original.date(),
        }
    } else if let Some(rule) = extract_rrule(component)? {
        BlockKind::Recurring(extract_recurrence(component, rule, start)?)
    } else {
        BlockKind::Single
    };

    Ok(ScheduleBlock {
        uid,
        title: component.summary().map(str::to_string),
        start,
        end,
        location: component.location().map(str::to_string),
        description: component.description().map(str::to_string),
        kind,
    })
}

/// Reads a DATE or DATE-TIME property as a wall-clock instant.
///
/// Returns `Ok(None)` if the property is not present.
fn extract_datetime(
    component: &Component,
    property: &'static str,
) -> Result<Option<NaiveDateTime>, SkipReason> {
    let Some(prop) = component.get_property(property) else {
        return Ok(None);
    };
    let value = prop
        .value
        .to_naive_datetime()
        .map_err(|e| SkipReason::InvalidValue {
            property,
            message: e.to_string(),
        })?;
    if value.is_none() {
        tracing::trace!(property, raw = %prop.raw_value, "Property is not a date or date-time");
    }
    if let Some(tzid) = prop.as_datetime().and_then(DateTime::tzid) {
        tracing::trace!(property, tzid, "Reading zoned time as wall clock");
    }
    Ok(value)
}

/// End from DTEND, else DTSTART + DURATION.
fn extract_end(component: &Component, start: NaiveDateTime) -> Result<NaiveDateTime, SkipReason> {
    if let Some(end) = extract_datetime(component, "DTEND")? {
        return Ok(end);
    }
    let Some(prop) = component.get_property("DURATION") else {
        return Err(SkipReason::MissingEnd);
    };
    let duration = prop.as_duration().ok_or_else(|| SkipReason::InvalidValue {
        property: "DURATION",
        message: format!("'{}' is not a duration", prop.raw_value),
    })?;
    tracing::trace!(duration = %duration, "Deriving end from DURATION");
    start
        .checked_add_signed(duration.to_time_delta())
        .ok_or_else(|| SkipReason::InvalidValue {
            property: "DURATION",
            message: format!("'{duration}' overflows the calendar"),
        })
}

/// A DATE bound includes the whole day.
///
/// So does a UTC bound on a floating or zoned DTSTART: occurrences are wall
/// clock times and the offset between the two is unknown.
fn until_instant(until: &RRuleUntil, start_is_utc: bool) -> RfcResult<NaiveDateTime> {
    match until {
        RRuleUntil::DateTime(dt) if dt.is_utc() && !start_is_utc => {
            Ok(dt.date().to_naive()?.and_time(LAST_SECOND))
        }
        RRuleUntil::DateTime(dt) => dt.to_naive(),
        RRuleUntil::Date(d) => Ok(d.to_naive()?.and_time(LAST_SECOND)),
    }
}

/// Returns `Ok(None)` if the RRULE property is not found.
fn extract_rrule(component: &Component) -> Result<Option<RRule>, SkipReason> {
    let Some(prop) = component.get_property("RRULE") else {
        tracing::trace!("RRULE property not found");
        return Ok(None);
    };
    let rule = prop
        .as_recur()
        .ok_or_else(|| SkipReason::InvalidRule(prop.raw_value.clone()))?;
    tracing::trace!(rrule = %rule, "Found RRULE");
    Ok(Some(rule.clone()))
}

fn extract_recurrence(
    component: &Component,
    rule: RRule,
    start: NaiveDateTime,
) -> Result<Recurrence, SkipReason> {
    if rule.count == Some(0) {
        return Err(SkipReason::ZeroCount);
    }

    let start_is_utc = component
        .get_property("DTSTART")
        .and_then(Property::as_datetime)
        .is_some_and(DateTime::is_utc);
    let until = rule
        .until
        .as_ref()
        .map(|until| until_instant(until, start_is_utc))
        .transpose()
        .map_err(|e| SkipReason::InvalidValue {
            property: "RRULE",
            message: e.to_string(),
        })?;
    if let Some(until) = until.filter(|until| *until < start) {
        return Err(SkipReason::UntilBeforeStart { start, until });
    }

    let mut exdates = Vec::new();
    for prop in component.get_properties("EXDATE") {
        let dates = prop
            .value
            .to_naive_datetimes()
            .map_err(|e| SkipReason::InvalidValue {
                property: "EXDATE",
                message: e.to_string(),
            })?;
        exdates.extend(dates);
    }
    if !exdates.is_empty() {
        tracing::trace!(count = exdates.len(), "Collected EXDATE values");
    }

    Ok(Recurrence {
        rule,
        until,
        exdates,
    })
}
