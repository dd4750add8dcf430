//! RRULE expansion using the `rrule` crate.
//!
//! Schedules are wall-clock only, so instants are carried through the crate
//! in UTC and converted back without any offset applied.

use std::collections::HashSet;

use chrono::{NaiveDateTime, TimeDelta};
use rollcall_core::config::ImportConfig;
use rollcall_core::constants::{DEFAULT_HORIZON_WEEKS, DEFAULT_MAX_INSTANCES};
use rollcall_rfc::rfc::ical::core::{Frequency, WeekdayNum};
use rrule::{NWeekday, Tz};

use super::extract::{Recurrence, SkipReason};

/// Options for recurrence expansion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpansionOptions {
    /// Window for rules with neither COUNT nor UNTIL, counted from DTSTART.
    pub horizon_weeks: u32,
    /// Maximum number of instances generated per rule.
    pub max_instances: u16,
}

impl Default for ExpansionOptions {
    fn default() -> Self {
        Self {
            horizon_weeks: DEFAULT_HORIZON_WEEKS,
            max_instances: DEFAULT_MAX_INSTANCES,
        }
    }
}

impl ExpansionOptions {
    #[must_use]
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            horizon_weeks: config.horizon_weeks,
            max_instances: config.max_instances,
        }
    }

    #[must_use]
    pub fn with_horizon_weeks(mut self, weeks: u32) -> Self {
        self.horizon_weeks = weeks;
        self
    }

    #[must_use]
    pub fn with_max_instances(mut self, max: u16) -> Self {
        self.max_instances = max;
        self
    }

    /// Last instant an unbounded rule may start at.
    fn horizon_end(&self, start: NaiveDateTime) -> NaiveDateTime {
        let window = TimeDelta::try_weeks(i64::from(self.horizon_weeks))
            .and_then(|weeks| weeks.checked_sub(&TimeDelta::seconds(1)));
        window
            .and_then(|window| start.checked_add_signed(window))
            .unwrap_or(NaiveDateTime::MAX)
    }
}

/// ## Summary
/// Expands a recurrence into the start of every instance, EXDATEs removed.
///
/// DTSTART is always the first instance and counts toward COUNT, even when
/// BYDAY does not select its weekday.
///
/// COUNT and UNTIL bound the rule as written. Without either, instances are
/// generated up to [`ExpansionOptions::horizon_weeks`] after `start`. Never
/// more than [`ExpansionOptions::max_instances`] starts are produced.
///
/// ## Errors
/// Returns [`SkipReason::InvalidRule`] if the rule cannot be expanded.
pub fn expand_recurrence(
    start: NaiveDateTime,
    recurrence: &Recurrence,
    options: &ExpansionOptions,
) -> Result<Vec<NaiveDateTime>, SkipReason> {
    let rule = &recurrence.rule;
    let freq = rule
        .freq
        .ok_or_else(|| SkipReason::InvalidRule("missing FREQ".to_string()))?;

    let mut builder = rrule::RRule::new(to_rrule_frequency(freq));
    if let Some(interval) = rule.interval {
        let interval = u16::try_from(interval)
            .ok()
            .ok_or_else(|| SkipReason::InvalidRule(format!("INTERVAL={interval} is too large")))?;
        builder = builder.interval(interval);
    }
    builder = match (rule.count, recurrence.until) {
        (Some(count), _) => builder.count(count),
        (None, Some(until)) => builder.until(carrier(until)),
        (None, None) => {
            let until = options.horizon_end(start);
            tracing::debug!(%until, horizon_weeks = options.horizon_weeks, "Capping unbounded rule");
            builder.until(carrier(until))
        }
    };
    if !rule.by_day.is_empty() {
        builder = builder.by_weekday(rule.by_day.iter().map(to_nweekday).collect());
    }
    if let Some(wkst) = rule.wkst {
        builder = builder.week_start(wkst.to_chrono());
    }

    let rrule_set = builder
        .build(carrier(start))
        .map_err(|e| SkipReason::InvalidRule(e.to_string()))?;

    let result = rrule_set.all(options.max_instances);
    if result.limited {
        tracing::warn!(
            rrule = %rule,
            max_instances = options.max_instances,
            "Recurrence expansion hit the instance limit"
        );
    }

    let mut generated: Vec<NaiveDateTime> = result
        .dates
        .iter()
        .map(chrono::DateTime::naive_local)
        .collect();
    if generated.first() != Some(&start) {
        tracing::trace!(%start, "DTSTART not selected by rule, adding it");
        generated.insert(0, start);
        let limit = rule
            .count
            .map_or(usize::MAX, |count| usize::try_from(count).unwrap_or(usize::MAX))
            .min(usize::from(options.max_instances));
        generated.truncate(limit);
    }

    let exdate_set: HashSet<NaiveDateTime> = recurrence.exdates.iter().copied().collect();
    let starts: Vec<NaiveDateTime> = generated
        .into_iter()
        .filter(|dt| !exdate_set.contains(dt))
        .collect();

    tracing::debug!(
        rrule = %rule,
        generated = result.dates.len(),
        kept = starts.len(),
        "Expanded recurrence"
    );
    Ok(starts)
}

fn carrier(naive: NaiveDateTime) -> chrono::DateTime<Tz> {
    naive.and_utc().with_timezone(&Tz::UTC)
}

const fn to_rrule_frequency(freq: Frequency) -> rrule::Frequency {
    match freq {
        Frequency::Secondly => rrule::Frequency::Secondly,
        Frequency::Minutely => rrule::Frequency::Minutely,
        Frequency::Hourly => rrule::Frequency::Hourly,
        Frequency::Daily => rrule::Frequency::Daily,
        Frequency::Weekly => rrule::Frequency::Weekly,
        Frequency::Monthly => rrule::Frequency::Monthly,
        Frequency::Yearly => rrule::Frequency::Yearly,
    }
}

fn to_nweekday(day: &WeekdayNum) -> NWeekday {
    let weekday = day.weekday.to_chrono();
    match day.ordinal {
        Some(n) => NWeekday::Nth(i16::from(n), weekday),
        None => NWeekday::Every(weekday),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, NaiveDate, Weekday as ChronoWeekday};
    use rollcall_rfc::rfc::ical::core::{RRule, Weekday};

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, 0, 0))
            .unwrap()
    }

    fn recurrence(rule: RRule) -> Recurrence {
        Recurrence {
            rule,
            until: None,
            exdates: Vec::new(),
        }
    }

    #[test]
    fn weekly_count() {
        let start = at(2026, 1, 5, 9);
        let starts = expand_recurrence(
            start,
            &recurrence(RRule::weekly().with_count(5)),
            &ExpansionOptions::default(),
        )
        .unwrap();

        assert_eq!(starts.len(), 5);
        assert_eq!(starts[0], start);
        assert_eq!(starts[4], at(2026, 2, 2, 9));
        assert!(starts.iter().all(|s| s.weekday() == ChronoWeekday::Mon));
    }

    #[test]
    fn weekly_until_is_inclusive() {
        let start = at(2026, 1, 5, 9);
        let rec = Recurrence {
            until: Some(at(2026, 1, 26, 9)),
            ..recurrence(RRule::weekly())
        };
        let starts = expand_recurrence(start, &rec, &ExpansionOptions::default()).unwrap();
        assert_eq!(starts.len(), 4);
        assert_eq!(starts.last(), Some(&at(2026, 1, 26, 9)));
    }

    #[test]
    fn by_day_expands_each_listed_day() {
        let start = at(2026, 1, 5, 9);
        let rule = RRule::weekly().with_count(4).with_by_day(vec![
            WeekdayNum::every(Weekday::Monday),
            WeekdayNum::every(Weekday::Thursday),
        ]);
        let starts =
            expand_recurrence(start, &recurrence(rule), &ExpansionOptions::default()).unwrap();
        assert_eq!(
            starts,
            vec![
                at(2026, 1, 5, 9),
                at(2026, 1, 8, 9),
                at(2026, 1, 12, 9),
                at(2026, 1, 15, 9)
            ]
        );
    }

    #[test]
    fn start_off_by_day_is_first_instance() {
        // Monday start, classes on Tuesday and Thursday
        let start = at(2026, 1, 5, 9);
        let rule = RRule::weekly().with_count(4).with_by_day(vec![
            WeekdayNum::every(Weekday::Tuesday),
            WeekdayNum::every(Weekday::Thursday),
        ]);
        let starts =
            expand_recurrence(start, &recurrence(rule), &ExpansionOptions::default()).unwrap();
        assert_eq!(
            starts,
            vec![
                at(2026, 1, 5, 9),
                at(2026, 1, 6, 9),
                at(2026, 1, 8, 9),
                at(2026, 1, 13, 9)
            ]
        );
    }

    #[test]
    fn exdates_are_removed() {
        let start = at(2026, 1, 5, 9);
        let rec = Recurrence {
            exdates: vec![at(2026, 1, 12, 9), at(2026, 1, 19, 9)],
            ..recurrence(RRule::weekly().with_count(4))
        };
        let starts = expand_recurrence(start, &rec, &ExpansionOptions::default()).unwrap();
        assert_eq!(starts, vec![at(2026, 1, 5, 9), at(2026, 1, 26, 9)]);
    }

    #[test]
    fn unbounded_rule_stops_at_horizon() {
        let start = at(2026, 1, 5, 9);
        let starts =
            expand_recurrence(start, &recurrence(RRule::weekly()), &ExpansionOptions::default())
                .unwrap();
        assert_eq!(starts.len(), 18);

        let short = ExpansionOptions::default().with_horizon_weeks(3);
        let starts = expand_recurrence(start, &recurrence(RRule::weekly()), &short).unwrap();
        assert_eq!(starts, vec![at(2026, 1, 5, 9), at(2026, 1, 12, 9), at(2026, 1, 19, 9)]);
    }

    #[test_log::test]
    fn instance_limit_caps_output() {
        let start = at(2026, 1, 5, 9);
        let options = ExpansionOptions::default().with_max_instances(10);
        let rule = RRule {
            freq: Some(Frequency::Daily),
            count: Some(400),
            ..RRule::new()
        };
        let starts = expand_recurrence(start, &recurrence(rule), &options).unwrap();
        assert_eq!(starts.len(), 10);
    }

    #[test]
    fn interval_skips_weeks() {
        let start = at(2026, 1, 5, 9);
        let rule = RRule {
            interval: Some(2),
            ..RRule::weekly().with_count(3)
        };
        let starts =
            expand_recurrence(start, &recurrence(rule), &ExpansionOptions::default()).unwrap();
        assert_eq!(starts, vec![at(2026, 1, 5, 9), at(2026, 1, 19, 9), at(2026, 2, 2, 9)]);
    }

    #[test]
    fn missing_freq_is_rejected() {
        let err = expand_recurrence(
            at(2026, 1, 5, 9),
            &recurrence(RRule::new().with_count(3)),
            &ExpansionOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SkipReason::InvalidRule(_)));
    }

    #[test]
    fn horizon_end_saturates() {
        let options = ExpansionOptions::default().with_horizon_weeks(u32::MAX);
        assert_eq!(options.horizon_end(at(2026, 1, 5, 9)), NaiveDateTime::MAX);
    }
}
