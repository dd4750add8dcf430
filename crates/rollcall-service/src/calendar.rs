//! Month grid projection for the calendar view.
//!
//! The grid runs Sunday to Saturday, from the week holding the 1st of the
//! month to the week holding its last day.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

use crate::model::{Occurrence, OccurrenceView};

/// Anything that falls on a single calendar day.
pub trait CalendarDate {
    fn calendar_date(&self) -> NaiveDate;
}

impl CalendarDate for NaiveDate {
    fn calendar_date(&self) -> NaiveDate {
        *self
    }
}

impl CalendarDate for NaiveDateTime {
    fn calendar_date(&self) -> NaiveDate {
        self.date()
    }
}

/// The local date in the value's own time zone.
impl<Tz: TimeZone> CalendarDate for DateTime<Tz> {
    fn calendar_date(&self) -> NaiveDate {
        self.date_naive()
    }
}

impl CalendarDate for Occurrence {
    fn calendar_date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// Year, month and day equality; time of day is ignored.
#[must_use]
pub fn same_calendar_day(a: &impl CalendarDate, b: &impl CalendarDate) -> bool {
    a.calendar_date() == b.calendar_date()
}

#[must_use]
pub fn is_today(date: &impl CalendarDate, today: &impl CalendarDate) -> bool {
    same_calendar_day(date, today)
}

#[must_use]
pub fn is_in_month(date: &impl CalendarDate, reference: &impl CalendarDate) -> bool {
    let (date, reference) = (date.calendar_date(), reference.calendar_date());
    date.year() == reference.year() && date.month() == reference.month()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub date: NaiveDate,
    pub in_month: bool,
}

fn first_of_month(reference: NaiveDate) -> NaiveDate {
    reference - Days::new(u64::from(reference.day0()))
}

/// ## Summary
/// Lays out the month containing `reference` as whole weeks.
///
/// The result always has a multiple of seven entries, starts on a Sunday and
/// ends on a Saturday. Days outside the month have `in_month == false`.
///
/// Returns `None` when the padding weeks fall outside the supported date
/// range, which only happens in the first and last months chrono represents.
#[must_use]
pub fn project_month(reference: &impl CalendarDate) -> Option<Vec<Day>> {
    let reference = reference.calendar_date();
    let first = first_of_month(reference);
    let last = first
        .iter_days()
        .take_while(|d| d.month() == first.month())
        .last()
        .unwrap_or(first);

    let grid_start =
        first.checked_sub_days(Days::new(u64::from(first.weekday().num_days_from_sunday())))?;
    let grid_end =
        last.checked_add_days(Days::new(u64::from(6 - last.weekday().num_days_from_sunday())))?;

    let days = grid_start
        .iter_days()
        .take_while(|date| *date <= grid_end)
        .map(|date| Day {
            date,
            in_month: is_in_month(&date, &reference),
        })
        .collect();
    Some(days)
}

/// The 1st of the month `delta` months away from `reference`.
///
/// Returns `None` outside the supported date range.
#[must_use]
pub fn shift_month(reference: &impl CalendarDate, delta: i32) -> Option<NaiveDate> {
    let first = first_of_month(reference.calendar_date());
    let months = Months::new(delta.unsigned_abs());
    if delta < 0 {
        first.checked_sub_months(months)
    } else {
        first.checked_add_months(months)
    }
}

/// Occurrences starting on `date`, earliest first.
#[must_use]
pub fn occurrences_on<'a, I>(date: &impl CalendarDate, occurrences: I) -> Vec<&'a Occurrence>
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    let mut on_day: Vec<&Occurrence> = occurrences
        .into_iter()
        .filter(|occ| same_calendar_day(*occ, date))
        .collect();
    on_day.sort_by_key(|occ| occ.start);
    on_day
}

/// A grid cell with everything the calendar view renders.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayView<'a> {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub occurrences: Vec<OccurrenceView<'a>>,
}

/// [`project_month`] with `is_today` and each day's occurrences attached.
///
/// `None` under the same conditions as [`project_month`].
#[must_use]
pub fn month_view<'a, I>(
    reference: &impl CalendarDate,
    today: &impl CalendarDate,
    occurrences: I,
) -> Option<Vec<DayView<'a>>>
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    let mut by_day: HashMap<NaiveDate, Vec<&'a Occurrence>> = HashMap::new();
    for occurrence in occurrences {
        by_day
            .entry(occurrence.calendar_date())
            .or_default()
            .push(occurrence);
    }

    let days = project_month(reference)?
        .into_iter()
        .map(|day| {
            let mut on_day = by_day.remove(&day.date).unwrap_or_default();
            on_day.sort_by_key(|occ| occ.start);
            DayView {
                date: day.date,
                in_month: day.in_month,
                is_today: is_today(&day.date, today),
                occurrences: on_day.into_iter().map(OccurrenceView::from).collect(),
            }
        })
        .collect();
    Some(days)
}
