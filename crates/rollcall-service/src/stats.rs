//! Attendance statistics.
//!
//! Only settled occurrences (attended or absent) count toward the total.
//! Everything here is a pure function of its input.

use std::collections::BTreeMap;

use rollcall_core::constants::ATTENDANCE_THRESHOLD_PERCENT;
use rollcall_core::types::AttendanceStatus;
use serde::Serialize;

use crate::model::Occurrence;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Settled occurrences, i.e. `attended + absent`.
    pub total: u32,
    pub attended: u32,
    pub absent: u32,
    pub suspended: u32,
    pub excused: u32,
    pub pending: u32,
    /// `attended / total * 100`, or 0 when nothing is settled.
    pub percentage: f64,
    /// Consecutive attendances still needed to reach 75%.
    #[serde(rename = "neededFor75")]
    pub needed_for_75: u32,
    /// Settled attendance below the threshold.
    pub at_risk: bool,
}

impl Stats {
    fn record(&mut self, status: AttendanceStatus) {
        let counter = match status {
            AttendanceStatus::Attended => &mut self.attended,
            AttendanceStatus::Absent => &mut self.absent,
            AttendanceStatus::Suspended => &mut self.suspended,
            AttendanceStatus::Excused => &mut self.excused,
            AttendanceStatus::Pending => &mut self.pending,
        };
        *counter = counter.saturating_add(1);
        if status.counts_toward_total() {
            self.total = self.total.saturating_add(1);
        }
    }

    fn finish(mut self) -> Self {
        self.percentage = if self.total == 0 {
            0.0
        } else {
            f64::from(self.attended) / f64::from(self.total) * 100.0
        };
        self.needed_for_75 = needed_for_75(self.attended, self.total);
        self.at_risk = self.is_at_risk();
        self
    }

    /// Whether settled attendance is below the required threshold.
    #[must_use]
    pub fn is_at_risk(&self) -> bool {
        self.total > 0 && self.percentage < ATTENDANCE_THRESHOLD_PERCENT
    }
}

/// Smallest `x` with `(attended + x) / (total + x) >= 3/4`.
///
/// Solving gives `x >= 3 * total - 4 * attended`.
#[must_use]
pub fn needed_for_75(attended: u32, total: u32) -> u32 {
    let required = u64::from(total) * 3;
    let have = u64::from(attended) * 4;
    u32::try_from(required.saturating_sub(have)).unwrap_or(u32::MAX)
}

/// ## Summary
/// Tallies attendance over `occurrences`.
#[must_use]
pub fn compute_stats<'a, I>(occurrences: I) -> Stats
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    let mut stats = Stats::default();
    for occurrence in occurrences {
        stats.record(occurrence.status);
    }
    stats.finish()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub title: String,
    #[serde(flatten)]
    pub stats: Stats,
}

/// One [`Stats`] per distinct title, sorted by title.
#[must_use]
pub fn stats_by_subject<'a, I>(occurrences: I) -> Vec<SubjectStats>
where
    I: IntoIterator<Item = &'a Occurrence>,
{
    let mut by_title: BTreeMap<&str, Stats> = BTreeMap::new();
    for occurrence in occurrences {
        by_title
            .entry(occurrence.title.as_str())
            .or_default()
            .record(occurrence.status);
    }
    by_title
        .into_iter()
        .map(|(title, stats)| SubjectStats {
            title: title.to_string(),
            stats: stats.finish(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    use rollcall_core::types::AttendanceStatus::{
        Absent as X, Attended as A, Excused as E, Pending as P, Suspended as S,
    };

    fn occurrences(title: &str, statuses: &[AttendanceStatus]) -> Vec<Occurrence> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 5)
            .and_then(|d| d.and_hms_opt(9, 0, 0))
            .unwrap();
        statuses
            .iter()
            .map(|status| {
                let mut occ = Occurrence::new(title, title, start, start);
                occ.status = *status;
                occ
            })
            .collect()
    }

    fn stats_of(statuses: &[AttendanceStatus]) -> Stats {
        compute_stats(&occurrences("Calculus", statuses))
    }

    /// Every status sequence of length `len`.
    fn all_sequences(len: u32) -> Vec<Vec<AttendanceStatus>> {
        (0..AttendanceStatus::ALL.len().pow(len))
            .map(|mut n| {
                (0..len)
                    .map(|_| {
                        let status = AttendanceStatus::ALL[n % AttendanceStatus::ALL.len()];
                        n /= AttendanceStatus::ALL.len();
                        status
                    })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn three_of_four_is_exactly_threshold() {
        let stats = stats_of(&[A, A, A, X]);
        assert_eq!(stats.total, 4);
        assert!((stats.percentage - 75.0).abs() < f64::EPSILON);
        assert_eq!(stats.needed_for_75, 0);
        assert!(!stats.is_at_risk());
    }

    #[test]
    fn one_of_three_needs_five() {
        let stats = stats_of(&[A, X, X]);
        assert_eq!(stats.total, 3);
        assert!((stats.percentage - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.needed_for_75, 5);
        assert!(stats.is_at_risk());
    }

    #[test]
    fn unsettled_only_is_all_zero() {
        let stats = stats_of(&[S, E]);
        assert_eq!(stats.total, 0);
        assert!(stats.percentage.abs() < f64::EPSILON);
        assert_eq!(stats.needed_for_75, 0);
        assert_eq!(stats.suspended, 1);
        assert_eq!(stats.excused, 1);
        assert!(!stats.is_at_risk());
    }

    #[test]
    fn pending_counts_separately() {
        let stats = stats_of(&[P, P, A]);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.total, 1);
        assert!((stats.percentage - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_input() {
        assert_eq!(compute_stats(std::iter::empty()), Stats::default());
    }

    #[test]
    fn totals_are_consistent() {
        for seq in all_sequences(4) {
            let stats = stats_of(&seq);
            let len = u32::try_from(seq.len()).unwrap();
            assert_eq!(stats.attended + stats.absent, stats.total);
            let settled = seq.iter().filter(|s| s.counts_toward_total()).count();
            assert_eq!(usize::try_from(stats.total).unwrap(), settled);
            assert_eq!(stats.at_risk, stats.is_at_risk());
            assert!(stats.total <= len);
            assert_eq!(
                stats.total + stats.suspended + stats.excused + stats.pending,
                len
            );
            if stats.total == 0 {
                assert!(stats.percentage.abs() < f64::EPSILON);
                assert_eq!(stats.needed_for_75, 0);
            }
        }
    }

    #[test]
    fn attending_never_lowers_percentage() {
        for seq in all_sequences(4) {
            let before = stats_of(&seq);

            let mut more = seq.clone();
            more.push(A);
            let after = stats_of(&more);
            if before.total > 0 {
                assert!(after.percentage >= before.percentage, "{seq:?}");
            }

            let mut less = seq.clone();
            less.push(X);
            assert!(stats_of(&less).percentage <= before.percentage, "{seq:?}");
        }
    }

    #[test]
    fn needed_is_minimal_and_sufficient() {
        for total in 0..40 {
            for attended in 0..=total {
                let x = needed_for_75(attended, total);
                let reaches = |extra: u32| 4 * (attended + extra) >= 3 * (total + extra);
                assert!(reaches(x), "attended={attended} total={total}");
                if x > 0 {
                    assert!(!reaches(x - 1), "attended={attended} total={total}");
                }
            }
        }
    }

    #[test]
    fn repeated_invocation_is_identical() {
        let occs = occurrences("Physics", &[A, X, S, A, P]);
        let first = compute_stats(&occs);
        let second = compute_stats(&occs);
        let reversed = compute_stats(occs.iter().rev());
        assert_eq!(first, second);
        assert_eq!(first, reversed);
    }

    #[test]
    fn per_subject_sorted_by_title() {
        let mut occs = occurrences("Physics", &[A, X]);
        occs.extend(occurrences("Calculus", &[A, A, A, X]));
        occs.extend(occurrences("Art", &[E]));

        let subjects = stats_by_subject(&occs);
        let titles: Vec<_> = subjects.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Art", "Calculus", "Physics"]);
        assert_eq!(subjects[1].stats, stats_of(&[A, A, A, X]));
        assert_eq!(subjects[2].stats.needed_for_75, 2);
        assert_eq!(subjects[0].stats.total, 0);
    }

    #[test]
    fn serializes_needed_for_75_name() {
        let json = serde_json::to_value(stats_of(&[A, X, X])).unwrap();
        assert_eq!(json["neededFor75"], 5);
        assert_eq!(json["attended"], 1);
        assert_eq!(json["atRisk"], true);

        let json = serde_json::to_value(stats_of(&[S, E])).unwrap();
        assert_eq!(json["atRisk"], false);
    }
}
