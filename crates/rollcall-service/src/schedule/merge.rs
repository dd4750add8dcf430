//! Folding override blocks into expanded instances.

use super::extract::{BlockKind, ScheduleBlock};
use crate::model::Occurrence;

/// Applies each override to the instance it replaces, matched on
/// `recurrence_id` and `original_date`. Overrides without a matching
/// instance become standalone occurrences.
pub(super) fn apply_overrides(occurrences: &mut Vec<Occurrence>, overrides: Vec<ScheduleBlock>) {
    for block in overrides {
        let BlockKind::Override { original_date } = block.kind else {
            continue;
        };

        let target = occurrences.iter_mut().find(|occ| {
            occ.recurrence_id.as_deref() == Some(block.uid.as_str())
                && occ.original_date == original_date
        });

        if let Some(occurrence) = target {
            tracing::debug!(uid = %block.uid, %original_date, "Applying override");
            occurrence.override_title.clone_from(&block.title);
            occurrence.start = block.start;
            occurrence.end = block.end;
            if block.location.is_some() {
                occurrence.location.clone_from(&block.location);
            }
            if block.description.is_some() {
                occurrence.description.clone_from(&block.description);
            }
            occurrence.is_override = true;
        } else {
            tracing::debug!(
                uid = %block.uid,
                %original_date,
                "Override has no base instance, keeping it standalone"
            );
            let mut occurrence = block.occurrence_at(block.start);
            occurrence.override_title = Some(block.title_or_default().to_string());
            occurrence.is_override = true;
            occurrence.recurrence_id = Some(block.uid);
            occurrence.original_date = original_date;
            occurrences.push(occurrence);
        }
    }
}
