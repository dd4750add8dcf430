//! Schedule import: iCalendar document in, attendance occurrences out.
//!
//! 1. The document is parsed leniently; broken components are reported and
//!    dropped while their siblings survive.
//! 2. Each VEVENT becomes a [`ScheduleBlock`].
//! 3. Recurring blocks are expanded, one occurrence per instance.
//! 4. Override blocks are folded into the instance they replace.

mod expand;
mod extract;
mod merge;


pub use expand::{ExpansionOptions, expand_recurrence};
pub use extract::{BlockKind, Recurrence, ScheduleBlock, SkipReason, UNTITLED, extract_block};

use rollcall_rfc::rfc::ical::parse::{ParseError, parse};
use serde::Serialize;

use crate::model::Occurrence;

/// Result of importing a schedule document.
#[derive(Debug, Clone, Default)]
pub struct ScheduleImport {
    /// Ordered by start, ties broken by original date.
    pub occurrences: Vec<Occurrence>,
    pub skipped: Vec<SkippedBlock>,
}

/// A component that was dropped during import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub reason: String,
}

impl SkippedBlock {
    fn from_parse_error(err: &ParseError) -> Self {
        Self {
            uid: None,
            line: Some(err.line),
            reason: err.to_string(),
        }
    }

    fn from_reason(uid: Option<&str>, reason: &SkipReason) -> Self {
        Self {
            uid: uid.map(str::to_string),
            line: None,
            reason: reason.to_string(),
        }
    }
}

/// ## Summary
/// Parses a schedule document into pending occurrences.
///
/// Never fails: a document without a VCALENDAR or without usable events
/// yields an empty import, and every dropped block is listed in
/// [`ScheduleImport::skipped`].
#[tracing::instrument(skip(document), fields(document_len = document.len()))]
#[must_use]
pub fn parse_schedule(document: &str, options: &ExpansionOptions) -> ScheduleImport {
    let parsed = parse(document);
    let mut skipped: Vec<SkippedBlock> = parsed
        .skipped
        .iter()
        .map(SkippedBlock::from_parse_error)
        .collect();

    let mut occurrences = Vec::new();
    let mut overrides = Vec::new();

    for event in parsed.calendar.events() {
        let block = match extract_block(event) {
            Ok(block) => block,
            Err(reason) => {
                tracing::warn!(uid = ?event.uid(), %reason, "Skipping schedule block");
                skipped.push(SkippedBlock::from_reason(event.uid(), &reason));
                continue;
            }
        };

        match &block.kind {
            BlockKind::Single => occurrences.push(block.occurrence_at(block.start)),
            BlockKind::Recurring(recurrence) => {
                match expand_recurrence(block.start, recurrence, options) {
                    Ok(starts) => occurrences.extend(starts.into_iter().map(|start| {
                        let mut occurrence = block.occurrence_at(start);
                        occurrence.recurrence_id = Some(block.uid.clone());
                        occurrence
                    })),
                    Err(reason) => {
                        tracing::warn!(uid = %block.uid, %reason, "Skipping schedule block");
                        skipped.push(SkippedBlock::from_reason(Some(&block.uid), &reason));
                    }
                }
            }
            BlockKind::Override { .. } => overrides.push(block),
        }
    }

    merge::apply_overrides(&mut occurrences, overrides);
    occurrences.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then_with(|| a.original_date.cmp(&b.original_date))
    });

    tracing::debug!(
        occurrences = occurrences.len(),
        skipped = skipped.len(),
        "Parsed schedule"
    );
    ScheduleImport {
        occurrences,
        skipped,
    }
}
