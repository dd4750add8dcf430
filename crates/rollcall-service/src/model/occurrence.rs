use chrono::{NaiveDate, NaiveDateTime};
use rollcall_core::types::AttendanceStatus;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::iso;

/// A single dated class instance.
///
/// Persisted as a camelCase JSON record. Only `status` and the override fields
/// change after creation; see [`OccurrenceUpdate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Occurrence {
    pub id: Uuid,
    /// UID of the schedule block this occurrence came from.
    pub source_uid: String,
    pub title: String,
    #[serde(deserialize_with = "iso::deserialize_datetime")]
    pub start: NaiveDateTime,
    #[serde(deserialize_with = "iso::deserialize_datetime")]
    pub end: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_title: Option<String>,
    #[serde(default)]
    pub is_override: bool,
    /// UID of the recurring base rule; `None` for one-off events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_id: Option<String>,
    /// Date the occurrence would have fallen on without an override.
    #[serde(deserialize_with = "iso::deserialize_date")]
    pub original_date: NaiveDate,
}

impl Occurrence {
    /// Creates a pending, non-overridden occurrence with a fresh id.
    #[must_use]
    pub fn new(
        source_uid: impl Into<String>,
        title: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_uid: source_uid.into(),
            title: title.into(),
            start,
            end,
            location: None,
            description: None,
            status: AttendanceStatus::Pending,
            override_title: None,
            is_override: false,
            recurrence_id: None,
            original_date: start.date(),
        }
    }

    /// Title to show: the override title when this occurrence is overridden.
    #[must_use]
    pub fn display_title(&self) -> &str {
        match (&self.override_title, self.is_override) {
            (Some(title), true) => title,
            _ => &self.title,
        }
    }

    /// Calendar date of the start, time of day ignored.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.start.date()
    }
}

/// An [`Occurrence`] as the API renders it, with display fields resolved.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceView<'a> {
    #[serde(flatten)]
    pub occurrence: &'a Occurrence,
    pub display_title: &'a str,
    pub status_label: &'static str,
    pub status_class: &'static str,
}

impl<'a> From<&'a Occurrence> for OccurrenceView<'a> {
    fn from(occurrence: &'a Occurrence) -> Self {
        Self {
            occurrence,
            display_title: occurrence.display_title(),
            status_label: occurrence.status.label(),
            status_class: occurrence.status.css_class(),
        }
    }
}

/// The mutable subset of an [`Occurrence`].
///
/// Absent fields are left untouched. An empty `overrideTitle` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OccurrenceUpdate {
    #[serde(default)]
    pub status: Option<AttendanceStatus>,
    #[serde(default)]
    pub override_title: Option<String>,
    #[serde(default)]
    pub is_override: Option<bool>,
}

impl OccurrenceUpdate {
    #[must_use]
    pub fn status(status: AttendanceStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.override_title.is_none() && self.is_override.is_none()
    }

    /// Applies the present fields to `occurrence`.
    pub fn apply_to(&self, occurrence: &mut Occurrence) {
        if let Some(status) = self.status {
            occurrence.status = status;
        }
        if let Some(title) = &self.override_title {
            let title = title.trim();
            occurrence.override_title = (!title.is_empty()).then(|| title.to_string());
        }
        if let Some(flag) = self.is_override {
            occurrence.is_override = flag;
        }
    }
}
