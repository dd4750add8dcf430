use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Attendance status of a single class occurrence.
///
/// Every consumer (statistics, styling, display) matches on this enum
/// exhaustively, so adding a variant is a compile error until each of them
/// decides what to do with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttendanceStatus {
    #[default]
    Pending,
    Attended,
    Absent,
    Suspended,
    Excused,
}

impl AttendanceStatus {
    pub const ALL: [Self; 5] = [
        Self::Pending,
        Self::Attended,
        Self::Absent,
        Self::Suspended,
        Self::Excused,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Attended => "ATTENDED",
            Self::Absent => "ABSENT",
            Self::Suspended => "SUSPENDED",
            Self::Excused => "EXCUSED",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Attended => "Attended",
            Self::Absent => "Absent",
            Self::Suspended => "Class suspended",
            Self::Excused => "Excused",
        }
    }

    /// Styling token handed to the presentation layer.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::Pending => "status-pending",
            Self::Attended => "status-attended",
            Self::Absent => "status-absent",
            Self::Suspended => "status-suspended",
            Self::Excused => "status-excused",
        }
    }

    /// Whether the status is settled, i.e. part of the attendance denominator.
    #[must_use]
    pub const fn counts_toward_total(self) -> bool {
        match self {
            Self::Attended | Self::Absent => true,
            Self::Pending | Self::Suspended | Self::Excused => false,
        }
    }
}

impl std::fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttendanceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownStatus(s.to_string()))
    }
}

/// How an import treats occurrences that already exist in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportDedup {
    /// Append everything; importing the same schedule twice duplicates it.
    #[default]
    None,
    /// Skip incoming occurrences whose source UID and original date are already stored.
    SourceUidAndDate,
}
