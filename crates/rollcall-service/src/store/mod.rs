//! The authoritative occurrence collection and its persistence.

mod backend;


pub use backend::{
    FileKeyValueStore, KeyValueStore, MemoryKeyValueStore, StorageError, StorageResult,
};

use std::collections::HashSet;

use chrono::NaiveDate;
use rollcall_core::config::Settings;
use rollcall_core::types::ImportDedup;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::model::{Occurrence, OccurrenceUpdate};

/// Where and how the store persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    pub key: String,
    pub dedup: ImportDedup,
}

impl StoreOptions {
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dedup: ImportDedup::None,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            key: settings.storage.key.clone(),
            dedup: settings.import.dedup,
        }
    }

    #[must_use]
    pub fn with_dedup(mut self, dedup: ImportDedup) -> Self {
        self.dedup = dedup;
        self
    }
}

/// Result of writing the collection back to storage.
///
/// A failed write never rolls back the in-memory change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistOutcome {
    Saved,
    Failed(String),
}

impl PersistOutcome {
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self, Self::Saved)
    }

    /// Message to surface to the user, if any.
    #[must_use]
    pub fn warning(&self) -> Option<&str> {
        match self {
            Self::Saved => None,
            Self::Failed(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub imported: usize,
    /// Incoming occurrences dropped by the dedup strategy.
    pub duplicates: usize,
    /// Collection size after the import.
    pub total: usize,
    #[serde(skip)]
    pub persist: PersistOutcome,
}

/// Holds every occurrence in import order and persists after each mutation.
pub struct AttendanceStore {
    backend: Box<dyn KeyValueStore>,
    options: StoreOptions,
    occurrences: Vec<Occurrence>,
}

impl std::fmt::Debug for AttendanceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttendanceStore")
            .field("options", &self.options)
            .field("occurrences", &self.occurrences.len())
            .finish_non_exhaustive()
    }
}

impl AttendanceStore {
    /// ## Summary
    /// Loads the collection stored under the configured key.
    ///
    /// Never fails: a missing value gives an empty store, an unreadable or
    /// corrupt one is logged and also gives an empty store.
    #[tracing::instrument(skip(backend), fields(key = %options.key))]
    #[must_use]
    pub fn load(backend: Box<dyn KeyValueStore>, options: StoreOptions) -> Self {
        let occurrences = match backend.get(&options.key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Occurrence>>(&raw) {
                Ok(occurrences) => {
                    tracing::debug!(count = occurrences.len(), "Loaded occurrences");
                    occurrences
                }
                Err(e) => {
                    tracing::error!(error = %e, "Stored occurrences are corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => {
                tracing::debug!("No stored occurrences, starting empty");
                Vec::new()
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not read stored occurrences, starting empty");
                Vec::new()
            }
        };

        Self {
            backend,
            options,
            occurrences,
        }
    }

    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// ## Summary
    /// Appends imported occurrences and persists.
    ///
    /// With [`ImportDedup::None`] nothing is deduplicated, so importing the
    /// same schedule twice shows every class twice. With
    /// [`ImportDedup::SourceUidAndDate`] incoming occurrences whose
    /// `(source_uid, original_date)` is already present are dropped.
    #[tracing::instrument(skip_all, fields(incoming = incoming.len(), dedup = ?self.options.dedup))]
    pub fn merge_import(&mut self, incoming: Vec<Occurrence>) -> ImportSummary {
        let before = self.occurrences.len();
        let mut duplicates = 0;

        match self.options.dedup {
            ImportDedup::None => self.occurrences.extend(incoming),
            ImportDedup::SourceUidAndDate => {
                let mut seen: HashSet<(String, NaiveDate)> = self
                    .occurrences
                    .iter()
                    .map(|occ| (occ.source_uid.clone(), occ.original_date))
                    .collect();
                for occurrence in incoming {
                    if seen.insert((occurrence.source_uid.clone(), occurrence.original_date)) {
                        self.occurrences.push(occurrence);
                    } else {
                        duplicates += 1;
                    }
                }
            }
        }

        let imported = self.occurrences.len() - before;
        tracing::debug!(imported, duplicates, "Merged import");
        ImportSummary {
            imported,
            duplicates,
            total: self.occurrences.len(),
            persist: self.save(),
        }
    }

    /// ## Summary
    /// Applies `update` to the occurrence with `id` and persists.
    ///
    /// Returns `None`, without touching storage, if no occurrence has `id`.
    #[tracing::instrument(skip(self))]
    pub fn update(&mut self, id: Uuid, update: &OccurrenceUpdate) -> Option<PersistOutcome> {
        let Some(occurrence) = self.occurrences.iter_mut().find(|occ| occ.id == id) else {
            tracing::debug!("No occurrence with this id");
            return None;
        };
        update.apply_to(occurrence);
        Some(self.save())
    }

    /// Removes every occurrence and persists the empty collection.
    ///
    /// Callers are expected to have confirmed the request.
    #[tracing::instrument(skip(self), fields(count = self.occurrences.len()))]
    pub fn clear_all(&mut self) -> PersistOutcome {
        self.occurrences.clear();
        self.save()
    }

    /// Occurrences matching `filter`, in stored order.
    #[must_use]
    pub fn list(&self, filter: Option<&dyn Fn(&Occurrence) -> bool>) -> Vec<&Occurrence> {
        match filter {
            Some(filter) => self.occurrences.iter().filter(|occ| filter(occ)).collect(),
            None => self.occurrences.iter().collect(),
        }
    }

    #[must_use]
    pub fn list_by_title(&self, title: &str) -> Vec<&Occurrence> {
        self.list(Some(&|occ: &Occurrence| occ.title == title))
    }

    #[must_use]
    pub fn all(&self) -> &[Occurrence] {
        &self.occurrences
    }

    #[must_use]
    pub fn get(&self, id: Uuid) -> Option<&Occurrence> {
        self.occurrences.iter().find(|occ| occ.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Distinct titles in first-seen order.
    #[must_use]
    pub fn subjects(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.occurrences
            .iter()
            .map(|occ| occ.title.as_str())
            .filter(|title| seen.insert(*title))
            .collect()
    }

    fn persist(&self) -> ServiceResult<()> {
        let payload = serde_json::to_string(&self.occurrences)?;
        self.backend.set(&self.options.key, &payload)?;
        Ok(())
    }

    fn save(&self) -> PersistOutcome {
        match self.persist() {
            Ok(()) => {
                tracing::trace!(count = self.occurrences.len(), "Persisted occurrences");
                PersistOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist occurrences, keeping them in memory");
                PersistOutcome::Failed(e.to_string())
            }
        }
    }
}
