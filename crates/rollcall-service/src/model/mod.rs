//! Occurrence model shared by the schedule importer, the store and the
//! statistics and calendar views.

pub mod iso;
mod occurrence;

pub use occurrence::{Occurrence, OccurrenceUpdate, OccurrenceView};
