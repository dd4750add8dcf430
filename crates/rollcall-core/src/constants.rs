/// Route component constants shared across crates
pub const API_ROUTE_COMPONENT: &str = "api";

pub const SCHEDULE_ROUTE_COMPONENT: &str = "schedule";

pub const OCCURRENCES_ROUTE_COMPONENT: &str = "occurrences";

pub const STATS_ROUTE_COMPONENT: &str = "stats";
pub const SUBJECTS_ROUTE_COMPONENT: &str = "subjects";
pub const CALENDAR_ROUTE_COMPONENT: &str = "calendar";

/// Storage key the occurrence collection is persisted under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "rollcall.occurrences";

/// One academic term, used to cap rules that carry neither COUNT nor UNTIL.
pub const DEFAULT_HORIZON_WEEKS: u32 = 18;

/// Upper bound on instances generated from a single recurrence rule.
pub const DEFAULT_MAX_INSTANCES: u16 = 500;

/// Largest schedule document accepted by the import endpoint.
pub const DEFAULT_MAX_DOCUMENT_BYTES: u32 = 16 * 1024 * 1024;

/// Minimum attendance percentage required per subject.
pub const ATTENDANCE_THRESHOLD_PERCENT: f64 = 75.0;
