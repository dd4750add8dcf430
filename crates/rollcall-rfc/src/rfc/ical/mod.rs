//! iCalendar (RFC 5545) subset used for class schedules.
//!
//! Covers VEVENT blocks with DTSTART/DTEND/DURATION, RRULE, EXDATE and
//! RECURRENCE-ID. Anything else is parsed generically and kept as text.

pub mod core;
pub mod parse;
