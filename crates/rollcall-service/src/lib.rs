pub mod calendar;
pub mod error;
pub mod model;
pub mod schedule;
pub mod stats;
pub mod store;
