//! iCalendar core models (RFC 5545).
//!
//! Typed representations of the components, properties and values a class
//! schedule uses. Unknown properties are kept with their raw value.

mod component;
mod datetime;
mod duration;
mod parameter;
mod property;
mod rrule;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use datetime::{DateTime, DateTimeForm};
pub use duration::Duration;
pub use parameter::Parameter;
pub use property::{ContentLine, Property};
pub use rrule::{Frequency, RRule, RRuleUntil, Weekday, WeekdayNum};
pub use value::{Date, Value};
