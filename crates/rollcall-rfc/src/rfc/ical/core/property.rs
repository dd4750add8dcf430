//! iCalendar property and content line types (RFC 5545 §3.1, §3.8).

use super::{Date, DateTime, Duration, Parameter, RRule, Value};

/// A raw content line as parsed from iCalendar text.
///
/// This is the low-level representation before value type resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Raw value string (after unfolding, before unescaping).
    pub raw_value: String,
}

impl ContentLine {
    /// Creates a new content line.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.into(),
        }
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        let name_upper = name.to_ascii_uppercase();
        self.params.iter().find(|p| p.name == name_upper)
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name)?.value()
    }

    /// Returns the VALUE parameter if present.
    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.get_param_value("VALUE")
    }

    /// Returns the TZID parameter if present.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.get_param_value("TZID")
    }

    /// Returns whether this is `BEGIN:<component>` for the given component name.
    #[must_use]
    pub fn is_begin(&self, component: &str) -> bool {
        self.name == "BEGIN" && self.raw_value.eq_ignore_ascii_case(component)
    }

    /// Returns whether this is `END:<component>` for the given component name.
    #[must_use]
    pub fn is_end(&self, component: &str) -> bool {
        self.name == "END" && self.raw_value.eq_ignore_ascii_case(component)
    }
}

/// A fully parsed iCalendar property.
///
/// Contains the typed value along with the original raw value.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    /// Property name (normalized to uppercase).
    pub name: String,
    /// Parameters in order of appearance.
    pub params: Vec<Parameter>,
    /// Parsed value.
    pub value: Value,
    /// Original raw value string.
    pub raw_value: String,
}

impl Property {
    /// Creates a property with a text value.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        let value_str = value.into();
        Self {
            name: name.into().to_ascii_uppercase(),
            params: Vec::new(),
            value: Value::Text(value_str.clone()),
            raw_value: value_str,
        }
    }

    /// Returns the parameter with the given name.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&Parameter> {
        let name_upper = name.to_ascii_uppercase();
        self.params.iter().find(|p| p.name == name_upper)
    }

    /// Returns the value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.get_param(name)?.value()
    }

    /// Returns the value as text if it is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        self.value.as_text()
    }

    /// Returns the value as a datetime if it is a datetime value.
    #[must_use]
    pub fn as_datetime(&self) -> Option<&DateTime> {
        self.value.as_datetime()
    }

    /// Returns the value as a date if it is a date value.
    #[must_use]
    pub fn as_date(&self) -> Option<&Date> {
        self.value.as_date()
    }

    /// Returns the value as a duration if it is a duration value.
    #[must_use]
    pub fn as_duration(&self) -> Option<&Duration> {
        self.value.as_duration()
    }

    /// Returns the value as a recurrence rule if it is a recur value.
    #[must_use]
    pub fn as_recur(&self) -> Option<&RRule> {
        self.value.as_recur()
    }
}
