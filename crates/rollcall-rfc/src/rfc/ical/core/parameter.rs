//! iCalendar parameter types (RFC 5545 §3.2).

use std::fmt;

/// A single iCalendar property parameter.
///
/// For example in `DTSTART;TZID=Europe/Berlin:20260105T090000` the `TZID`
/// is a parameter with name `TZID` and value `Europe/Berlin`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    /// Parameter name (normalized to uppercase).
    pub name: String,
    /// Parameter values. Most parameters have one value.
    pub values: Vec<String>,
}

impl Parameter {
    /// Creates a new parameter with a single value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values: vec![value.into()],
        }
    }

    /// Creates a new parameter with multiple values.
    #[must_use]
    pub fn with_values(name: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            values,
        }
    }

    /// Returns the first (and usually only) value.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.values.first().map(String::as_str)
    }

}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.values.is_empty() {
            write!(f, "=")?;
            for (i, value) in self.values.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                if needs_quoting(value) {
                    write!(f, "\"{value}\"")?;
                } else {
                    write!(f, "{value}")?;
                }
            }
        }
        Ok(())
    }
}

fn needs_quoting(s: &str) -> bool {
    s.chars().any(|c| matches!(c, ':' | ';' | ','))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parameter_display_simple() {
        let param = Parameter::new("TZID", "Europe/Berlin");
        assert_eq!(param.to_string(), "TZID=Europe/Berlin");
    }

    #[test]
    fn parameter_display_quoted() {
        let param = Parameter::new("CN", "Doe; Jane");
        assert_eq!(param.to_string(), "CN=\"Doe; Jane\"");
    }

    #[test]
    fn parameter_name_normalized() {
        let param = Parameter::new("value", "date");
        assert_eq!(param.name, "VALUE");
        assert_eq!(param.value(), Some("date"));
    }
}
