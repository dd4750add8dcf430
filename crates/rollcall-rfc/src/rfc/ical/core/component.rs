//! iCalendar component types (RFC 5545 §3.4-3.6).

use super::Property;

/// Component kind for iCalendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// VCALENDAR wrapper component.
    Calendar,
    /// VEVENT component.
    Event,
    /// VTODO component.
    Todo,
    /// VTIMEZONE component.
    Timezone,
    /// VALARM component (nested within VEVENT/VTODO).
    Alarm,
    /// Anything else, including X-components.
    Unknown,
}

impl ComponentKind {
    /// Returns the string name for this component kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Calendar => "VCALENDAR",
            Self::Event => "VEVENT",
            Self::Todo => "VTODO",
            Self::Timezone => "VTIMEZONE",
            Self::Alarm => "VALARM",
            Self::Unknown => "X-UNKNOWN",
        }
    }

    /// Parses a component kind from a string (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Self::Calendar,
            "VEVENT" => Self::Event,
            "VTODO" => Self::Todo,
            "VTIMEZONE" => Self::Timezone,
            "VALARM" => Self::Alarm,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An iCalendar component.
///
/// Components contain properties and nested sub-components, e.g. a VCALENDAR
/// contains VEVENTs, which may contain VALARMs.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Component {
    /// Component type.
    pub kind: Option<ComponentKind>,
    /// Original component name (preserved for X-components).
    pub name: String,
    /// Properties in order of appearance.
    pub properties: Vec<Property>,
    /// Nested sub-components.
    pub children: Vec<Component>,
}

impl Component {
    /// Creates a new component with the given kind.
    #[must_use]
    pub fn new(kind: ComponentKind) -> Self {
        Self {
            kind: Some(kind),
            name: kind.as_str().to_string(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a component from its BEGIN name, keeping the name verbatim.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            kind: Some(ComponentKind::parse(&name)),
            name,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates a VCALENDAR component.
    #[must_use]
    pub fn calendar() -> Self {
        Self::new(ComponentKind::Calendar)
    }

    /// Creates a VEVENT component.
    #[must_use]
    pub fn event() -> Self {
        Self::new(ComponentKind::Event)
    }

    /// Adds a property to this component.
    pub fn add_property(&mut self, prop: Property) {
        self.properties.push(prop);
    }

    /// Adds a child component.
    pub fn add_child(&mut self, child: Component) {
        self.children.push(child);
    }

    /// Returns the first property with the given name.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        let name_upper = name.to_ascii_uppercase();
        self.properties.iter().find(|p| p.name == name_upper)
    }

    /// Returns all properties with the given name.
    #[must_use]
    pub fn get_properties(&self, name: &str) -> Vec<&Property> {
        let name_upper = name.to_ascii_uppercase();
        self.properties
            .iter()
            .filter(|p| p.name == name_upper)
            .collect()
    }

    /// Returns the UID property value if present.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.get_property("UID")?.as_text()
    }

    /// Returns the SUMMARY property value if present.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.get_property("SUMMARY")?.as_text()
    }

    /// Returns the DESCRIPTION property value if present.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.get_property("DESCRIPTION")?.as_text()
    }

    /// Returns the LOCATION property value if present.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.get_property("LOCATION")?.as_text()
    }

    /// Returns children of a specific kind.
    #[must_use]
    pub fn children_of_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        self.children
            .iter()
            .filter(|c| c.kind == Some(kind))
            .collect()
    }

    /// Returns all VEVENT children.
    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Event)
    }

}

/// Top-level iCalendar object wrapping the VCALENDAR component.
#[derive(Debug, Clone, PartialEq)]
pub struct ICalendar {
    /// The root VCALENDAR component.
    pub root: Component,
}

impl ICalendar {
    /// Returns all VEVENT components.
    #[must_use]
    pub fn events(&self) -> Vec<&Component> {
        self.root.events()
    }

    /// Returns whether the calendar holds no components at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// Returns all unique UIDs in this calendar.
    #[must_use]
    pub fn uids(&self) -> Vec<&str> {
        let mut uids: Vec<&str> = self.root.children.iter().filter_map(Component::uid).collect();
        uids.sort_unstable();
        uids.dedup();
        uids
    }
}

impl Default for ICalendar {
    fn default() -> Self {
        Self {
            root: Component::calendar(),
        }
    }
}
