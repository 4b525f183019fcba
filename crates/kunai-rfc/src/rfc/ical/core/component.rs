//! Components and the top-level calendar object (RFC 5545 §3.4, §3.6).

use super::property::{Property, names};
use kunai_core::constants::PRODUCT_ID;

/// Kinds of components this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Calendar,
    Todo,
    Alarm,
    Timezone,
    Standard,
    Daylight,
    /// Any other component (`VEVENT`, `VJOURNAL`, `X-` components, ...).
    Other,
}

impl ComponentKind {
    #[must_use]
    pub const fn as_str(self) -> Option<&'static str> {
        match self {
            Self::Calendar => Some("VCALENDAR"),
            Self::Todo => Some("VTODO"),
            Self::Alarm => Some("VALARM"),
            Self::Timezone => Some("VTIMEZONE"),
            Self::Standard => Some("STANDARD"),
            Self::Daylight => Some("DAYLIGHT"),
            Self::Other => None,
        }
    }

    /// Parses a component name, case-insensitively.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "VCALENDAR" => Self::Calendar,
            "VTODO" => Self::Todo,
            "VALARM" => Self::Alarm,
            "VTIMEZONE" => Self::Timezone,
            "STANDARD" => Self::Standard,
            "DAYLIGHT" => Self::Daylight,
            _ => Self::Other,
        }
    }
}

/// A component with its properties and nested components.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub kind: ComponentKind,
    /// Component name, upper-cased.
    pub name: String,
    pub properties: Vec<Property>,
    pub children: Vec<Component>,
}

impl Component {
    /// Creates an empty component with the given name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        let name = name.to_ascii_uppercase();
        Self {
            kind: ComponentKind::parse(&name),
            name,
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn todo() -> Self {
        Self::new("VTODO")
    }

    #[must_use]
    pub fn alarm() -> Self {
        Self::new("VALARM")
    }

    #[must_use]
    pub fn timezone() -> Self {
        Self::new("VTIMEZONE")
    }

    /// Returns the first property with this name.
    #[must_use]
    pub fn get_property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// Returns every property with this name, in document order.
    #[must_use]
    pub fn get_properties(&self, name: &str) -> Vec<&Property> {
        self.properties
            .iter()
            .filter(|p| p.name.eq_ignore_ascii_case(name))
            .collect()
    }

    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.get_property(name).is_some()
    }

    pub fn add_property(&mut self, property: Property) {
        self.properties.push(property);
    }

    /// ## Summary
    /// Replaces the first property with the same name, keeping its position,
    /// and drops any further duplicates. Appends when absent.
    pub fn set_property(&mut self, property: Property) {
        let name = property.name.clone();
        let mut slot = Some(property);
        let mut kept = Vec::with_capacity(self.properties.len() + 1);
        for existing in self.properties.drain(..) {
            if existing.name.eq_ignore_ascii_case(&name) {
                if let Some(replacement) = slot.take() {
                    kept.push(replacement);
                }
            } else {
                kept.push(existing);
            }
        }
        if let Some(replacement) = slot {
            kept.push(replacement);
        }
        self.properties = kept;
    }

    /// Removes every property with this name, returning how many were removed.
    pub fn remove_property(&mut self, name: &str) -> usize {
        let before = self.properties.len();
        self.properties.retain(|p| !p.name.eq_ignore_ascii_case(name));
        before - self.properties.len()
    }

    pub fn add_child(&mut self, child: Component) {
        self.children.push(child);
    }

    /// Returns the nested components of a given kind.
    #[must_use]
    pub fn children_of_kind(&self, kind: ComponentKind) -> Vec<&Component> {
        self.children.iter().filter(|c| c.kind == kind).collect()
    }

    /// Removes every nested component of a given kind.
    pub fn remove_children(&mut self, kind: ComponentKind) {
        self.children.retain(|c| c.kind != kind);
    }

    #[must_use]
    pub fn alarms(&self) -> Vec<&Component> {
        self.children_of_kind(ComponentKind::Alarm)
    }

    /// Returns the UID property value.
    #[must_use]
    pub fn uid(&self) -> Option<&str> {
        self.get_property(names::UID).map(Property::as_text)
    }

    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.get_property(names::SUMMARY).map(Property::as_text)
    }
}

/// A complete iCalendar object rooted at a `VCALENDAR` component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ICalendar {
    pub root: Component,
}

impl ICalendar {
    /// Creates an empty calendar carrying `VERSION:2.0` and the given PRODID.
    #[must_use]
    pub fn new(prodid: &str) -> Self {
        let mut root = Component::new("VCALENDAR");
        root.add_property(Property::text(names::VERSION, "2.0"));
        root.add_property(Property::text(names::PRODID, prodid));
        Self { root }
    }

    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.root.get_property(names::VERSION).map(Property::as_text)
    }

    #[must_use]
    pub fn prodid(&self) -> Option<&str> {
        self.root.get_property(names::PRODID).map(Property::as_text)
    }

    /// Returns the top-level `VTODO` components in document order.
    #[must_use]
    pub fn todos(&self) -> Vec<&Component> {
        self.root.children_of_kind(ComponentKind::Todo)
    }

    #[must_use]
    pub fn timezones(&self) -> Vec<&Component> {
        self.root.children_of_kind(ComponentKind::Timezone)
    }

    pub fn add_component(&mut self, component: Component) {
        self.root.add_child(component);
    }
}

impl Default for ICalendar {
    fn default() -> Self {
        Self::new(PRODUCT_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_kind_round_trips_names() {
        for kind in [
            ComponentKind::Calendar,
            ComponentKind::Todo,
            ComponentKind::Alarm,
            ComponentKind::Timezone,
        ] {
            let name = kind.as_str().unwrap();
            assert_eq!(ComponentKind::parse(name), kind);
        }
        assert_eq!(ComponentKind::parse("vevent"), ComponentKind::Other);
    }

    #[test]
    fn set_property_replaces_in_place() {
        let mut todo = Component::todo();
        todo.add_property(Property::text(names::UID, "abc"));
        todo.add_property(Property::text(names::SUMMARY, "old"));
        todo.add_property(Property::text("X-FOO", "bar"));
        todo.add_property(Property::text(names::SUMMARY, "dup"));

        todo.set_property(Property::text(names::SUMMARY, "new"));

        let order: Vec<_> = todo.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(order, vec!["UID", "SUMMARY", "X-FOO"]);
        assert_eq!(todo.summary(), Some("new"));
    }

    #[test]
    fn remove_property_counts() {
        let mut todo = Component::todo();
        todo.add_property(Property::cal_address(names::ATTENDEE, "mailto:a@x"));
        todo.add_property(Property::cal_address(names::ATTENDEE, "mailto:b@x"));
        assert_eq!(todo.remove_property("attendee"), 2);
        assert!(!todo.has_property(names::ATTENDEE));
    }

    #[test]
    fn new_calendar_has_version_and_prodid() {
        let ical = ICalendar::new("-//Test//EN");
        assert_eq!(ical.version(), Some("2.0"));
        assert_eq!(ical.prodid(), Some("-//Test//EN"));
        assert!(ical.todos().is_empty());
    }
}
