//! iCalendar serializer (RFC 5545).
//!
//! Properties are written in document order from their wire form.

use super::escape::escape_param_value;
use super::fold::fold_line;
use crate::rfc::ical::core::{Component, ICalendar, Parameter, Property};

/// Serializes an iCalendar document to a string.
#[must_use]
pub fn serialize(ical: &ICalendar) -> String {
    serialize_component(&ical.root)
}

/// Serializes a component and its children.
#[must_use]
pub fn serialize_component(component: &Component) -> String {
    let mut result = fold_line(&format!("BEGIN:{}", component.name));
    for prop in &component.properties {
        result.push_str(&serialize_property(prop));
    }
    for child in &component.children {
        result.push_str(&serialize_component(child));
    }
    result.push_str(&fold_line(&format!("END:{}", component.name)));
    result
}

/// Serializes a property to one folded content line.
#[must_use]
pub fn serialize_property(prop: &Property) -> String {
    let mut line = prop.name.clone();
    for param in &prop.params {
        line.push(';');
        line.push_str(&serialize_parameter(param));
    }
    line.push(':');
    line.push_str(&prop.raw_value);
    fold_line(&line)
}

fn serialize_parameter(param: &Parameter) -> String {
    let values: Vec<String> = param.values.iter().map(|v| escape_param_value(v)).collect();
    format!("{}={}", param.name, values.join(","))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rfc::ical::core::names;

    #[test]
    fn serialize_minimal_calendar() {
        let mut ical = ICalendar::new("-//Test//EN");
        let mut todo = Component::todo();
        todo.add_property(Property::text(names::UID, "abc"));
        todo.add_property(Property::text(names::SUMMARY, "Call Bob; maybe"));
        ical.add_component(todo);

        let out = serialize(&ical);
        assert_eq!(
            out,
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test//EN\r\nBEGIN:VTODO\r\nUID:abc\r\nSUMMARY:Call Bob\\; maybe\r\nEND:VTODO\r\nEND:VCALENDAR\r\n"
        );
    }

    #[test]
    fn serialize_quotes_parameters() {
        let prop = Property::cal_address(names::ATTENDEE, "mailto:jane@example.com")
            .with_param(Parameter::cn("Doe, Jane"));
        assert_eq!(
            serialize_property(&prop),
            "ATTENDEE;CN=\"Doe, Jane\":mailto:jane@example.com\r\n"
        );
    }
}
