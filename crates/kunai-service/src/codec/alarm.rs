//! `VALARM` component codec. Alarms are stored as their serialized block.

use kunai_db::db::model::{Alarm, AlarmValues};
use kunai_rfc::rfc::ical::build::serialize_component;
use kunai_rfc::rfc::ical::core::Component;
use kunai_rfc::rfc::ical::parse::{ParseResult, parse_component};

#[must_use]
pub fn to_values(valarm: &Component) -> AlarmValues {
    AlarmValues {
        valarm: serialize_component(valarm),
    }
}

/// ## Summary
/// Parses a stored alarm back into its `VALARM` component.
///
/// ## Errors
/// Returns a parse error if the stored block is not a valid component.
pub fn from_record(alarm: &Alarm) -> ParseResult<Component> {
    parse_component(&alarm.valarm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kunai_core::types::{AlarmId, TodoId};
    use kunai_rfc::rfc::ical::core::{Property, names};

    #[test]
    fn alarm_block_survives() {
        let mut valarm = Component::alarm();
        valarm.add_property(Property::text("ACTION", "DISPLAY"));
        valarm.add_property(Property::text(names::DESCRIPTION, "Due soon"));

        let values = to_values(&valarm);
        let alarm = Alarm {
            id: AlarmId(1),
            todo: TodoId(1),
            valarm: values.valarm,
        };
        let decoded = from_record(&alarm).unwrap();
        assert_eq!(decoded.name, "VALARM");
        assert_eq!(decoded.get_property("ACTION").unwrap().as_text(), "DISPLAY");
    }
}
