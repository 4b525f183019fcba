//! `ATTENDEE` property codec.

use kunai_core::constants::MAILTO_PREFIX;
use kunai_db::db::enums::PartStat;
use kunai_db::db::model::{Attendee, AttendeeValues};
use kunai_rfc::rfc::ical::core::{Parameter, Property, names};

use super::strip_mailto;

/// ## Summary
/// Decodes an `ATTENDEE` property.
///
/// Returns `None` when the property carries no address.
#[must_use]
pub fn to_values(prop: &Property) -> Option<AttendeeValues> {
    let email = strip_mailto(prop.as_text().trim());
    if email.is_empty() {
        return None;
    }
    let status = prop.get_param_value("PARTSTAT").and_then(|value| {
        let status = PartStat::from_ical(value);
        if status.is_none() {
            tracing::debug!(partstat = %value, "Ignoring unknown PARTSTAT");
        }
        status
    });
    Some(AttendeeValues {
        email: email.to_string(),
        status,
        common_name: prop.get_param_value("CN").map(str::to_string),
        role: prop.get_param_value("ROLE").map(str::to_string),
    })
}

/// Encodes a stored attendee as an `ATTENDEE` property.
#[must_use]
pub fn from_record(attendee: &Attendee) -> Property {
    let mut prop = Property::cal_address(
        names::ATTENDEE,
        format!("{MAILTO_PREFIX}{}", attendee.email),
    );
    if let Some(common_name) = &attendee.common_name {
        prop.set_param(Parameter::cn(common_name.clone()));
    }
    if let Some(status) = attendee.status {
        prop.set_param(Parameter::partstat(status.to_ical()));
    }
    if let Some(role) = &attendee.role {
        prop.set_param(Parameter::role(role.clone()));
    }
    prop
}

#[cfg(test)]
mod tests {
    use super::*;
    use kunai_core::types::{AttendeeId, TodoId};
    use kunai_rfc::rfc::ical::parse::parse_component;

    fn attendee_prop(line: &str) -> Property {
        let block = format!("BEGIN:VTODO\r\n{line}\r\nEND:VTODO\r\n");
        parse_component(&block)
            .unwrap()
            .get_property(names::ATTENDEE)
            .unwrap()
            .clone()
    }

    #[test]
    fn decode_attendee() {
        let values = to_values(&attendee_prop(
            "ATTENDEE;CN=Bob;PARTSTAT=DECLINED;ROLE=REQ-PARTICIPANT:mailto:bob@example.com",
        ))
        .unwrap();
        assert_eq!(values.email, "bob@example.com");
        assert_eq!(values.status, Some(PartStat::Declined));
        assert_eq!(values.common_name.as_deref(), Some("Bob"));
        assert_eq!(values.role.as_deref(), Some("REQ-PARTICIPANT"));
    }

    #[test]
    fn decode_without_address() {
        assert_eq!(to_values(&attendee_prop("ATTENDEE;CN=Nobody:mailto:")), None);
    }

    #[test]
    fn encode_attendee() {
        let prop = from_record(&Attendee {
            id: AttendeeId(1),
            todo: TodoId(1),
            email: "bob@example.com".to_string(),
            status: Some(PartStat::Accepted),
            common_name: None,
            role: None,
        });
        assert_eq!(prop.raw_value, "MAILTO:bob@example.com");
        assert_eq!(prop.get_param_value("PARTSTAT"), Some("ACCEPTED"));
        assert_eq!(prop.get_param_value("CN"), None);
    }
}
