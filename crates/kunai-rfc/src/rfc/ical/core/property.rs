//! Properties and raw content lines (RFC 5545 §3.1, §3.8).

use chrono::NaiveDate;

use super::datetime::{DATE_FORMAT, DateOrDateTime, DateTime, DateTimeForm};
use super::parameter::Parameter;
use super::value::Value;
use crate::rfc::ical::build::escape::escape_text;

/// Property names used by to-do synchronization.
pub mod names {
    pub const ATTENDEE: &str = "ATTENDEE";
    pub const CATEGORIES: &str = "CATEGORIES";
    pub const CLASS: &str = "CLASS";
    pub const COMPLETED: &str = "COMPLETED";
    pub const CREATED: &str = "CREATED";
    pub const DESCRIPTION: &str = "DESCRIPTION";
    pub const DTSTAMP: &str = "DTSTAMP";
    pub const DTSTART: &str = "DTSTART";
    pub const DUE: &str = "DUE";
    pub const EXDATE: &str = "EXDATE";
    pub const EXRULE: &str = "EXRULE";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
    pub const LOCATION: &str = "LOCATION";
    pub const ORGANIZER: &str = "ORGANIZER";
    pub const PERCENT_COMPLETE: &str = "PERCENT-COMPLETE";
    pub const PRODID: &str = "PRODID";
    pub const RDATE: &str = "RDATE";
    pub const RECURRENCE_ID: &str = "RECURRENCE-ID";
    pub const RRULE: &str = "RRULE";
    pub const SEQUENCE: &str = "SEQUENCE";
    pub const STATUS: &str = "STATUS";
    pub const SUMMARY: &str = "SUMMARY";
    pub const TZID: &str = "TZID";
    pub const TZOFFSETFROM: &str = "TZOFFSETFROM";
    pub const TZOFFSETTO: &str = "TZOFFSETTO";
    pub const UID: &str = "UID";
    pub const VERSION: &str = "VERSION";
}

/// A lexed content line before value typing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentLine {
    /// Property name, upper-cased.
    pub name: String,
    pub params: Vec<Parameter>,
    /// Value exactly as it appeared after unfolding.
    pub raw_value: String,
}

impl ContentLine {
    /// Returns the first value of a parameter.
    #[must_use]
    pub fn param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(Parameter::value)
    }

    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        self.param_value("TZID")
    }

    #[must_use]
    pub fn value_type(&self) -> Option<&str> {
        self.param_value("VALUE")
    }
}

/// A typed property.
///
/// `raw_value` always holds the wire form; `value` is the typed view of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Property name, upper-cased.
    pub name: String,
    pub params: Vec<Parameter>,
    pub value: Value,
    pub raw_value: String,
}

impl Property {
    /// Creates a TEXT property.
    #[must_use]
    pub fn text(name: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        Self {
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: escape_text(&value),
            value: Value::Text(value),
        }
    }

    /// Creates a TEXT list property such as `CATEGORIES`.
    #[must_use]
    pub fn text_list(name: &str, values: Vec<String>) -> Self {
        let raw_value = values
            .iter()
            .map(|v| escape_text(v))
            .collect::<Vec<_>>()
            .join(",");
        Self {
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            raw_value,
            value: Value::TextList(values),
        }
    }

    /// Creates an INTEGER property.
    #[must_use]
    pub fn integer(name: &str, value: i32) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: value.to_string(),
            value: Value::Integer(value),
        }
    }

    /// Creates a DATE property, marked with `VALUE=DATE`.
    #[must_use]
    pub fn date(name: &str, value: NaiveDate) -> Self {
        Self {
            name: name.to_ascii_uppercase(),
            params: vec![Parameter::value_type("DATE")],
            raw_value: value.format(DATE_FORMAT).to_string(),
            value: Value::Date(value),
        }
    }

    /// Creates a DATE-TIME property, adding `TZID` for zoned values.
    #[must_use]
    pub fn datetime(name: &str, value: DateTime) -> Self {
        let params = match &value.form {
            DateTimeForm::Zoned { tzid } => vec![Parameter::tzid(tzid.clone())],
            DateTimeForm::Floating | DateTimeForm::Utc => Vec::new(),
        };
        Self {
            name: name.to_ascii_uppercase(),
            params,
            raw_value: value.to_string(),
            value: Value::DateTime(value),
        }
    }

    /// Creates an `RDATE`/`EXDATE` style list property.
    ///
    /// The `VALUE` and `TZID` parameters are taken from the first entry, so
    /// callers should only group entries of the same shape.
    #[must_use]
    pub fn date_list(name: &str, values: Vec<DateOrDateTime>) -> Self {
        let mut params = Vec::new();
        if let Some(first) = values.first() {
            if first.is_date() {
                params.push(Parameter::value_type("DATE"));
            } else if let Some(tzid) = first.tzid() {
                params.push(Parameter::tzid(tzid));
            }
        }
        let raw_value = values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            name: name.to_ascii_uppercase(),
            params,
            raw_value,
            value: Value::DateList(values),
        }
    }

    /// Creates a CAL-ADDRESS property.
    #[must_use]
    pub fn cal_address(name: &str, address: impl Into<String>) -> Self {
        let address = address.into();
        Self {
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: address.clone(),
            value: Value::CalAddress(address),
        }
    }

    /// Creates a RECUR property from rule text.
    #[must_use]
    pub fn recur(name: &str, rule: impl Into<String>) -> Self {
        let rule = rule.into();
        Self {
            name: name.to_ascii_uppercase(),
            params: Vec::new(),
            raw_value: rule.clone(),
            value: Value::Recur(rule),
        }
    }

    /// Returns the first value of a parameter.
    #[must_use]
    pub fn get_param_value(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
            .and_then(Parameter::value)
    }

    /// Sets a parameter, replacing any existing parameter with that name.
    pub fn set_param(&mut self, param: Parameter) {
        self.params.retain(|p| !p.name.eq_ignore_ascii_case(&param.name));
        self.params.push(param);
    }

    /// Builder form of [`Property::set_param`].
    #[must_use]
    pub fn with_param(mut self, param: Parameter) -> Self {
        self.set_param(param);
        self
    }

    /// Returns the text content, falling back to the raw value.
    #[must_use]
    pub fn as_text(&self) -> &str {
        self.value.as_text().unwrap_or(&self.raw_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_property_escapes_raw_value() {
        let prop = Property::text(names::SUMMARY, "Buy milk, eggs");
        assert_eq!(prop.raw_value, "Buy milk\\, eggs");
        assert_eq!(prop.as_text(), "Buy milk, eggs");
    }

    #[test]
    fn date_property_marks_value_type() {
        let prop = Property::date(names::DUE, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(prop.get_param_value("VALUE"), Some("DATE"));
        assert_eq!(prop.raw_value, "20260201");
    }

    #[test]
    fn zoned_datetime_adds_tzid() {
        let value = NaiveDate::from_ymd_opt(2026, 2, 1)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let prop = Property::datetime(names::DTSTART, DateTime::zoned(value, "Europe/Paris"));
        assert_eq!(prop.get_param_value("TZID"), Some("Europe/Paris"));
        assert_eq!(prop.raw_value, "20260201T083000");
    }

    #[test]
    fn set_param_replaces_existing() {
        let mut prop = Property::cal_address(names::ATTENDEE, "mailto:a@example.com")
            .with_param(Parameter::partstat("NEEDS-ACTION"));
        prop.set_param(Parameter::partstat("ACCEPTED"));
        assert_eq!(prop.params.len(), 1);
        assert_eq!(prop.get_param_value("PARTSTAT"), Some("ACCEPTED"));
    }
}
