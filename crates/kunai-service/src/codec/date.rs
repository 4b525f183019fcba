//! `RDATE` / `EXDATE` codec.

use chrono::{NaiveDateTime, NaiveTime};
use chrono_tz::Tz;
use kunai_db::db::model::{DateRecord, DateValues};
use kunai_rfc::rfc::ical::core::{DateOrDateTime, Property};
use kunai_rfc::rfc::ical::timezone::{from_local, to_local};

/// Local midnight of a whole-day value.
#[must_use]
pub fn midnight(date: chrono::NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Converts one wire date to local values.
#[must_use]
pub fn value_to_values(value: &DateOrDateTime, local: Tz) -> DateValues {
    match value {
        DateOrDateTime::Date(date) => DateValues {
            all_day: true,
            datetime: midnight(*date),
        },
        DateOrDateTime::DateTime(dt) => DateValues {
            all_day: false,
            datetime: to_local(dt, local),
        },
    }
}

/// ## Summary
/// Decodes every date of an `RDATE`/`EXDATE` property.
///
/// An untyped property (a `PERIOD` list or a malformed value) yields no
/// dates.
#[must_use]
pub fn to_values(prop: &Property, local: Tz) -> Vec<DateValues> {
    let Some(list) = prop.value.as_date_list() else {
        tracing::warn!(property = %prop.name, value = %prop.raw_value, "Skipping unsupported date list");
        return Vec::new();
    };
    list.iter()
        .map(|value| value_to_values(value, local))
        .collect()
}

/// Encodes a stored date in the `target` zone.
#[must_use]
pub fn from_record(record: &DateRecord, local: Tz, target: Tz) -> DateOrDateTime {
    if record.values.all_day {
        DateOrDateTime::Date(record.values.datetime.date())
    } else {
        DateOrDateTime::DateTime(from_local(record.values.datetime, local, target))
    }
}

/// Encodes a stored date as its own property named `name`.
#[must_use]
pub fn to_property(name: &str, record: &DateRecord, local: Tz, target: Tz) -> Property {
    Property::date_list(name, vec![from_record(record, local, target)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use kunai_core::types::{DateId, TodoId};
    use kunai_db::db::enums::DateKind;
    use kunai_rfc::rfc::ical::core::names;
    use kunai_rfc::rfc::ical::parse::parse_component;

    fn exdate(line: &str) -> Property {
        let block = format!("BEGIN:VTODO\r\n{line}\r\nEND:VTODO\r\n");
        parse_component(&block)
            .unwrap()
            .get_property(names::EXDATE)
            .unwrap()
            .clone()
    }

    fn wall(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    #[test]
    fn decode_date_list_in_local_time() {
        let values = to_values(
            &exdate("EXDATE:20260203T090000Z,20260204T090000Z"),
            chrono_tz::Europe::Paris,
        );
        assert_eq!(
            values,
            vec![
                DateValues {
                    all_day: false,
                    datetime: wall(3, 10),
                },
                DateValues {
                    all_day: false,
                    datetime: wall(4, 10),
                },
            ]
        );
    }

    #[test]
    fn decode_whole_days() {
        let values = to_values(&exdate("EXDATE;VALUE=DATE:20260205"), chrono_tz::UTC);
        assert_eq!(
            values,
            vec![DateValues {
                all_day: true,
                datetime: wall(5, 0),
            }]
        );
    }

    #[test]
    fn period_lists_are_skipped() {
        let prop = exdate("EXDATE;VALUE=PERIOD:20260203T090000Z/PT1H");
        assert!(to_values(&prop, chrono_tz::UTC).is_empty());
    }

    #[test]
    fn encode_in_target_zone() {
        let record = DateRecord {
            id: DateId(1),
            todo: TodoId(1),
            kind: DateKind::Exception,
            values: DateValues {
                all_day: false,
                datetime: wall(3, 10),
            },
        };
        let prop = to_property(
            names::EXDATE,
            &record,
            chrono_tz::Europe::Paris,
            chrono_tz::UTC,
        );
        assert_eq!(prop.raw_value, "20260203T090000Z");
        assert!(prop.params.is_empty());
    }
}
