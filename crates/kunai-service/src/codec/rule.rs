//! `RRULE` / `EXRULE` codec.
//!
//! Rules are checked with the `rrule` crate before their parts are stored.

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use kunai_db::db::enums::Frequency;
use kunai_db::db::model::{RuleRecord, RuleValues};
use kunai_rfc::rfc::ical::core::Property;
use kunai_rfc::rfc::ical::parse::{parse_date, parse_datetime};
use kunai_rfc::rfc::ical::timezone::{local_to_utc, to_local};
use rrule::{RRule, Unvalidated};

use super::date::midnight;

/// ## Summary
/// Decodes an `RRULE`/`EXRULE` property.
///
/// Returns `None`, with a warning, when the rule does not parse.
#[must_use]
pub fn to_values(prop: &Property, local: Tz) -> Option<RuleValues> {
    let text = prop.value.as_recur().unwrap_or(&prop.raw_value).trim();
    if let Err(err) = text.parse::<RRule<Unvalidated>>() {
        tracing::warn!(property = %prop.name, rule = %text, error = %err, "Skipping invalid recurrence rule");
        return None;
    }
    parse_parts(text, local)
}

fn parse_parts(text: &str, local: Tz) -> Option<RuleValues> {
    let mut freq = None;
    let mut values = RuleValues::new(Frequency::Daily);
    for part in text.split(';').filter(|part| !part.is_empty()) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_uppercase().as_str() {
            "FREQ" => freq = Frequency::from_ical(value),
            "UNTIL" => {
                if let Some((until, is_date)) = parse_until(value, local) {
                    values.until = Some(until);
                    values.until_date = is_date;
                }
            }
            "COUNT" => values.count = value.parse().ok(),
            "INTERVAL" => values.interval = value.parse().ok(),
            "BYSECOND" => values.by_second = Some(value.to_string()),
            "BYMINUTE" => values.by_minute = Some(value.to_string()),
            "BYHOUR" => values.by_hour = Some(value.to_string()),
            "BYDAY" => values.by_day = Some(value.to_string()),
            "BYMONTHDAY" => values.by_month_day = Some(value.to_string()),
            "BYYEARDAY" => values.by_year_day = Some(value.to_string()),
            "BYWEEKNO" => values.by_week_no = Some(value.to_string()),
            "BYMONTH" => values.by_month = Some(value.to_string()),
            "BYSETPOS" => values.by_set_pos = Some(value.to_string()),
            "WKST" => values.wkst = Some(value.to_ascii_uppercase()),
            other => tracing::debug!(part = %other, "Ignoring unknown rule part"),
        }
    }
    values.freq = freq?;
    Some(values)
}

/// `UNTIL` in local time, and whether it was a whole date.
fn parse_until(value: &str, local: Tz) -> Option<(NaiveDateTime, bool)> {
    if value.len() == 8 {
        return parse_date(value, 0).ok().map(|date| (midnight(date), true));
    }
    parse_datetime(value, None, 0)
        .ok()
        .map(|dt| (to_local(&dt, local), false))
}

/// ## Summary
/// Encodes stored rule parts as RECUR text.
///
/// A date-time `UNTIL` is written in UTC.
#[must_use]
pub fn from_record(record: &RuleRecord, local: Tz) -> String {
    let values = &record.values;
    let mut parts = vec![format!("FREQ={}", values.freq)];
    if let Some(until) = values.until {
        let until = if values.until_date {
            until.date().format("%Y%m%d").to_string()
        } else {
            local_to_utc(until, local).to_string()
        };
        parts.push(format!("UNTIL={until}"));
    }
    if let Some(count) = values.count {
        parts.push(format!("COUNT={count}"));
    }
    if let Some(interval) = values.interval {
        parts.push(format!("INTERVAL={interval}"));
    }
    let lists = [
        ("BYSECOND", &values.by_second),
        ("BYMINUTE", &values.by_minute),
        ("BYHOUR", &values.by_hour),
        ("BYDAY", &values.by_day),
        ("BYMONTHDAY", &values.by_month_day),
        ("BYYEARDAY", &values.by_year_day),
        ("BYWEEKNO", &values.by_week_no),
        ("BYMONTH", &values.by_month),
        ("BYSETPOS", &values.by_set_pos),
        ("WKST", &values.wkst),
    ];
    for (key, value) in lists {
        if let Some(value) = value {
            parts.push(format!("{key}={value}"));
        }
    }
    parts.join(";")
}

/// Encodes a stored rule as a property named `name`.
#[must_use]
pub fn to_property(name: &str, record: &RuleRecord, local: Tz) -> Property {
    Property::recur(name, from_record(record, local))
}
