//! Conversion between stored to-dos and `VTODO` components.

pub mod decode;
pub mod encode;


pub use decode::Decoder;
pub use encode::Encoder;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use kunai_rfc::rfc::ical::core::{DateOrDateTime, Property};
use kunai_rfc::rfc::ical::timezone::to_local;

use crate::codec::date::midnight;

/// ## Summary
/// Reads a DATE or DATE-TIME property as local wall-clock time.
///
/// Whole dates become local midnight. Returns `None`, with a warning, when
/// the value is malformed.
#[must_use]
pub fn local_datetime(prop: &Property, local: Tz) -> Option<NaiveDateTime> {
    match prop.value.as_date_or_datetime() {
        Some(DateOrDateTime::Date(date)) => Some(midnight(date)),
        Some(DateOrDateTime::DateTime(dt)) => Some(to_local(&dt, local)),
        None => {
            tracing::warn!(property = %prop.name, value = %prop.raw_value, "Ignoring malformed date");
            None
        }
    }
}
