//! Timezone resolution and wall-clock conversion for iCalendar date-times.
//!
//! Stored to-do timestamps are naive wall-clock values in a configured
//! "local" zone. These helpers move values between that zone, UTC and the
//! zone a document or a to-do asks for.

use chrono::{LocalResult, NaiveDateTime, Offset, TimeDelta, TimeZone, Utc};
use chrono_tz::{TZ_VARIANTS, Tz};

use super::core::{Component, DateTime, DateTimeForm, Property, names};

/// Returns the names of every zone known to the timezone database.
pub fn known_timezones() -> impl Iterator<Item = &'static str> {
    TZ_VARIANTS.iter().map(|tz| tz.name())
}

/// ## Summary
/// Resolves a `TZID` to a known zone.
///
/// An exact IANA name wins. Otherwise the longest known zone name that the
/// identifier ends with is used, which covers vendor prefixes such as
/// `/mozilla.org/20050126_1/Europe/Paris`.
#[must_use]
pub fn resolve_tzid(tzid: &str) -> Option<Tz> {
    if let Ok(tz) = tzid.parse::<Tz>() {
        return Some(tz);
    }
    TZ_VARIANTS
        .iter()
        .filter(|tz| tzid.ends_with(tz.name()))
        .max_by_key(|tz| tz.name().len())
        .copied()
}

/// ## Summary
/// Interprets a wall-clock value in `tz`.
///
/// During a DST fold the earlier instant is used. A value that falls into a
/// DST gap is moved forward past the gap.
#[must_use]
pub fn localize(tz: Tz, wall: NaiveDateTime) -> chrono::DateTime<Tz> {
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            let shifted = wall + TimeDelta::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&wall))
        }
    }
}

/// ## Summary
/// Converts a parsed DATE-TIME to wall-clock time in the `local` zone.
///
/// Floating values are kept as they are. UTC and zoned values are converted.
/// A zoned value whose `TZID` cannot be resolved is kept as wall-clock time
/// and logged.
#[must_use]
pub fn to_local(dt: &DateTime, local: Tz) -> NaiveDateTime {
    match &dt.form {
        DateTimeForm::Floating => dt.value,
        DateTimeForm::Utc => Utc
            .from_utc_datetime(&dt.value)
            .with_timezone(&local)
            .naive_local(),
        DateTimeForm::Zoned { tzid } => {
            if let Some(tz) = resolve_tzid(tzid) {
                localize(tz, dt.value).with_timezone(&local).naive_local()
            } else {
                tracing::warn!(%tzid, "Unresolvable TZID, keeping wall-clock time");
                dt.value
            }
        }
    }
}

/// ## Summary
/// Converts a `local` wall-clock value to a DATE-TIME in `target`.
///
/// UTC targets produce the `Z` form, other zones the `TZID` form.
#[must_use]
pub fn from_local(wall: NaiveDateTime, local: Tz, target: Tz) -> DateTime {
    let instant = localize(local, wall);
    if target == Tz::UTC || target == Tz::Etc__UTC {
        DateTime::utc(instant.naive_utc())
    } else {
        DateTime::zoned(instant.with_timezone(&target).naive_local(), target.name())
    }
}

/// ## Summary
/// Converts a `local` wall-clock value to a UTC DATE-TIME.
#[must_use]
pub fn local_to_utc(wall: NaiveDateTime, local: Tz) -> DateTime {
    DateTime::utc(localize(local, wall).naive_utc())
}

/// ## Summary
/// Builds a minimal `VTIMEZONE` for `tz`, with one `STANDARD` observance
/// carrying the offset in effect at `at_utc`.
///
/// This is enough for clients and for [`resolve_tzid`] to identify the zone;
/// it does not describe historical or future transitions.
#[must_use]
pub fn minimal_vtimezone(tz: Tz, at_utc: NaiveDateTime) -> Component {
    let offset_seconds = tz.offset_from_utc_datetime(&at_utc).fix().local_minus_utc();
    let offset = format_utc_offset(offset_seconds);

    let mut standard = Component::new("STANDARD");
    standard.add_property(Property::text(names::DTSTART, "19700101T000000"));
    standard.add_property(Property::text(names::TZOFFSETFROM, offset.clone()));
    standard.add_property(Property::text(names::TZOFFSETTO, offset));

    let mut vtimezone = Component::timezone();
    vtimezone.add_property(Property::text(names::TZID, tz.name()));
    vtimezone.add_child(standard);
    vtimezone
}

fn format_utc_offset(seconds: i32) -> String {
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    format!("{sign}{:02}{:02}", abs / 3600, (abs % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wall(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn resolve_exact_and_suffix() {
        assert_eq!(resolve_tzid("Europe/Paris"), Some(chrono_tz::Europe::Paris));
        assert_eq!(
            resolve_tzid("/mozilla.org/20050126_1/Europe/Paris"),
            Some(chrono_tz::Europe::Paris)
        );
        assert_eq!(resolve_tzid("Nowhere Standard Time"), None);
    }

    #[test]
    fn suffix_prefers_longest_name() {
        assert_eq!(
            resolve_tzid("X-VENDOR/America/Argentina/Buenos_Aires"),
            Some(chrono_tz::America::Argentina::Buenos_Aires)
        );
    }

    #[test]
    fn utc_to_local() {
        let dt = DateTime::utc(wall(2026, 7, 1, 10, 0));
        assert_eq!(to_local(&dt, chrono_tz::Europe::Paris), wall(2026, 7, 1, 12, 0));
    }

    #[test]
    fn zoned_to_local() {
        let dt = DateTime::zoned(wall(2026, 1, 15, 9, 0), "America/New_York");
        assert_eq!(to_local(&dt, chrono_tz::UTC), wall(2026, 1, 15, 14, 0));
    }

    #[test]
    fn floating_and_unknown_zone_are_kept() {
        let floating = DateTime::floating(wall(2026, 1, 15, 9, 0));
        assert_eq!(to_local(&floating, chrono_tz::Asia::Tokyo), wall(2026, 1, 15, 9, 0));

        let unknown = DateTime::zoned(wall(2026, 1, 15, 9, 0), "Custom/Zone");
        assert_eq!(to_local(&unknown, chrono_tz::Asia::Tokyo), wall(2026, 1, 15, 9, 0));
    }

    #[test]
    fn from_local_targets() {
        let utc = from_local(wall(2026, 7, 1, 12, 0), chrono_tz::Europe::Paris, chrono_tz::UTC);
        assert_eq!(utc, DateTime::utc(wall(2026, 7, 1, 10, 0)));

        let ny = from_local(
            wall(2026, 7, 1, 12, 0),
            chrono_tz::Europe::Paris,
            chrono_tz::America::New_York,
        );
        assert_eq!(ny, DateTime::zoned(wall(2026, 7, 1, 6, 0), "America/New_York"));
    }

    #[test]
    fn gap_moves_forward() {
        // 2026-03-29 02:30 does not exist in Paris
        let dt = localize(chrono_tz::Europe::Paris, wall(2026, 3, 29, 2, 30));
        assert_eq!(dt.naive_local(), wall(2026, 3, 29, 3, 30));
    }

    #[test]
    fn minimal_vtimezone_offsets() {
        let vtz = minimal_vtimezone(chrono_tz::Asia::Kolkata, wall(2026, 1, 1, 0, 0));
        assert_eq!(vtz.get_property("TZID").unwrap().as_text(), "Asia/Kolkata");
        let standard = &vtz.children[0];
        assert_eq!(standard.get_property("TZOFFSETTO").unwrap().raw_value, "+0530");
    }

    #[test]
    fn known_timezones_lists_iana_names() {
        assert!(known_timezones().any(|name| name == "Europe/Paris"));
    }
}
