//! Date and date-time values (RFC 5545 §3.3.4, §3.3.5).

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// Format of a DATE value on the wire.
pub(crate) const DATE_FORMAT: &str = "%Y%m%d";
/// Format of a DATE-TIME value on the wire, without the UTC designator.
pub(crate) const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";

/// The three forms a DATE-TIME can take.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DateTimeForm {
    /// Local wall-clock time with no zone information.
    #[default]
    Floating,
    /// UTC time, written with a trailing `Z`.
    Utc,
    /// Wall-clock time in the zone named by a `TZID` parameter.
    Zoned { tzid: String },
}

/// A DATE-TIME value together with its form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateTime {
    /// Wall-clock value, or the UTC value for [`DateTimeForm::Utc`].
    pub value: NaiveDateTime,
    pub form: DateTimeForm,
}

impl DateTime {
    /// Creates a floating DATE-TIME.
    #[must_use]
    pub const fn floating(value: NaiveDateTime) -> Self {
        Self {
            value,
            form: DateTimeForm::Floating,
        }
    }

    /// Creates a UTC DATE-TIME.
    #[must_use]
    pub const fn utc(value: NaiveDateTime) -> Self {
        Self {
            value,
            form: DateTimeForm::Utc,
        }
    }

    /// Creates a zoned DATE-TIME.
    #[must_use]
    pub fn zoned(value: NaiveDateTime, tzid: impl Into<String>) -> Self {
        Self {
            value,
            form: DateTimeForm::Zoned { tzid: tzid.into() },
        }
    }

    /// Returns whether this is a UTC time.
    #[must_use]
    pub fn is_utc(&self) -> bool {
        matches!(self.form, DateTimeForm::Utc)
    }

    /// Returns whether this is a floating time.
    #[must_use]
    pub fn is_floating(&self) -> bool {
        matches!(self.form, DateTimeForm::Floating)
    }

    /// Returns the timezone ID if this is a zoned time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match &self.form {
            DateTimeForm::Zoned { tzid } => Some(tzid),
            _ => None,
        }
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value.format(DATETIME_FORMAT))?;
        if self.is_utc() {
            write!(f, "Z")?;
        }
        Ok(())
    }
}

/// A value that may be either a DATE or a DATE-TIME.
///
/// `DTSTART`, `DUE`, `COMPLETED`, `RECURRENCE-ID`, `RDATE` and `EXDATE`
/// all accept both.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DateOrDateTime {
    Date(NaiveDate),
    DateTime(DateTime),
}

impl DateOrDateTime {
    /// Returns whether this is a date-only value.
    #[must_use]
    pub const fn is_date(&self) -> bool {
        matches!(self, Self::Date(_))
    }

    /// Returns the timezone ID if this is a zoned date-time.
    #[must_use]
    pub fn tzid(&self) -> Option<&str> {
        match self {
            Self::Date(_) => None,
            Self::DateTime(dt) => dt.tzid(),
        }
    }
}

impl fmt::Display for DateOrDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format(DATE_FORMAT)),
            Self::DateTime(dt) => write!(f, "{dt}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 23)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn datetime_display() {
        assert_eq!(DateTime::utc(at(12, 0, 0)).to_string(), "20260123T120000Z");
        assert_eq!(
            DateTime::floating(at(9, 15, 30)).to_string(),
            "20260123T091530"
        );
        assert_eq!(
            DateTime::zoned(at(9, 15, 30), "Europe/Paris").to_string(),
            "20260123T091530"
        );
    }

    #[test]
    fn date_display() {
        let date = DateOrDateTime::Date(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        assert_eq!(date.to_string(), "20260301");
        assert!(date.is_date());
    }

    #[test]
    fn tzid_only_for_zoned() {
        assert_eq!(DateTime::zoned(at(1, 0, 0), "UTC").tzid(), Some("UTC"));
        assert_eq!(DateTime::utc(at(1, 0, 0)).tzid(), None);
    }
}
