//! Typed property values (RFC 5545 §3.3).

use chrono::NaiveDate;

use super::datetime::{DateOrDateTime, DateTime};

/// A property value after type resolution.
///
/// Values that fail to parse as their expected type are kept as
/// [`Value::Unknown`] so a malformed property never aborts a whole document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Unescaped TEXT.
    Text(String),
    /// Comma-separated TEXT list (`CATEGORIES`).
    TextList(Vec<String>),
    Integer(i32),
    Date(NaiveDate),
    DateTime(DateTime),
    /// `RDATE` / `EXDATE` lists.
    DateList(Vec<DateOrDateTime>),
    /// CAL-ADDRESS, usually a `mailto:` URI.
    CalAddress(String),
    /// RECUR value kept as its raw text.
    Recur(String),
    Unknown(String),
}

impl Value {
    /// Returns the text if this is a TEXT or CAL-ADDRESS value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::CalAddress(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text_list(&self) -> Option<&[String]> {
        match self {
            Self::TextList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_integer(&self) -> Option<i32> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value as a date or date-time, if it is one.
    #[must_use]
    pub fn as_date_or_datetime(&self) -> Option<DateOrDateTime> {
        match self {
            Self::Date(d) => Some(DateOrDateTime::Date(*d)),
            Self::DateTime(dt) => Some(DateOrDateTime::DateTime(dt.clone())),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_date_list(&self) -> Option<&[DateOrDateTime]> {
        match self {
            Self::DateList(list) => Some(list),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_recur(&self) -> Option<&str> {
        match self {
            Self::Recur(s) => Some(s),
            _ => None,
        }
    }
}
