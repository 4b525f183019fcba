//! Value type parsers for iCalendar (RFC 5545 §3.3).

use chrono::{NaiveDate, NaiveDateTime};

use super::error::{ParseError, ParseErrorKind, ParseResult};
use crate::rfc::ical::core::{DateOrDateTime, DateTime, DateTimeForm};

/// Parses a DATE value (RFC 5545 §3.3.4).
///
/// Format: YYYYMMDD (e.g., "19970714")
///
/// ## Errors
/// Returns an error if the string is not a valid calendar date.
pub fn parse_date(s: &str, line: usize) -> ParseResult<NaiveDate> {
    if s.len() != 8 {
        return Err(ParseError::new(ParseErrorKind::InvalidDate, line, 1).with_context(s));
    }
    NaiveDate::parse_from_str(s, "%Y%m%d")
        .map_err(|e| ParseError::new(ParseErrorKind::InvalidDate, line, 1).with_context(e.to_string()))
}

/// Parses a DATE-TIME value (RFC 5545 §3.3.5).
///
/// Format: YYYYMMDDTHHMMSS[Z]. A trailing `Z` yields a UTC value, otherwise
/// a `TZID` makes it zoned and its absence makes it floating.
///
/// ## Errors
/// Returns an error if the string is not a valid date-time.
pub fn parse_datetime(s: &str, tzid: Option<&str>, line: usize) -> ParseResult<DateTime> {
    let (body, is_utc) = match s.strip_suffix('Z') {
        Some(stripped) => (stripped, true),
        None => (s, false),
    };
    if body.len() != 15 {
        return Err(ParseError::new(ParseErrorKind::InvalidDateTime, line, 1).with_context(s));
    }
    let value = NaiveDateTime::parse_from_str(body, "%Y%m%dT%H%M%S").map_err(|e| {
        ParseError::new(ParseErrorKind::InvalidDateTime, line, 1).with_context(e.to_string())
    })?;

    let form = match (is_utc, tzid) {
        (true, _) => DateTimeForm::Utc,
        (false, Some(tzid)) => DateTimeForm::Zoned {
            tzid: tzid.to_string(),
        },
        (false, None) => DateTimeForm::Floating,
    };
    Ok(DateTime { value, form })
}

/// Parses a value that may be a DATE or a DATE-TIME.
///
/// `VALUE=DATE` forces a date; otherwise the shape of the value decides.
///
/// ## Errors
/// Returns an error if the value is neither.
pub fn parse_date_or_datetime(
    s: &str,
    value_type: Option<&str>,
    tzid: Option<&str>,
    line: usize,
) -> ParseResult<DateOrDateTime> {
    let is_date = value_type.is_some_and(|v| v.eq_ignore_ascii_case("DATE"))
        || (s.len() == 8 && !s.contains('T'));
    if is_date {
        parse_date(s, line).map(DateOrDateTime::Date)
    } else {
        parse_datetime(s, tzid, line).map(DateOrDateTime::DateTime)
    }
}

/// Unescapes a TEXT value (RFC 5545 §3.3.11).
#[must_use]
pub fn unescape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => result.push('\n'),
            Some(other) => result.push(other),
            None => result.push('\\'),
        }
    }
    result
}

/// Splits a TEXT list on unescaped commas and unescapes each entry.
#[must_use]
pub fn split_text_list(s: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut escaped = false;
    for c in s.chars() {
        if escaped {
            current.push('\\');
            current.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == ',' {
            items.push(unescape_text(&current));
            current.clear();
        } else {
            current.push(c);
        }
    }
    if escaped {
        current.push('\\');
    }
    items.push(unescape_text(&current));
    items.retain(|item| !item.is_empty());
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_date() {
        let date = parse_date("19970714", 1).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1997, 7, 14).unwrap());
    }

    #[test]
    fn parse_invalid_date() {
        assert!(parse_date("19971314", 1).is_err());
        assert!(parse_date("1997071", 1).is_err());
    }

    #[test]
    fn parse_datetime_forms() {
        assert!(parse_datetime("20260123T120000Z", None, 1).unwrap().is_utc());
        assert!(
            parse_datetime("20260123T120000", None, 1)
                .unwrap()
                .is_floating()
        );
        let zoned = parse_datetime("20260123T120000", Some("Europe/Paris"), 1).unwrap();
        assert_eq!(zoned.tzid(), Some("Europe/Paris"));
    }

    #[test]
    fn parse_datetime_rejects_garbage() {
        let err = parse_datetime("2026-01-23 12:00", None, 3).unwrap_err();
        assert_eq!(err.kind, ParseErrorKind::InvalidDateTime);
        assert_eq!(err.line, 3);
    }

    #[test]
    fn date_or_datetime_by_shape() {
        assert!(parse_date_or_datetime("20260123", None, None, 1).unwrap().is_date());
        assert!(
            !parse_date_or_datetime("20260123T000000", None, None, 1)
                .unwrap()
                .is_date()
        );
    }

    #[test]
    fn unescape_sequences() {
        assert_eq!(unescape_text("a\\, b\\; c\\nd\\\\e"), "a, b; c\nd\\e");
    }

    #[test]
    fn split_list_respects_escaped_commas() {
        assert_eq!(
            split_text_list("Work,Home\\, garden,Errands"),
            vec!["Work", "Home, garden", "Errands"]
        );
    }
}
