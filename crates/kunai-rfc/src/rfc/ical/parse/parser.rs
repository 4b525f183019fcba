//! iCalendar document parser (RFC 5545).
//!
//! Builds the component tree and types property values. A value that does
//! not parse as its expected type is kept as [`Value::Unknown`] rather than
//! failing the document.

use super::error::{ParseError, ParseErrorKind, ParseResult};
use super::lexer::{parse_content_line, split_lines};
use super::values::{parse_date_or_datetime, split_text_list, unescape_text};
use crate::rfc::ical::core::{
    Component, ComponentKind, ContentLine, DateOrDateTime, ICalendar, Property, Value,
};

type Lines = std::vec::IntoIter<(usize, ContentLine)>;

/// Parses an iCalendar document from a string.
///
/// ## Errors
///
/// Returns an error if the input is not a structurally valid `VCALENDAR`.
#[tracing::instrument(skip(input), fields(input_len = input.len()))]
pub fn parse(input: &str) -> ParseResult<ICalendar> {
    tracing::debug!("Parsing iCalendar document");

    let root = parse_root(input)?;
    if root.kind != ComponentKind::Calendar {
        tracing::warn!(name = %root.name, "Root component is not VCALENDAR");
        return Err(
            ParseError::new(ParseErrorKind::MissingBegin, 1, 1).with_context("expected VCALENDAR")
        );
    }

    tracing::debug!("iCalendar document parsed successfully");
    Ok(ICalendar { root })
}

/// Parses a single standalone component such as a stored `VTODO` block.
///
/// ## Errors
///
/// Returns an error if the input is not exactly one well-formed component.
pub fn parse_component(input: &str) -> ParseResult<Component> {
    parse_root(input)
}

fn parse_root(input: &str) -> ParseResult<Component> {
    let content_lines: Vec<(usize, ContentLine)> = split_lines(input)
        .into_iter()
        .map(|(line_num, line)| parse_content_line(&line, line_num).map(|cl| (line_num, cl)))
        .collect::<ParseResult<_>>()?;

    tracing::trace!(count = content_lines.len(), "Parsed content lines");

    let mut iter = content_lines.into_iter();
    let Some((line_num, begin)) = iter.next() else {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, 1, 1));
    };
    if begin.name != "BEGIN" {
        return Err(ParseError::new(ParseErrorKind::MissingBegin, line_num, 1));
    }

    let root = parse_body(&mut iter, line_num, &begin.raw_value)?;
    if let Some((trailing, _)) = iter.next() {
        return Err(ParseError::new(ParseErrorKind::MismatchedComponent, trailing, 1)
            .with_context("content after the closing END"));
    }
    Ok(root)
}

/// Parses properties and nested components until the matching END line.
fn parse_body(iter: &mut Lines, begin_line: usize, raw_name: &str) -> ParseResult<Component> {
    let mut component = Component::new(raw_name);
    let mut last_line = begin_line;

    loop {
        let Some((line_num, content_line)) = iter.next() else {
            return Err(ParseError::new(ParseErrorKind::MissingEnd, last_line, 1)
                .with_context(format!("missing END:{}", component.name)));
        };
        last_line = line_num;

        match content_line.name.as_str() {
            "BEGIN" => {
                let nested = parse_body(iter, line_num, &content_line.raw_value)?;
                component.children.push(nested);
            }
            "END" => {
                let end_name = content_line.raw_value.to_ascii_uppercase();
                if end_name != component.name {
                    return Err(
                        ParseError::new(ParseErrorKind::MismatchedComponent, line_num, 1)
                            .with_context(format!(
                                "expected END:{}, got END:{end_name}",
                                component.name
                            )),
                    );
                }
                return Ok(component);
            }
            _ => component
                .properties
                .push(parse_property(content_line, line_num)),
        }
    }
}

/// Types a property value according to its name and parameters.
fn parse_property(cl: ContentLine, line_num: usize) -> Property {
    let value = match cl.name.as_str() {
        "DTSTART" | "DUE" | "COMPLETED" | "RECURRENCE-ID" | "DTSTAMP" | "CREATED"
        | "LAST-MODIFIED" => {
            match parse_date_or_datetime(&cl.raw_value, cl.value_type(), cl.tzid(), line_num) {
                Ok(DateOrDateTime::Date(date)) => Value::Date(date),
                Ok(DateOrDateTime::DateTime(dt)) => Value::DateTime(dt),
                Err(err) => unknown(&cl, &err),
            }
        }
        "RDATE" | "EXDATE" => parse_date_list(&cl, line_num),
        "PERCENT-COMPLETE" | "SEQUENCE" | "PRIORITY" | "REPEAT" => {
            match cl.raw_value.trim().parse::<i32>() {
                Ok(i) => Value::Integer(i),
                Err(e) => {
                    tracing::warn!(property = %cl.name, value = %cl.raw_value, error = %e, "Malformed integer value");
                    Value::Unknown(cl.raw_value.clone())
                }
            }
        }
        "CATEGORIES" | "RESOURCES" => Value::TextList(split_text_list(&cl.raw_value)),
        "ATTENDEE" | "ORGANIZER" => Value::CalAddress(cl.raw_value.clone()),
        "RRULE" | "EXRULE" => Value::Recur(cl.raw_value.clone()),
        "TZOFFSETFROM" | "TZOFFSETTO" | "TRIGGER" | "DURATION" | "URL" | "TZURL" => {
            Value::Unknown(cl.raw_value.clone())
        }
        _ => Value::Text(unescape_text(&cl.raw_value)),
    };

    Property {
        name: cl.name,
        params: cl.params,
        value,
        raw_value: cl.raw_value,
    }
}

/// Parses an `RDATE`/`EXDATE` list. `PERIOD` entries are not supported and
/// leave the whole property untyped.
fn parse_date_list(cl: &ContentLine, line_num: usize) -> Value {
    if cl.raw_value.contains('/') {
        return Value::Unknown(cl.raw_value.clone());
    }
    let parsed = cl
        .raw_value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_date_or_datetime(s, cl.value_type(), cl.tzid(), line_num))
        .collect::<ParseResult<Vec<_>>>();
    match parsed {
        Ok(list) => Value::DateList(list),
        Err(err) => unknown(cl, &err),
    }
}

fn unknown(cl: &ContentLine, err: &ParseError) -> Value {
    tracing::warn!(property = %cl.name, value = %cl.raw_value, error = %err, "Malformed property value");
    Value::Unknown(cl.raw_value.clone())
}
