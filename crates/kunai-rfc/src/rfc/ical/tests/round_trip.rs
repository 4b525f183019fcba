//! Round-trip parsing and serialization tests for iCalendar.

use super::fixtures::{VTODO_LONG_TEXT, VTODO_MINIMAL, VTODO_RECURRING};
use crate::rfc::ical::build::serialize;
use crate::rfc::ical::parse::parse;

/// Parse, serialize, parse again and compare the trees.
fn round_trip(input: &str) -> Result<(), String> {
    let first = parse(input).map_err(|e| format!("First parse failed: {e}"))?;
    let serialized = serialize(&first);
    let second =
        parse(&serialized).map_err(|e| format!("Second parse failed: {e}\n{serialized}"))?;

    if first != second {
        return Err(format!("Tree mismatch after round trip:\n{serialized}"));
    }
    Ok(())
}

#[test]
fn round_trip_vtodo_minimal() {
    round_trip(VTODO_MINIMAL).expect("round trip should succeed");
}

#[test]
fn round_trip_vtodo_recurring() {
    round_trip(VTODO_RECURRING).expect("round trip should succeed");
}

#[test]
fn round_trip_vtodo_long_text() {
    round_trip(VTODO_LONG_TEXT).expect("round trip should succeed");
}

#[test]
fn recurring_fixture_has_override_blocks() {
    let ical = parse(VTODO_RECURRING).unwrap();
    let todos = ical.todos();
    assert_eq!(todos.len(), 2);
    assert!(todos[1].has_property("RECURRENCE-ID"));
    assert_eq!(ical.timezones().len(), 1);
}

#[test]
fn long_text_unescapes_after_unfold() {
    let ical = parse(VTODO_LONG_TEXT).unwrap();
    let description = ical.todos()[0].get_property("DESCRIPTION").unwrap();
    assert!(description.as_text().ends_with("semicolons and a newline\nsecond line"));
    assert!(description.as_text().contains("written back out, with commas;"));
}
