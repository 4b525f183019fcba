#![allow(clippy::expect_used, clippy::unwrap_used, dead_code)]
//! Shared fixtures for the document-level integration tests.
//!
//! Every test builds a fresh in-memory world, so tests never share state.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use kunai_test::component::db::enums::PartStat;
use kunai_test::component::db::model::{Attendee, Todo};
use kunai_test::component::db::{MemoryStore, MemoryTransaction, TodoFilter, TodoStore};
use kunai_test::component::types::{CalendarId, TodoId, UserId};
use kunai_test::component::{Context, MemoryListingCache, TodoService};
use kunai_test::rfc::rfc::ical::core::ICalendar;
use kunai_test::rfc::rfc::ical::parse::parse;

pub const ALICE: &str = "alice@example.com";
pub const BOB: &str = "bob@example.com";
pub const CAROL: &str = "carol@example.com";

/// A user with one calendar of their own.
#[derive(Debug, Clone, Copy)]
pub struct Person {
    pub user: UserId,
    pub calendar: CalendarId,
    pub email: &'static str,
}

/// An in-memory store and a service running in UTC.
pub struct World {
    pub store: MemoryStore,
    pub service: TodoService,
}

impl World {
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: MemoryStore::new(),
            service: TodoService::with_timezone(
                chrono_tz::UTC,
                "-//Kunai//Integration Tests//EN",
                "integration",
                Arc::new(MemoryListingCache::new()),
            ),
        }
    }

    /// Registers a user named after the local part of `email`.
    pub fn person(&mut self, email: &'static str, timezone: Option<&str>) -> Person {
        let name = email.split('@').next().unwrap_or(email);
        let user = self.store.add_user(name, email, timezone);
        let calendar = self.store.add_calendar(format!("{name}'s to-dos"), user);
        Person {
            user,
            calendar,
            email,
        }
    }
}

/// The fixed instant every test acts at.
#[must_use]
pub fn now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 6, 1)
        .expect("valid date")
        .and_hms_opt(8, 30, 0)
        .expect("valid time")
}

#[must_use]
pub fn ctx(person: Person) -> Context {
    Context::new(person.user, now())
}

#[must_use]
pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .expect("valid date")
        .and_hms_opt(hour, minute, 0)
        .expect("valid time")
}

/// Wraps content lines in a `VCALENDAR` and joins them with CRLF.
#[must_use]
pub fn document(lines: &[&str]) -> String {
    let mut out = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Client//EN\r\n");
    for line in lines {
        out.push_str(line);
        out.push_str("\r\n");
    }
    out.push_str("END:VCALENDAR\r\n");
    out
}

/// A `VTIMEZONE` block naming `Europe/Paris`.
pub const PARIS_VTIMEZONE: &[&str] = &[
    "BEGIN:VTIMEZONE",
    "TZID:Europe/Paris",
    "BEGIN:STANDARD",
    "DTSTART:19701025T030000",
    "TZOFFSETFROM:+0200",
    "TZOFFSETTO:+0100",
    "END:STANDARD",
    "END:VTIMEZONE",
];

/// A to-do organized by Alice with Bob accepting and Carol declining.
#[must_use]
pub fn organized_document(uid: &str, summary: &str) -> String {
    let summary = format!("SUMMARY:{summary}");
    let uid = format!("UID:{uid}");
    document(&[
        "BEGIN:VTODO",
        &uid,
        &summary,
        "ORGANIZER:mailto:alice@example.com",
        "ATTENDEE;PARTSTAT=ACCEPTED:mailto:alice@example.com",
        "ATTENDEE;PARTSTAT=ACCEPTED;CN=Bob:mailto:bob@example.com",
        "ATTENDEE;PARTSTAT=DECLINED:mailto:carol@example.com",
        "END:VTODO",
    ])
}

pub fn parse_output(text: &str) -> ICalendar {
    parse(text).expect("served document parses")
}

/// The master with `uuid` in `calendar`, if any.
pub async fn master_in(
    tx: &mut MemoryTransaction<'_>,
    uuid: &str,
    calendar: CalendarId,
) -> Option<TodoId> {
    tx.find_todos(
        &TodoFilter::default()
            .uuid(uuid)
            .calendar(calendar)
            .parent(None),
    )
    .await
    .expect("find to-dos")
    .first()
    .copied()
}

pub async fn todo(tx: &mut MemoryTransaction<'_>, id: TodoId) -> Todo {
    tx.get_todo(id).await.expect("stored to-do")
}

pub async fn attendees(tx: &mut MemoryTransaction<'_>, id: TodoId) -> Vec<Attendee> {
    tx.attendees_of(id).await.expect("attendees")
}

/// `(email, status, common name)` of each attendee, in stored order.
pub async fn attendee_states(
    tx: &mut MemoryTransaction<'_>,
    id: TodoId,
) -> Vec<(String, Option<PartStat>, Option<String>)> {
    attendees(tx, id)
        .await
        .into_iter()
        .map(|attendee| (attendee.email, attendee.status, attendee.common_name))
        .collect()
}
