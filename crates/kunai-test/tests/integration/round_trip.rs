use kunai_test::component::db::TodoStore;
use kunai_test::component::db::enums::{Classification, RuleKind, TodoStatus};

use super::helpers::*;

fn report_document(uid: &str) -> String {
    let uid = format!("UID:{uid}");
    let mut lines: Vec<&str> = PARIS_VTIMEZONE.to_vec();
    lines.extend([
        "BEGIN:VTODO",
        uid.as_str(),
        "SUMMARY:Write report",
        "DESCRIPTION:Quarterly numbers",
        "DTSTART;TZID=Europe/Paris:20260610T090000",
        "DUE;TZID=Europe/Paris:20260610T170000",
        "STATUS:IN-PROCESS",
        "PERCENT-COMPLETE:40",
        "CLASS:PRIVATE",
        "CATEGORIES:Work,Reports",
        "LOCATION:Office",
        "ATTENDEE;PARTSTAT=TENTATIVE;CN=Dana:mailto:dana@example.com",
        "RRULE:FREQ=WEEKLY;COUNT=4",
        "X-CLIENT-COLOR:teal",
        "END:VTODO",
    ]);
    document(&lines)
}

/// ## Summary
/// A served document stored again yields the same structured to-do.
#[test_log::test(tokio::test)]
async fn served_document_decodes_to_the_same_todo() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let archive = world.store.add_calendar("Archive", alice.user);
    let mut tx = world.store.begin();

    let first = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &report_document("report-1"))
        .await
        .expect("put succeeds");
    let served = world
        .service
        .get(&mut tx, &ctx(alice), first)
        .await
        .expect("get succeeds");
    assert!(served.contains("X-CLIENT-COLOR:teal"), "{served}");

    let second = world
        .service
        .put(&mut tx, &ctx(alice), archive, None, &served)
        .await
        .expect("served document stores again");

    let a = todo(&mut tx, first).await;
    let b = todo(&mut tx, second).await;
    assert_eq!(a.uuid, "report-1");
    assert_eq!(b.uuid, a.uuid);
    assert_eq!(b.summary.as_deref(), Some("Write report"));
    assert_eq!(b.description, a.description);
    assert_eq!(a.dtstart, Some(at(2026, 6, 10, 7, 0)));
    assert_eq!(a.due, Some(at(2026, 6, 10, 15, 0)));
    assert_eq!(b.dtstart, a.dtstart);
    assert_eq!(b.due, a.due);
    assert_eq!(b.status, Some(TodoStatus::InProcess));
    assert_eq!(b.percent_complete, Some(40));
    assert_eq!(b.classification, Classification::Private);
    assert_eq!(b.categories, a.categories);
    assert_eq!(b.categories.len(), 2);
    assert_eq!(b.location, a.location);
    assert_eq!(b.timezone.as_deref(), Some("Europe/Paris"));

    let from_a = attendee_states(&mut tx, first).await;
    let from_b = attendee_states(&mut tx, second).await;
    assert_eq!(from_a.len(), 1);
    assert_eq!(from_a, from_b);

    let rules_a = tx.rules_of(first, RuleKind::Recurrence).await.expect("rules");
    let rules_b = tx.rules_of(second, RuleKind::Recurrence).await.expect("rules");
    assert_eq!(rules_a.len(), 1);
    assert_eq!(rules_a[0].values, rules_b[0].values);
    assert_eq!(rules_a[0].values.count, Some(4));
}

/// ## Summary
/// A fresh to-do is served with a literal `SEQUENCE:0`, and a rewrite bumps
/// it.
#[test_log::test(tokio::test)]
async fn sequence_starts_at_zero_and_counts_writes() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let mut tx = world.store.begin();
    let body = document(&["BEGIN:VTODO", "UID:seq-1", "SUMMARY:Count me", "END:VTODO"]);

    let id = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("put succeeds");
    let served = world.service.get(&mut tx, &ctx(alice), id).await.expect("get");
    assert!(served.contains("\r\nSEQUENCE:0\r\n"), "{served}");

    world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, Some(id), &body)
        .await
        .expect("rewrite succeeds");
    let served = world.service.get(&mut tx, &ctx(alice), id).await.expect("get");
    assert!(served.contains("\r\nSEQUENCE:1\r\n"), "{served}");
}

/// ## Summary
/// Classification defaults to public; an unknown `CLASS` is stored as public
/// but served back as the client wrote it.
#[test_log::test(tokio::test)]
async fn unknown_class_is_public_but_preserved() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let mut tx = world.store.begin();

    let plain = document(&["BEGIN:VTODO", "UID:class-1", "END:VTODO"]);
    let plain = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &plain)
        .await
        .expect("put succeeds");
    assert_eq!(todo(&mut tx, plain).await.classification, Classification::Public);
    let served = world.service.get(&mut tx, &ctx(alice), plain).await.expect("get");
    assert!(served.contains("\r\nCLASS:PUBLIC\r\n"), "{served}");

    let secret = document(&["BEGIN:VTODO", "UID:class-2", "CLASS:X-SECRET", "END:VTODO"]);
    let secret = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &secret)
        .await
        .expect("put succeeds");
    assert_eq!(todo(&mut tx, secret).await.classification, Classification::Public);
    let served = world.service.get(&mut tx, &ctx(alice), secret).await.expect("get");
    assert!(served.contains("\r\nCLASS:X-SECRET\r\n"), "{served}");
    assert!(!served.contains("CLASS:PUBLIC"), "{served}");
}

/// ## Summary
/// Unknown `STATUS` values are dropped instead of failing the document.
#[test_log::test(tokio::test)]
async fn unknown_status_is_cleared() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let mut tx = world.store.begin();
    let body = document(&["BEGIN:VTODO", "UID:status-1", "STATUS:WAITING", "END:VTODO"]);

    let id = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("put succeeds");
    assert_eq!(todo(&mut tx, id).await.status, None);
    let served = world.service.get(&mut tx, &ctx(alice), id).await.expect("get");
    assert!(!served.contains("STATUS:"), "{served}");
}

/// ## Summary
/// A block without `UID` gets a generated one, which names its entry.
#[test_log::test(tokio::test)]
async fn missing_uid_is_generated() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let mut tx = world.store.begin();
    let body = document(&["BEGIN:VTODO", "SUMMARY:Anonymous", "END:VTODO"]);

    let id = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("put succeeds");
    let uuid = todo(&mut tx, id).await.uuid;
    assert!(!uuid.is_empty());

    let entries = world
        .service
        .list(&mut tx, &ctx(alice), alice.calendar)
        .await
        .expect("list");
    assert_eq!(entries, vec![format!("{uuid}.ics")]);
}

/// ## Summary
/// Empty text properties are not served back, and an empty `ORGANIZER`
/// does not turn into a bare `MAILTO:`.
#[test_log::test(tokio::test)]
async fn empty_text_properties_are_not_served() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let mut tx = world.store.begin();
    let body = document(&[
        "BEGIN:VTODO",
        "UID:blank-1",
        "SUMMARY:",
        "DESCRIPTION:",
        "ORGANIZER:",
        "END:VTODO",
    ]);

    let id = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("put succeeds");
    let served = world.service.get(&mut tx, &ctx(alice), id).await.expect("get");

    assert!(!served.contains("SUMMARY"), "{served}");
    assert!(!served.contains("DESCRIPTION"), "{served}");
    assert!(!served.contains("ORGANIZER"), "{served}");
    assert!(!served.contains("MAILTO:\r\n"), "{served}");
}
