use kunai_test::component::ServiceError;
use kunai_test::component::db::TodoStore;

use super::helpers::*;

fn standup_document(overrides: &[(&str, &str)]) -> String {
    let mut lines = vec![
        "BEGIN:VTODO".to_string(),
        "UID:standup".to_string(),
        "SUMMARY:Standup notes".to_string(),
        "DTSTART:20260601T090000Z".to_string(),
        "RRULE:FREQ=DAILY;COUNT=5".to_string(),
        "END:VTODO".to_string(),
    ];
    for (recurrence, summary) in overrides {
        lines.extend([
            "BEGIN:VTODO".to_string(),
            "UID:standup".to_string(),
            format!("RECURRENCE-ID:{recurrence}"),
            format!("SUMMARY:{summary}"),
            "END:VTODO".to_string(),
        ]);
    }
    let refs: Vec<&str> = lines.iter().map(String::as_str).collect();
    document(&refs)
}

/// ## Summary
/// A master with two overrides is stored as one master and two occurrences,
/// and served back as three `VTODO` blocks.
#[test_log::test(tokio::test)]
async fn overrides_become_occurrences() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let mut tx = world.store.begin();
    let body = standup_document(&[
        ("20260602T090000Z", "Tuesday notes"),
        ("20260603T090000Z", "Wednesday notes"),
    ]);

    let master = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("put succeeds");

    let occurrences = tx.occurrences_of(master).await.expect("occurrences");
    assert_eq!(occurrences.len(), 2);
    for occurrence in &occurrences {
        assert_eq!(occurrence.uuid, "standup");
        assert_eq!(occurrence.parent, Some(master));
        assert_eq!(occurrence.calendar, alice.calendar);
    }
    let mut recurrences: Vec<_> = occurrences.iter().filter_map(|o| o.recurrence).collect();
    recurrences.sort();
    assert_eq!(
        recurrences,
        vec![at(2026, 6, 2, 9, 0), at(2026, 6, 3, 9, 0)]
    );

    let served = world.service.get(&mut tx, &ctx(alice), master).await.expect("get");
    let ical = parse_output(&served);
    let todos = ical.todos();
    assert_eq!(todos.len(), 3);
    assert_eq!(
        todos
            .iter()
            .filter(|todo| todo.has_property("RECURRENCE-ID"))
            .count(),
        2
    );
    assert!(todos.iter().all(|todo| todo.uid() == Some("standup")));

    let entries = world
        .service
        .list(&mut tx, &ctx(alice), alice.calendar)
        .await
        .expect("list");
    assert_eq!(entries, vec!["standup.ics".to_string()]);
}

/// ## Summary
/// Rewriting the document matches overrides by `RECURRENCE-ID` and drops
/// the ones that disappeared.
#[test_log::test(tokio::test)]
async fn rewrite_matches_and_prunes_occurrences() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let mut tx = world.store.begin();

    let master = world
        .service
        .put(
            &mut tx,
            &ctx(alice),
            alice.calendar,
            None,
            &standup_document(&[
                ("20260602T090000Z", "Tuesday notes"),
                ("20260603T090000Z", "Wednesday notes"),
            ]),
        )
        .await
        .expect("put succeeds");
    let tuesday = tx
        .occurrences_of(master)
        .await
        .expect("occurrences")
        .into_iter()
        .find(|o| o.recurrence == Some(at(2026, 6, 2, 9, 0)))
        .expect("tuesday occurrence");

    world
        .service
        .put(
            &mut tx,
            &ctx(alice),
            alice.calendar,
            Some(master),
            &standup_document(&[("20260602T090000Z", "Tuesday, revised")]),
        )
        .await
        .expect("rewrite succeeds");

    let occurrences = tx.occurrences_of(master).await.expect("occurrences");
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].id, tuesday.id);
    assert_eq!(occurrences[0].summary.as_deref(), Some("Tuesday, revised"));
    assert_eq!(occurrences[0].sequence, tuesday.sequence + 1);
}

/// ## Summary
/// A block that is an occurrence and recurring at once is refused, and the
/// transaction leaves nothing behind.
#[test_log::test(tokio::test)]
async fn recurring_occurrence_is_rejected() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let body = document(&[
        "BEGIN:VTODO",
        "UID:broken",
        "RECURRENCE-ID:20260602T090000Z",
        "RRULE:FREQ=DAILY",
        "END:VTODO",
    ]);

    {
        let mut tx = world.store.begin();
        let err = world
            .service
            .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
            .await
            .expect_err("recurring occurrence is refused");
        assert!(matches!(err, ServiceError::ValidationError(_)));
        assert_eq!(err.to_string(), "Validation error: Recurrence can not be recurrent!");
    }
    assert_eq!(world.store.todo_count(), 0);
}

/// ## Summary
/// An override carrying its own `RRULE` fails the whole document.
#[test_log::test(tokio::test)]
async fn recurring_override_fails_the_document() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let body = document(&[
        "BEGIN:VTODO",
        "UID:nested",
        "RRULE:FREQ=WEEKLY",
        "END:VTODO",
        "BEGIN:VTODO",
        "UID:nested",
        "RECURRENCE-ID:20260608T090000Z",
        "RRULE:FREQ=DAILY",
        "END:VTODO",
    ]);

    let mut tx = world.store.begin();
    let err = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect_err("nested recurrence is refused");
    assert_eq!(err.to_string(), "Validation error: Recurrence can not be recurrent!");
    tx.rollback();
    assert_eq!(world.store.todo_count(), 0);
}
