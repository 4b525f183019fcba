use kunai_test::component::ServiceError;
use kunai_test::component::db::enums::PartStat;
use kunai_test::component::db::{DbError, TodoFilter, TodoStore};

use super::helpers::*;

/// ## Summary
/// The organizer's new to-do is copied into the calendar of every attendee
/// who has not declined, and nowhere else.
#[test_log::test(tokio::test)]
async fn put_fans_out_to_accepting_attendees() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let bob = world.person(BOB, None);
    let carol = world.person(CAROL, None);
    let mut tx = world.store.begin();

    let id = world
        .service
        .put(
            &mut tx,
            &ctx(alice),
            alice.calendar,
            None,
            &organized_document("trip", "Plan trip"),
        )
        .await
        .expect("put succeeds");

    let copies = tx
        .find_todos(&TodoFilter::default().uuid("trip"))
        .await
        .expect("find");
    assert_eq!(copies.len(), 2);
    assert_eq!(master_in(&mut tx, "trip", alice.calendar).await, Some(id));
    assert_eq!(master_in(&mut tx, "trip", carol.calendar).await, None);

    let copy = master_in(&mut tx, "trip", bob.calendar)
        .await
        .expect("bob holds a copy");
    let copy = todo(&mut tx, copy).await;
    assert_eq!(copy.summary.as_deref(), Some("Plan trip"));
    assert_eq!(copy.organizer.as_deref(), Some(ALICE));
    assert_eq!(
        attendee_states(&mut tx, copy.id).await,
        attendee_states(&mut tx, id).await
    );

    let entries = world
        .service
        .list(&mut tx, &ctx(bob), bob.calendar)
        .await
        .expect("list");
    assert_eq!(entries, vec!["trip.ics".to_string()]);
}

/// ## Summary
/// The organizer's rewrite reaches the copies but leaves their attendee
/// records alone.
#[test_log::test(tokio::test)]
async fn organizer_rewrite_updates_copies_without_touching_attendees() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let bob = world.person(BOB, None);
    let mut tx = world.store.begin();

    let id = world
        .service
        .put(
            &mut tx,
            &ctx(alice),
            alice.calendar,
            None,
            &organized_document("review", "Review draft"),
        )
        .await
        .expect("put succeeds");
    let copy = master_in(&mut tx, "review", bob.calendar)
        .await
        .expect("bob holds a copy");
    let before = attendees(&mut tx, copy).await;
    let sequence = todo(&mut tx, copy).await.sequence;

    world
        .service
        .put(
            &mut tx,
            &ctx(alice),
            alice.calendar,
            Some(id),
            &organized_document("review", "Review final draft"),
        )
        .await
        .expect("rewrite succeeds");

    let updated = todo(&mut tx, copy).await;
    assert_eq!(updated.summary.as_deref(), Some("Review final draft"));
    assert!(updated.sequence > sequence);
    assert_eq!(attendees(&mut tx, copy).await, before);
    assert_eq!(
        tx.find_todos(&TodoFilter::default().uuid("review"))
            .await
            .expect("find")
            .len(),
        2
    );
}

/// ## Summary
/// An attendee deleting their copy declines on the organizer's copy, which
/// stays in place.
#[test_log::test(tokio::test)]
async fn attendee_delete_declines_on_organizer_copy() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let bob = world.person(BOB, None);
    let mut tx = world.store.begin();

    let id = world
        .service
        .put(
            &mut tx,
            &ctx(alice),
            alice.calendar,
            None,
            &organized_document("offsite", "Book offsite"),
        )
        .await
        .expect("put succeeds");
    let copy = master_in(&mut tx, "offsite", bob.calendar)
        .await
        .expect("bob holds a copy");

    world
        .service
        .delete(&mut tx, &ctx(bob), &[copy])
        .await
        .expect("bob deletes his copy");

    assert_eq!(master_in(&mut tx, "offsite", bob.calendar).await, None);
    assert_eq!(master_in(&mut tx, "offsite", alice.calendar).await, Some(id));
    let bob_entry = attendees(&mut tx, id)
        .await
        .into_iter()
        .find(|attendee| attendee.email == BOB)
        .expect("bob is still listed");
    assert_eq!(bob_entry.status, Some(PartStat::Declined));
}

/// ## Summary
/// The organizer's delete removes every copy with the same `uuid`.
#[test_log::test(tokio::test)]
async fn organizer_delete_removes_every_copy() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let _bob = world.person(BOB, None);
    let mut tx = world.store.begin();

    let id = world
        .service
        .put(
            &mut tx,
            &ctx(alice),
            alice.calendar,
            None,
            &organized_document("cancelled", "Never mind"),
        )
        .await
        .expect("put succeeds");
    world
        .service
        .delete(&mut tx, &ctx(alice), &[id])
        .await
        .expect("delete succeeds");

    assert!(
        tx.find_todos(&TodoFilter::default().uuid("cancelled"))
            .await
            .expect("find")
            .is_empty()
    );
    tx.commit();
    assert_eq!(world.store.todo_count(), 0);
}

/// ## Summary
/// A recurring to-do reaches attendees together with its occurrences.
#[test_log::test(tokio::test)]
async fn occurrences_travel_with_the_copy() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let bob = world.person(BOB, None);
    let mut tx = world.store.begin();
    let body = document(&[
        "BEGIN:VTODO",
        "UID:weekly",
        "SUMMARY:Weekly sync",
        "DTSTART:20260601T100000Z",
        "RRULE:FREQ=WEEKLY;COUNT=3",
        "ORGANIZER:mailto:alice@example.com",
        "ATTENDEE;PARTSTAT=ACCEPTED:mailto:bob@example.com",
        "END:VTODO",
        "BEGIN:VTODO",
        "UID:weekly",
        "RECURRENCE-ID:20260608T100000Z",
        "SUMMARY:Weekly sync, moved",
        "END:VTODO",
    ]);

    world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("put succeeds");

    let copy = master_in(&mut tx, "weekly", bob.calendar)
        .await
        .expect("bob holds a copy");
    let occurrences = tx.occurrences_of(copy).await.expect("occurrences");
    assert_eq!(occurrences.len(), 1);
    assert_eq!(occurrences[0].recurrence, Some(at(2026, 6, 8, 10, 0)));
    assert_eq!(occurrences[0].calendar, bob.calendar);
    assert_eq!(occurrences[0].uuid, "weekly");
    assert_eq!(
        occurrences[0].summary.as_deref(),
        Some("Weekly sync, moved")
    );
}

/// ## Summary
/// Storing a second new document with a taken `UID` in the same calendar
/// fails on the uniqueness constraint.
#[test_log::test(tokio::test)]
async fn duplicate_uid_in_one_calendar_is_refused() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let mut tx = world.store.begin();
    let body = document(&["BEGIN:VTODO", "UID:once", "SUMMARY:Only once", "END:VTODO"]);

    world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("first put succeeds");
    let err = world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect_err("second put collides");
    assert!(matches!(
        err,
        ServiceError::DatabaseError(DbError::UniqueViolation(_))
    ));
}

/// ## Summary
/// Nobody writes into a calendar they do not own.
#[test_log::test(tokio::test)]
async fn put_into_foreign_calendar_is_denied() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let bob = world.person(BOB, None);
    let mut tx = world.store.begin();

    let err = world
        .service
        .put(
            &mut tx,
            &ctx(bob),
            alice.calendar,
            None,
            &organized_document("intrusion", "Not yours"),
        )
        .await
        .expect_err("bob may not write alice's calendar");
    assert!(matches!(err, ServiceError::AccessDenied(_)));
}
