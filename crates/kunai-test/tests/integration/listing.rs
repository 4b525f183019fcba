use super::helpers::*;

/// ## Summary
/// A listing read inside a transaction that is later rolled back does not
/// outlive it.
#[test_log::test(tokio::test)]
async fn rolled_back_put_leaves_no_listing_entry() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let body = document(&["BEGIN:VTODO", "UID:ghost", "SUMMARY:Never stored", "END:VTODO"]);

    let mut tx = world.store.begin();
    world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("put succeeds");
    let entries = world
        .service
        .list(&mut tx, &ctx(alice), alice.calendar)
        .await
        .expect("list");
    assert_eq!(entries, vec!["ghost.ics".to_string()]);
    tx.rollback();

    let mut tx = world.store.begin();
    let entries = world
        .service
        .list(&mut tx, &ctx(alice), alice.calendar)
        .await
        .expect("list");
    assert!(entries.is_empty(), "{entries:?}");
    assert_eq!(world.store.todo_count(), 0);
}

/// ## Summary
/// A committed put is listed by later transactions, and a clean read keeps
/// serving it.
#[test_log::test(tokio::test)]
async fn committed_put_is_listed_afterwards() {
    let mut world = World::new();
    let alice = world.person(ALICE, None);
    let body = document(&["BEGIN:VTODO", "UID:kept", "SUMMARY:Stored", "END:VTODO"]);

    let mut tx = world.store.begin();
    world
        .service
        .put(&mut tx, &ctx(alice), alice.calendar, None, &body)
        .await
        .expect("put succeeds");
    tx.commit();

    for _ in 0..2 {
        let mut tx = world.store.begin();
        let entries = world
            .service
            .list(&mut tx, &ctx(alice), alice.calendar)
            .await
            .expect("list");
        assert_eq!(entries, vec!["kept.ics".to_string()]);
    }
}
