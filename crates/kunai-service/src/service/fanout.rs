//! Attendee fan-out.
//!
//! When the owner of a calendar organizes a to-do, every attendee gets a
//! copy in their own calendar. The copies share the organizer's `uuid` and
//! are kept in step on write and delete. All sibling changes run escalated
//! and inside the caller's transaction.

use kunai_core::types::{AttendeeId, TodoId};
use kunai_db::db::enums::{DateKind, PartStat, RuleKind};
use kunai_db::db::model::{Attendee, AttendeeUpdate, ChildOp, Todo, TodoFields, TodoValues};
use kunai_db::db::{TodoFilter, TodoStore};

use super::{DuplicateDefaults, TodoService};
use crate::context::Context;
use crate::error::ServiceResult;

/// ## Summary
/// Attendees the fan-out works from, when `todo` is held by its organizer.
///
/// A to-do is held by its organizer when `organizer` is the email of its
/// calendar's owner. An occurrence is also held when that is true of its
/// master, in which case the master's attendees are returned.
///
/// Returns `None` when nobody in the role holds the to-do.
pub(super) async fn organizer_attendees(
    store: &mut dyn TodoStore,
    todo: &Todo,
) -> ServiceResult<Option<Vec<Attendee>>> {
    let owner = store.calendar_owner(todo.calendar).await?;
    if todo.organizer.as_deref() == Some(owner.email.as_str()) {
        return Ok(Some(store.attendees_of(todo.id).await?));
    }
    if let Some(parent_id) = todo.parent {
        let parent = store.get_todo(parent_id).await?;
        let parent_owner = store.calendar_owner(parent.calendar).await?;
        if parent.organizer.as_deref() == Some(parent_owner.email.as_str()) {
            return Ok(Some(store.attendees_of(parent.id).await?));
        }
    }
    Ok(None)
}

/// The organizer of `todo`, falling back to its master's.
pub(super) async fn effective_organizer(
    store: &mut dyn TodoStore,
    todo: &Todo,
) -> ServiceResult<Option<String>> {
    if let Some(organizer) = todo.organizer.as_deref().filter(|o| !o.is_empty()) {
        return Ok(Some(organizer.to_string()));
    }
    match todo.parent {
        Some(parent) => Ok(store
            .get_todo(parent)
            .await?
            .organizer
            .filter(|o| !o.is_empty())),
        None => Ok(None),
    }
}

/// Emails of the attendees, deduplicated, in attendee order.
pub(super) fn emails<'a>(attendees: impl IntoIterator<Item = &'a Attendee>) -> Vec<String> {
    let mut emails: Vec<String> = Vec::new();
    for attendee in attendees {
        if !emails.contains(&attendee.email) {
            emails.push(attendee.email.clone());
        }
    }
    emails
}

/// Filter for the copies of `todo` held in calendars owned by `emails`.
pub(super) fn siblings_filter(todo: &Todo, emails: Vec<String>) -> TodoFilter {
    TodoFilter::default()
        .uuid(todo.uuid.clone())
        .owner_emails(emails)
        .excluding(todo.id)
        .recurrence(todo.recurrence)
}

/// Non-declined attendees other than the owner of the to-do's own calendar.
async fn copy_targets(
    store: &mut dyn TodoStore,
    todo: &Todo,
    attendees: &[Attendee],
) -> ServiceResult<Vec<String>> {
    let owner = store.calendar_owner(todo.calendar).await?;
    let mut targets = emails(attendees.iter().filter(|a| !a.is_declined()));
    targets.retain(|email| *email != owner.email);
    Ok(targets)
}

/// ## Summary
/// The content of `todo` pushed into its sibling copies.
///
/// Attendees, alarms and categories of the copies are left alone; the
/// recurrence sets are replaced.
async fn sibling_update(store: &mut dyn TodoStore, todo: &Todo) -> ServiceResult<TodoValues> {
    let mut values = TodoValues::from_fields(TodoFields {
        summary: Some(todo.summary.clone()),
        description: Some(todo.description.clone()),
        dtstart: Some(todo.dtstart),
        percent_complete: Some(todo.percent_complete),
        completed: Some(todo.completed),
        location: Some(todo.location),
        status: Some(todo.status),
        organizer: Some(todo.organizer.clone()),
        ..TodoFields::default()
    });

    values.rdates.push(ChildOp::DeleteAll);
    for record in store.dates_of(todo.id, DateKind::Recurrence).await? {
        values.rdates.push(ChildOp::Create(record.values));
    }
    values.exdates.push(ChildOp::DeleteAll);
    for record in store.dates_of(todo.id, DateKind::Exception).await? {
        values.exdates.push(ChildOp::Create(record.values));
    }
    values.rrules.push(ChildOp::DeleteAll);
    for record in store.rules_of(todo.id, RuleKind::Recurrence).await? {
        values.rrules.push(ChildOp::Create(record.values));
    }
    values.exrules.push(ChildOp::DeleteAll);
    for record in store.rules_of(todo.id, RuleKind::Exception).await? {
        values.exrules.push(ChildOp::Create(record.values));
    }
    Ok(values)
}

impl TodoService {
    /// ## Summary
    /// Copies a freshly created to-do into its attendees' calendars.
    ///
    /// Declined attendees get no copy.
    pub(super) async fn fan_out_create(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: TodoId,
    ) -> ServiceResult<()> {
        let todo = store.get_todo(id).await?;
        let Some(attendees) = organizer_attendees(store, &todo).await? else {
            return Ok(());
        };
        let targets = copy_targets(store, &todo, &attendees).await?;
        if targets.is_empty() {
            return Ok(());
        }
        tracing::debug!(%id, targets = targets.len(), "Fanning out created to-do");
        self.copy_to_attendees(store, ctx, &todo, &targets).await
    }

    /// ## Summary
    /// Pushes a written to-do into its sibling copies, then copies it to
    /// attendees who do not hold one yet.
    pub(super) async fn fan_out_write(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: TodoId,
    ) -> ServiceResult<()> {
        let todo = store.get_todo(id).await?;
        let Some(attendees) = organizer_attendees(store, &todo).await? else {
            return Ok(());
        };
        let mut targets = copy_targets(store, &todo, &attendees).await?;
        if targets.is_empty() {
            return Ok(());
        }

        let siblings = store
            .find_todos(&siblings_filter(&todo, targets.clone()))
            .await?;
        for sibling in &siblings {
            let sibling = store.get_todo(*sibling).await?;
            let owner = store.calendar_owner(sibling.calendar).await?;
            targets.retain(|email| *email != owner.email);
        }
        if !siblings.is_empty() {
            tracing::debug!(%id, siblings = siblings.len(), "Updating sibling copies");
            let update = sibling_update(store, &todo).await?;
            Box::pin(self.write(store, &ctx.sudo(), &siblings, update)).await?;
        }

        if !targets.is_empty() {
            tracing::debug!(%id, targets = targets.len(), "Copying to attendees without a copy");
            self.copy_to_attendees(store, ctx, &todo, &targets).await?;
        }
        Ok(())
    }

    /// ## Summary
    /// Handles the copies of a to-do that is about to be deleted.
    ///
    /// The organizer's delete removes every attendee's copy. An attendee's
    /// delete instead marks that attendee declined on the organizer's copy.
    pub(super) async fn fan_out_delete(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo: &Todo,
    ) -> ServiceResult<()> {
        if let Some(attendees) = organizer_attendees(store, todo).await? {
            let targets = emails(&attendees);
            if targets.is_empty() {
                return Ok(());
            }
            let siblings = store.find_todos(&siblings_filter(todo, targets)).await?;
            if !siblings.is_empty() {
                tracing::debug!(id = %todo.id, siblings = siblings.len(), "Deleting sibling copies");
                Box::pin(self.delete(store, &ctx.sudo(), &siblings)).await?;
            }
            return Ok(());
        }

        let Some(organizer) = effective_organizer(store, todo).await? else {
            return Ok(());
        };
        let copies = store
            .find_todos(&siblings_filter(todo, vec![organizer]))
            .await?;
        let Some(&copy) = copies.first() else {
            return Ok(());
        };

        let owner = store.calendar_owner(todo.calendar).await?;
        let declined: Vec<AttendeeId> = store
            .attendees_of(copy)
            .await?
            .into_iter()
            .filter(|attendee| attendee.email == owner.email)
            .map(|attendee| attendee.id)
            .collect();
        if !declined.is_empty() {
            tracing::debug!(id = %todo.id, organizer_copy = %copy, "Declining on organizer's copy");
            self.attendees_written(
                store,
                &ctx.sudo(),
                &declined,
                &AttendeeUpdate::status(PartStat::Declined),
            )
            .await?;
        }
        Ok(())
    }

    /// ## Summary
    /// Creates copies of `todo` in the calendars owned by `emails`.
    ///
    /// A master is duplicated with its occurrences. An occurrence is
    /// duplicated under each attendee's copy of its master.
    async fn copy_to_attendees(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo: &Todo,
        emails: &[String],
    ) -> ServiceResult<()> {
        let sudo = ctx.sudo();
        if todo.recurrence.is_none() {
            let calendars = store.find_calendars_by_owner_emails(emails).await?;
            for calendar in calendars {
                if calendar.id == todo.calendar {
                    continue;
                }
                let defaults = DuplicateDefaults {
                    calendar: Some(calendar.id),
                    uuid: Some(todo.uuid.clone()),
                    occurrences: true,
                    ..DuplicateDefaults::default()
                };
                Box::pin(self.duplicate(store, &sudo, todo.id, defaults)).await?;
            }
            return Ok(());
        }

        let masters = store
            .find_todos(
                &TodoFilter::default()
                    .uuid(todo.uuid.clone())
                    .owner_emails(emails.to_vec())
                    .excluding(todo.id)
                    .recurrence(None),
            )
            .await?;
        for master_id in masters {
            let master = store.get_todo(master_id).await?;
            let defaults = DuplicateDefaults {
                calendar: Some(master.calendar),
                parent: Some(Some(master.id)),
                uuid: Some(todo.uuid.clone()),
                occurrences: false,
            };
            Box::pin(self.duplicate(store, &sudo, todo.id, defaults)).await?;
        }
        Ok(())
    }
}
