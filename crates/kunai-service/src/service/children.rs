//! Sub-record operations: attendees, alarms, recurrence dates and rules.
//!
//! Every change refreshes the owning to-do's modification time. Attendee
//! changes on an organizer's to-do are mirrored onto the attendees' copies.

use kunai_core::types::{AlarmId, AttendeeId, DateId, RuleId, TodoId};
use kunai_db::db::enums::{DateKind, PartStat, RuleKind};
use kunai_db::db::model::{
    AlarmValues, AttendeeUpdate, AttendeeValues, ChildOp, DateValues, RuleValues, Todo,
};
use kunai_db::db::{AttendeeFilter, TodoStore};

use super::TodoService;
use super::fanout::{effective_organizer, emails, organizer_attendees, siblings_filter};
use crate::context::Context;
use crate::error::{ServiceError, ServiceResult};
use crate::recurrence::validate;

fn foreign_child(kind: &str, id: i64, todo: TodoId) -> ServiceError {
    ServiceError::ValidationError(format!("{kind} {id} does not belong to to-do {todo}"))
}

/// Applies alarm operations to `todo`. Returns `true` when anything ran.
pub(super) async fn apply_alarms(
    store: &mut dyn TodoStore,
    todo: TodoId,
    ops: &[ChildOp<AlarmId, AlarmValues>],
) -> ServiceResult<bool> {
    for op in ops {
        match op {
            ChildOp::Create(values) => {
                store.insert_alarm(todo, values).await?;
            }
            ChildOp::Write(id, values) => {
                if store.get_alarm(*id).await?.todo != todo {
                    return Err(foreign_child("Alarm", id.get(), todo));
                }
                store.update_alarm(*id, values).await?;
            }
            ChildOp::Delete(ids) => {
                for id in ids {
                    if store.get_alarm(*id).await?.todo != todo {
                        return Err(foreign_child("Alarm", id.get(), todo));
                    }
                    store.delete_alarm(*id).await?;
                }
            }
            ChildOp::DeleteAll => {
                for alarm in store.alarms_of(todo).await? {
                    store.delete_alarm(alarm.id).await?;
                }
            }
        }
    }
    Ok(!ops.is_empty())
}

/// Applies date operations of one `kind` to `todo`. Returns `true` when
/// anything ran.
pub(super) async fn apply_dates(
    store: &mut dyn TodoStore,
    todo: TodoId,
    kind: DateKind,
    ops: &[ChildOp<DateId, DateValues>],
) -> ServiceResult<bool> {
    for op in ops {
        match op {
            ChildOp::Create(values) => {
                store.insert_date(todo, kind, values).await?;
            }
            ChildOp::Write(id, values) => {
                let record = store.get_date(*id).await?;
                if record.todo != todo || record.kind != kind {
                    return Err(foreign_child("Date", id.get(), todo));
                }
                store.update_date(*id, values).await?;
            }
            ChildOp::Delete(ids) => {
                for id in ids {
                    let record = store.get_date(*id).await?;
                    if record.todo != todo || record.kind != kind {
                        return Err(foreign_child("Date", id.get(), todo));
                    }
                    store.delete_date(*id).await?;
                }
            }
            ChildOp::DeleteAll => {
                for record in store.dates_of(todo, kind).await? {
                    store.delete_date(record.id).await?;
                }
            }
        }
    }
    Ok(!ops.is_empty())
}

/// Applies rule operations of one `kind` to `todo`. Returns `true` when
/// anything ran.
pub(super) async fn apply_rules(
    store: &mut dyn TodoStore,
    todo: TodoId,
    kind: RuleKind,
    ops: &[ChildOp<RuleId, RuleValues>],
) -> ServiceResult<bool> {
    for op in ops {
        match op {
            ChildOp::Create(values) => {
                store.insert_rule(todo, kind, values).await?;
            }
            ChildOp::Write(id, values) => {
                let record = store.get_rule(*id).await?;
                if record.todo != todo || record.kind != kind {
                    return Err(foreign_child("Rule", id.get(), todo));
                }
                store.update_rule(*id, values).await?;
            }
            ChildOp::Delete(ids) => {
                for id in ids {
                    let record = store.get_rule(*id).await?;
                    if record.todo != todo || record.kind != kind {
                        return Err(foreign_child("Rule", id.get(), todo));
                    }
                    store.delete_rule(*id).await?;
                }
            }
            ChildOp::DeleteAll => {
                for record in store.rules_of(todo, kind).await? {
                    store.delete_rule(record.id).await?;
                }
            }
        }
    }
    Ok(!ops.is_empty())
}

impl TodoService {
    /// ## Summary
    /// Adds an attendee to a to-do.
    ///
    /// ## Side Effects
    /// On an organizer's to-do the attendee is also added to every
    /// attendee's copy.
    ///
    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    #[tracing::instrument(skip(self, store, values), fields(user = %ctx.user, email = %values.email))]
    pub async fn create_attendee(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo: TodoId,
        values: AttendeeValues,
    ) -> ServiceResult<AttendeeId> {
        let owner = store.get_todo(todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        let id = self.attendee_created(store, ctx, todo, &values).await?;
        self.invalidate_cache();
        Ok(id)
    }

    /// ## Summary
    /// Updates an attendee. The email of an attendee never changes.
    ///
    /// ## Side Effects
    /// On an organizer's to-do the same-email attendee on every copy gets
    /// the new values.
    ///
    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    #[tracing::instrument(skip(self, store, update), fields(user = %ctx.user))]
    pub async fn write_attendee(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: AttendeeId,
        update: AttendeeUpdate,
    ) -> ServiceResult<()> {
        let attendee = store.get_attendee(id).await?;
        let owner = store.get_todo(attendee.todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        self.attendees_written(store, ctx, &[id], &update).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// ## Summary
    /// Removes an attendee from a to-do.
    ///
    /// ## Side Effects
    /// - on an organizer's to-do the same-email attendee is removed from
    ///   every copy
    /// - removing oneself from an attendee's copy marks the organizer's
    ///   entry for that attendee declined
    ///
    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    #[tracing::instrument(skip(self, store), fields(user = %ctx.user))]
    pub async fn delete_attendee(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: AttendeeId,
    ) -> ServiceResult<()> {
        let attendee = store.get_attendee(id).await?;
        let owner = store.get_todo(attendee.todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        self.attendees_deleted(store, ctx, &[id]).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    pub async fn create_alarm(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo: TodoId,
        values: AlarmValues,
    ) -> ServiceResult<AlarmId> {
        let owner = store.get_todo(todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(todo, ctx.now).await?;
        let id = store.insert_alarm(todo, &values).await?;
        self.invalidate_cache();
        Ok(id)
    }

    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    pub async fn write_alarm(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: AlarmId,
        values: AlarmValues,
    ) -> ServiceResult<()> {
        let alarm = store.get_alarm(id).await?;
        let owner = store.get_todo(alarm.todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(owner.id, ctx.now).await?;
        store.update_alarm(id, &values).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    pub async fn delete_alarm(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: AlarmId,
    ) -> ServiceResult<()> {
        let alarm = store.get_alarm(id).await?;
        let owner = store.get_todo(alarm.todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(owner.id, ctx.now).await?;
        store.delete_alarm(id).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// ## Summary
    /// Adds a recurrence or exception date to a to-do.
    ///
    /// ## Errors
    /// - `ServiceError::AccessDenied` when the user does not own the
    ///   to-do's calendar
    /// - `ServiceError::ValidationError` when the to-do is an occurrence
    pub async fn create_date(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo: TodoId,
        kind: DateKind,
        values: DateValues,
    ) -> ServiceResult<DateId> {
        let owner = store.get_todo(todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(todo, ctx.now).await?;
        let id = store.insert_date(todo, kind, &values).await?;
        validate(store, todo).await?;
        self.invalidate_cache();
        Ok(id)
    }

    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    pub async fn write_date(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: DateId,
        values: DateValues,
    ) -> ServiceResult<()> {
        let record = store.get_date(id).await?;
        let owner = store.get_todo(record.todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(owner.id, ctx.now).await?;
        store.update_date(id, &values).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    pub async fn delete_date(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: DateId,
    ) -> ServiceResult<()> {
        let record = store.get_date(id).await?;
        let owner = store.get_todo(record.todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(owner.id, ctx.now).await?;
        store.delete_date(id).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// ## Summary
    /// Adds a recurrence or exception rule to a to-do.
    ///
    /// ## Errors
    /// - `ServiceError::AccessDenied` when the user does not own the
    ///   to-do's calendar
    /// - `ServiceError::ValidationError` when the to-do is an occurrence
    pub async fn create_rule(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo: TodoId,
        kind: RuleKind,
        values: RuleValues,
    ) -> ServiceResult<RuleId> {
        let owner = store.get_todo(todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(todo, ctx.now).await?;
        let id = store.insert_rule(todo, kind, &values).await?;
        validate(store, todo).await?;
        self.invalidate_cache();
        Ok(id)
    }

    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    pub async fn write_rule(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: RuleId,
        values: RuleValues,
    ) -> ServiceResult<()> {
        let record = store.get_rule(id).await?;
        let owner = store.get_todo(record.todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(owner.id, ctx.now).await?;
        store.update_rule(id, &values).await?;
        self.invalidate_cache();
        Ok(())
    }

    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own the
    /// to-do's calendar.
    pub async fn delete_rule(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: RuleId,
    ) -> ServiceResult<()> {
        let record = store.get_rule(id).await?;
        let owner = store.get_todo(record.todo).await?;
        self.authorize(store, ctx, owner.calendar).await?;
        store.touch_todo(owner.id, ctx.now).await?;
        store.delete_rule(id).await?;
        self.invalidate_cache();
        Ok(())
    }

    pub(super) async fn ensure_attendees_of(
        &self,
        store: &mut dyn TodoStore,
        todo: TodoId,
        ids: &[AttendeeId],
    ) -> ServiceResult<()> {
        for id in ids {
            if store.get_attendee(*id).await?.todo != todo {
                return Err(foreign_child("Attendee", id.get(), todo));
            }
        }
        Ok(())
    }

    /// ## Summary
    /// Inserts an attendee and copies it onto the organizer's sibling
    /// copies.
    pub(super) async fn attendee_created(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo_id: TodoId,
        values: &AttendeeValues,
    ) -> ServiceResult<AttendeeId> {
        store.touch_todo(todo_id, ctx.now).await?;
        let id = store.insert_attendee(todo_id, values).await?;

        let todo = store.get_todo(todo_id).await?;
        if let Some(attendees) = organizer_attendees(store, &todo).await? {
            let siblings = store
                .find_todos(&siblings_filter(&todo, emails(&attendees)))
                .await?;
            for sibling in siblings {
                tracing::trace!(%sibling, email = %values.email, "Copying attendee to sibling");
                store.touch_todo(sibling, ctx.now).await?;
                store.insert_attendee(sibling, values).await?;
            }
        }
        Ok(id)
    }

    /// ## Summary
    /// Updates attendees and mirrors the result onto the same-email
    /// attendees of the organizer's sibling copies.
    pub(super) async fn attendees_written(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        ids: &[AttendeeId],
        update: &AttendeeUpdate,
    ) -> ServiceResult<()> {
        for id in ids {
            let attendee = store.get_attendee(*id).await?;
            store.touch_todo(attendee.todo, ctx.now).await?;
            store.update_attendee(*id, update).await?;
        }

        for id in ids {
            let attendee = store.get_attendee(*id).await?;
            let todo = store.get_todo(attendee.todo).await?;
            let Some(attendees) = organizer_attendees(store, &todo).await? else {
                continue;
            };
            let mirrors = store
                .find_attendees(&AttendeeFilter {
                    email: Some(attendee.email.clone()),
                    todo_uuid: Some(todo.uuid.clone()),
                    todo_recurrence: Some(todo.recurrence),
                    owner_emails: Some(emails(&attendees)),
                    exclude: Some(attendee.id),
                })
                .await?;
            let mirrored = attendee.values().update();
            for mirror in mirrors {
                store.touch_todo(mirror.todo, ctx.now).await?;
                store.update_attendee(mirror.id, &mirrored).await?;
            }
        }
        Ok(())
    }

    /// ## Summary
    /// Deletes attendees.
    ///
    /// On an organizer's to-do the same-email attendees of the sibling
    /// copies go too. An attendee removing themselves from their own copy
    /// is marked declined on the organizer's copy instead.
    pub(super) async fn attendees_deleted(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        ids: &[AttendeeId],
    ) -> ServiceResult<()> {
        for id in ids {
            let attendee = store.get_attendee(*id).await?;
            let todo = store.get_todo(attendee.todo).await?;
            store.touch_todo(todo.id, ctx.now).await?;

            if let Some(attendees) = organizer_attendees(store, &todo).await? {
                let mirrors = store
                    .find_attendees(&AttendeeFilter {
                        email: Some(attendee.email.clone()),
                        todo_uuid: Some(todo.uuid.clone()),
                        todo_recurrence: Some(todo.recurrence),
                        owner_emails: Some(emails(&attendees)),
                        exclude: Some(attendee.id),
                    })
                    .await?;
                for mirror in mirrors {
                    store.touch_todo(mirror.todo, ctx.now).await?;
                    store.delete_attendee(mirror.id).await?;
                }
            } else {
                self.decline_on_organizer_copy(store, ctx, &todo, &attendee.email)
                    .await?;
            }

            store.delete_attendee(attendee.id).await?;
        }
        Ok(())
    }

    /// Marks `email` declined on the organizer's copy of `todo`, when
    /// `email` is the owner of the calendar holding `todo`.
    async fn decline_on_organizer_copy(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        todo: &Todo,
        email: &str,
    ) -> ServiceResult<()> {
        let Some(organizer) = effective_organizer(store, todo).await? else {
            return Ok(());
        };
        let owner = store.calendar_owner(todo.calendar).await?;
        if owner.email != email {
            return Ok(());
        }

        let declined: Vec<AttendeeId> = store
            .find_attendees(&AttendeeFilter {
                email: Some(email.to_string()),
                todo_uuid: Some(todo.uuid.clone()),
                todo_recurrence: Some(todo.recurrence),
                owner_emails: Some(vec![organizer]),
                ..AttendeeFilter::default()
            })
            .await?
            .into_iter()
            .map(|attendee| attendee.id)
            .collect();
        if !declined.is_empty() {
            tracing::debug!(%email, "Attendee left, declining on organizer's copy");
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
}
