//! Create, write and delete of to-dos.

use chrono::NaiveDateTime;
use kunai_core::types::{CalendarId, TodoId};
use kunai_db::db::TodoStore;
use kunai_db::db::enums::{DateKind, RuleKind, TodoStatus};
use kunai_db::db::model::{CategoryOp, ChildOp, NewTodo, TodoFields, TodoValues};
use kunai_db::error::DbError;

use super::TodoService;
use super::children::{apply_alarms, apply_dates, apply_rules};
use crate::context::Context;
use crate::error::{ServiceError, ServiceResult};
use crate::recurrence::{validate, validate_values};

/// ## Summary
/// Fields proposed when a to-do's status changes.
///
/// Completing a to-do sets it to 100 percent and stamps `completed` with
/// `now` unless a completion time is already known. Nothing is proposed for
/// other statuses. The result is a suggestion for clients; create and write
/// never apply it on their own.
#[must_use]
pub fn on_change_status(
    status: Option<TodoStatus>,
    completed: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> TodoFields {
    let mut fields = TodoFields::default();
    if status == Some(TodoStatus::Completed) {
        fields.percent_complete = Some(Some(100));
        if completed.is_none() {
            fields.completed = Some(Some(now));
        }
    }
    fields
}

impl TodoService {
    /// ## Summary
    /// Creates a to-do with its sub-records and occurrences.
    ///
    /// `uuid` defaults to a fresh UUID and `timezone` to the acting user's
    /// preferred zone. Occurrences default to the master's `uuid` and
    /// calendar.
    ///
    /// ## Side Effects
    /// - copies the to-do into its attendees' calendars when the calendar
    ///   owner organizes it
    /// - invalidates the listing cache
    ///
    /// ## Errors
    /// - `ServiceError::ValidationError` when no calendar is given or the
    ///   master/occurrence rules are broken
    /// - `ServiceError::AccessDenied` when the user does not own the calendar
    /// - `DbError::UniqueViolation` when `(uuid, calendar, recurrence)` is taken
    #[tracing::instrument(skip(self, store, values), fields(user = %ctx.user, escalated = ctx.escalated))]
    pub async fn create(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        values: TodoValues,
    ) -> ServiceResult<TodoId> {
        let calendar = values
            .fields
            .calendar
            .ok_or_else(|| ServiceError::ValidationError("A to-do needs a calendar".to_string()))?;
        self.authorize(store, ctx, calendar).await?;
        validate_values(&values)?;

        let uuid = values
            .fields
            .uuid
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let mut fields = values.fields.clone();
        if fields.timezone.is_none() {
            fields.timezone = Some(store.get_user(ctx.user).await?.timezone);
        }

        let id = store
            .insert_todo(NewTodo::from_fields(uuid, calendar, &fields), ctx.now)
            .await?;
        tracing::debug!(%id, %calendar, "To-do created");

        self.apply_children(store, ctx, id, &values).await?;
        validate(store, id).await?;
        self.fan_out_create(store, ctx, id).await?;

        self.invalidate_cache();
        Ok(id)
    }

    /// ## Summary
    /// Writes the same change set onto each of `ids`.
    ///
    /// Any `sequence` in the change set is ignored; the stored counter of
    /// every written to-do goes up by one instead.
    ///
    /// ## Side Effects
    /// - pushes the new content into the attendees' copies and creates
    ///   copies for attendees who have none
    /// - invalidates the listing cache
    ///
    /// ## Errors
    /// - `ServiceError::AccessDenied` when the user does not own a calendar
    /// - `ServiceError::ValidationError` when the master/occurrence rules
    ///   are broken
    #[tracing::instrument(skip(self, store, values), fields(user = %ctx.user, escalated = ctx.escalated))]
    pub async fn write(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        ids: &[TodoId],
        values: TodoValues,
    ) -> ServiceResult<()> {
        for id in ids {
            let todo = store.get_todo(*id).await?;
            self.authorize(store, ctx, todo.calendar).await?;
        }
        if let Some(calendar) = values.fields.calendar {
            self.authorize(store, ctx, calendar).await?;
        }
        validate_values(&values)?;

        for id in ids {
            let current = store.get_todo(*id).await?;
            let fields = TodoFields {
                sequence: Some(current.sequence + 1),
                ..values.fields.clone()
            };
            store.update_todo(*id, &fields, ctx.now).await?;
            self.apply_children(store, ctx, *id, &values).await?;
            validate(store, *id).await?;
        }

        for id in ids {
            self.fan_out_write(store, ctx, *id).await?;
        }

        self.invalidate_cache();
        Ok(())
    }

    /// ## Summary
    /// Deletes each of `ids` with its sub-records and occurrences.
    ///
    /// ## Side Effects
    /// - the organizer's delete removes the attendees' copies
    /// - an attendee's delete marks the attendee declined on the organizer's
    ///   copy instead of touching it otherwise
    /// - invalidates the listing cache
    ///
    /// ## Errors
    /// Returns `ServiceError::AccessDenied` when the user does not own a
    /// calendar.
    #[tracing::instrument(skip(self, store), fields(user = %ctx.user, escalated = ctx.escalated))]
    pub async fn delete(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        ids: &[TodoId],
    ) -> ServiceResult<()> {
        let mut todos = Vec::with_capacity(ids.len());
        for id in ids {
            let todo = store.get_todo(*id).await?;
            self.authorize(store, ctx, todo.calendar).await?;
            todos.push(todo);
        }

        for todo in &todos {
            self.fan_out_delete(store, ctx, todo).await?;
        }

        self.invalidate_cache();
        for todo in &todos {
            // Occurrences go with their master.
            match store.delete_todo(todo.id).await {
                Ok(()) | Err(DbError::NotFound { .. }) => {}
                Err(err) => return Err(err.into()),
            }
        }
        tracing::debug!(count = todos.len(), "To-dos deleted");
        Ok(())
    }

    /// Applies the category and child operations of `values` to `id`.
    pub(super) async fn apply_children(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: TodoId,
        values: &TodoValues,
    ) -> ServiceResult<()> {
        match &values.categories {
            Some(CategoryOp::Set(categories)) => {
                store.set_categories(id, categories.clone(), ctx.now).await?;
            }
            Some(CategoryOp::UnlinkAll) => store.set_categories(id, Vec::new(), ctx.now).await?,
            None => {}
        }

        for op in &values.attendees {
            match op {
                ChildOp::Create(attendee) => {
                    self.attendee_created(store, ctx, id, attendee).await?;
                }
                ChildOp::Write(attendee, values) => {
                    self.ensure_attendees_of(store, id, &[*attendee]).await?;
                    self.attendees_written(store, ctx, &[*attendee], &values.update())
                        .await?;
                }
                ChildOp::Delete(attendees) => {
                    self.ensure_attendees_of(store, id, attendees).await?;
                    self.attendees_deleted(store, ctx, attendees).await?;
                }
                ChildOp::DeleteAll => {
                    let attendees: Vec<_> = store
                        .attendees_of(id)
                        .await?
                        .into_iter()
                        .map(|attendee| attendee.id)
                        .collect();
                    self.attendees_deleted(store, ctx, &attendees).await?;
                }
            }
        }

        let mut touched = apply_alarms(store, id, &values.alarms).await?;
        touched |= apply_dates(store, id, DateKind::Recurrence, &values.rdates).await?;
        touched |= apply_dates(store, id, DateKind::Exception, &values.exdates).await?;
        touched |= apply_rules(store, id, RuleKind::Recurrence, &values.rrules).await?;
        touched |= apply_rules(store, id, RuleKind::Exception, &values.exrules).await?;
        if touched {
            store.touch_todo(id, ctx.now).await?;
        }

        self.apply_occurrences(store, ctx, id, &values.occurrences)
            .await
    }

    async fn apply_occurrences(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        master_id: TodoId,
        ops: &[ChildOp<TodoId, TodoValues>],
    ) -> ServiceResult<()> {
        if ops.is_empty() {
            return Ok(());
        }
        let master = store.get_todo(master_id).await?;

        for op in ops {
            match op {
                ChildOp::Create(values) => {
                    let mut values = values.clone();
                    let fields = &mut values.fields;
                    fields.parent.get_or_insert(Some(master.id));
                    fields.calendar.get_or_insert(master.calendar);
                    fields.uuid.get_or_insert_with(|| master.uuid.clone());
                    Box::pin(self.create(store, ctx, values)).await?;
                }
                ChildOp::Write(occurrence, values) => {
                    self.ensure_occurrences_of(store, master.calendar, master_id, &[*occurrence])
                        .await?;
                    Box::pin(self.write(store, ctx, &[*occurrence], values.clone())).await?;
                }
                ChildOp::Delete(occurrences) => {
                    self.ensure_occurrences_of(store, master.calendar, master_id, occurrences)
                        .await?;
                    Box::pin(self.delete(store, ctx, occurrences)).await?;
                }
                ChildOp::DeleteAll => {
                    let occurrences: Vec<TodoId> = store
                        .occurrences_of(master_id)
                        .await?
                        .into_iter()
                        .map(|occurrence| occurrence.id)
                        .collect();
                    if !occurrences.is_empty() {
                        Box::pin(self.delete(store, ctx, &occurrences)).await?;
                    }
                }
            }
        }
        Ok(())
    }

    async fn ensure_occurrences_of(
        &self,
        store: &mut dyn TodoStore,
        calendar: CalendarId,
        master: TodoId,
        ids: &[TodoId],
    ) -> ServiceResult<()> {
        for id in ids {
            let occurrence = store.get_todo(*id).await?;
            if occurrence.parent != Some(master) || occurrence.calendar != calendar {
                return Err(ServiceError::ValidationError(format!(
                    "To-do {id} is not an occurrence of {master}"
                )));
            }
        }
        Ok(())
    }
}
