//! Duplication of to-dos.

use kunai_core::types::{CalendarId, TodoId};
use kunai_db::db::TodoStore;
use kunai_db::db::enums::{DateKind, RuleKind};
use kunai_db::db::model::{AlarmValues, CategoryOp, ChildOp, Todo, TodoFields, TodoValues};

use super::TodoService;
use crate::context::Context;
use crate::error::ServiceResult;

/// Overrides for a duplicated to-do. Unset slots copy the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateDefaults {
    pub calendar: Option<CalendarId>,
    pub parent: Option<Option<TodoId>>,
    /// Keeps a `uuid` instead of generating a fresh one.
    pub uuid: Option<String>,
    /// Also duplicate the occurrences, re-parented under the copy.
    pub occurrences: bool,
}

/// Every field of `todo` as a create change set.
fn copied_fields(todo: &Todo) -> TodoFields {
    TodoFields {
        uuid: Some(todo.uuid.clone()),
        calendar: Some(todo.calendar),
        parent: Some(todo.parent),
        recurrence: Some(todo.recurrence),
        summary: Some(todo.summary.clone()),
        description: Some(todo.description.clone()),
        status: Some(todo.status),
        percent_complete: Some(todo.percent_complete),
        completed: Some(todo.completed),
        dtstart: Some(todo.dtstart),
        due: Some(todo.due),
        classification: Some(todo.classification),
        location: Some(todo.location),
        organizer: Some(todo.organizer.clone()),
        timezone: Some(todo.timezone.clone()),
        sequence: Some(todo.sequence),
        vtodo: Some(todo.vtodo.clone()),
    }
}

impl TodoService {
    /// ## Summary
    /// Copies a to-do with its categories and sub-records.
    ///
    /// The copy gets a fresh `uuid` unless `defaults.uuid` is given.
    /// Occurrences are copied only when asked for, and always share the
    /// copy's `uuid`.
    ///
    /// ## Side Effects
    /// The copy is created through [`TodoService::create`], so it fans out
    /// like any other new to-do.
    ///
    /// ## Errors
    /// - `ServiceError::AccessDenied` when the user may not read the source
    ///   or write the target calendar
    /// - `DbError::UniqueViolation` when the copy collides with a stored
    ///   to-do
    #[tracing::instrument(skip(self, store, defaults), fields(user = %ctx.user, escalated = ctx.escalated))]
    pub async fn duplicate(
        &self,
        store: &mut dyn TodoStore,
        ctx: &Context,
        id: TodoId,
        defaults: DuplicateDefaults,
    ) -> ServiceResult<TodoId> {
        let source = store.get_todo(id).await?;
        self.authorize(store, ctx, source.calendar).await?;

        let uuid = defaults
            .uuid
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let calendar = defaults.calendar.unwrap_or(source.calendar);

        let mut fields = copied_fields(&source);
        fields.uuid = Some(uuid.clone());
        fields.calendar = Some(calendar);
        if let Some(parent) = defaults.parent {
            fields.parent = Some(parent);
        }

        let mut values = TodoValues::from_fields(fields);
        values.categories = Some(CategoryOp::Set(source.categories.clone()));
        values.attendees = store
            .attendees_of(id)
            .await?
            .iter()
            .map(|attendee| ChildOp::Create(attendee.values()))
            .collect();
        values.alarms = store
            .alarms_of(id)
            .await?
            .into_iter()
            .map(|alarm| ChildOp::Create(AlarmValues { valarm: alarm.valarm }))
            .collect();
        for (kind, ops) in [
            (DateKind::Recurrence, &mut values.rdates),
            (DateKind::Exception, &mut values.exdates),
        ] {
            for record in store.dates_of(id, kind).await? {
                ops.push(ChildOp::Create(record.values));
            }
        }
        for (kind, ops) in [
            (RuleKind::Recurrence, &mut values.rrules),
            (RuleKind::Exception, &mut values.exrules),
        ] {
            for record in store.rules_of(id, kind).await? {
                ops.push(ChildOp::Create(record.values));
            }
        }

        let copy = Box::pin(self.create(store, ctx, values)).await?;
        tracing::debug!(source = %id, %copy, %calendar, "To-do duplicated");

        if defaults.occurrences {
            for occurrence in store.occurrences_of(id).await? {
                let defaults = DuplicateDefaults {
                    calendar: Some(calendar),
                    parent: Some(Some(copy)),
                    uuid: Some(uuid.clone()),
                    occurrences: false,
                };
                Box::pin(self.duplicate(store, ctx, occurrence.id, defaults)).await?;
            }
        }
        Ok(copy)
    }
}
