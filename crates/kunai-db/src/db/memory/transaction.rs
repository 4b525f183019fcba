//! Transactions over the in-memory store.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use kunai_core::types::{
    AlarmId, AttendeeId, CalendarId, CategoryId, DateId, LocationId, RuleId, TodoId, UserId,
};

use super::MemoryStore;
use super::tables::Tables;
use crate::db::enums::{DateKind, RuleKind};
use crate::db::model::{
    Alarm, AlarmValues, Attendee, AttendeeUpdate, AttendeeValues, Calendar, Category, DateRecord,
    DateValues, Location, NewTodo, RuleRecord, RuleValues, Todo, TodoFields, User,
};
use crate::db::store::{AttendeeFilter, TodoFilter, TodoStore};
use crate::error::DbResult;

/// A unit of work against a [`MemoryStore`].
///
/// Operations act on a private working copy. [`commit`](Self::commit)
/// publishes it; dropping the transaction rolls it back.
#[derive(Debug)]
pub struct MemoryTransaction<'a> {
    store: &'a mut MemoryStore,
    working: Tables,
    dirty: bool,
}

impl<'a> MemoryTransaction<'a> {
    pub(super) const fn new(store: &'a mut MemoryStore, working: Tables) -> Self {
        Self {
            store,
            working,
            dirty: false,
        }
    }

    /// Publishes every change made in this transaction.
    pub fn commit(self) {
        tracing::trace!("Committing memory transaction");
        self.store.tables = self.working;
    }

    /// Discards every change made in this transaction.
    pub fn rollback(self) {
        tracing::trace!("Rolling back memory transaction");
    }
}

#[async_trait]
impl TodoStore for MemoryTransaction<'_> {
    fn has_pending_changes(&self) -> bool {
        self.dirty
    }

    async fn get_user(&mut self, id: UserId) -> DbResult<User> {
        self.working.user(id).cloned()
    }

    async fn get_calendar(&mut self, id: CalendarId) -> DbResult<Calendar> {
        self.working.calendar(id).cloned()
    }

    async fn find_calendars_by_owner_emails(
        &mut self,
        emails: &[String],
    ) -> DbResult<Vec<Calendar>> {
        let tables = &self.working;
        Ok(tables
            .calendars
            .values()
            .filter(|calendar| {
                tables
                    .users
                    .get(&calendar.owner)
                    .is_some_and(|owner| emails.contains(&owner.email))
            })
            .cloned()
            .collect())
    }

    async fn find_categories(&mut self, names: &[String]) -> DbResult<Vec<Category>> {
        Ok(self
            .working
            .categories
            .values()
            .filter(|category| names.contains(&category.name))
            .cloned()
            .collect())
    }

    async fn insert_category(&mut self, name: &str) -> DbResult<CategoryId> {
        self.dirty = true;
        let id = CategoryId(self.working.next_id());
        self.working.categories.insert(
            id,
            Category {
                id,
                name: name.to_string(),
            },
        );
        Ok(id)
    }

    async fn get_category(&mut self, id: CategoryId) -> DbResult<Category> {
        self.working.category(id).cloned()
    }

    async fn find_location(&mut self, name: &str) -> DbResult<Option<Location>> {
        Ok(self
            .working
            .locations
            .values()
            .find(|location| location.name == name)
            .cloned())
    }

    async fn insert_location(&mut self, name: &str) -> DbResult<LocationId> {
        self.dirty = true;
        let id = LocationId(self.working.next_id());
        self.working.locations.insert(
            id,
            Location {
                id,
                name: name.to_string(),
            },
        );
        Ok(id)
    }

    async fn get_location(&mut self, id: LocationId) -> DbResult<Location> {
        self.working.location(id).cloned()
    }

    async fn find_todos(&mut self, filter: &TodoFilter) -> DbResult<Vec<TodoId>> {
        let tables = &self.working;
        Ok(tables
            .todos
            .values()
            .filter(|todo| tables.matches_todo(todo, filter))
            .map(|todo| todo.id)
            .collect())
    }

    async fn get_todo(&mut self, id: TodoId) -> DbResult<Todo> {
        self.working.todo(id).cloned()
    }

    async fn insert_todo(&mut self, todo: NewTodo, now: NaiveDateTime) -> DbResult<TodoId> {
        self.dirty = true;
        let id = TodoId(self.working.next_id());
        let todo = todo.into_todo(id, now);
        self.working.check_unique(&todo)?;
        tracing::trace!(%id, uuid = %todo.uuid, calendar = %todo.calendar, "Inserting todo");
        self.working.todos.insert(id, todo);
        Ok(id)
    }

    async fn update_todo(
        &mut self,
        id: TodoId,
        fields: &TodoFields,
        now: NaiveDateTime,
    ) -> DbResult<()> {
        self.dirty = true;
        let mut todo = self.working.todo(id)?.clone();
        todo.apply(fields);
        todo.write_date = Some(now);
        self.working.check_unique(&todo)?;
        self.working.todos.insert(id, todo);
        Ok(())
    }

    async fn set_categories(
        &mut self,
        id: TodoId,
        categories: Vec<CategoryId>,
        now: NaiveDateTime,
    ) -> DbResult<()> {
        self.dirty = true;
        let todo = self.working.todo_mut(id)?;
        todo.categories = categories;
        todo.write_date = Some(now);
        Ok(())
    }

    async fn touch_todo(&mut self, id: TodoId, now: NaiveDateTime) -> DbResult<()> {
        self.dirty = true;
        self.working.touch(id, now)
    }

    async fn delete_todo(&mut self, id: TodoId) -> DbResult<()> {
        self.dirty = true;
        tracing::trace!(%id, "Deleting todo");
        self.working.remove_todo(id)
    }

    async fn occurrences_of(&mut self, id: TodoId) -> DbResult<Vec<Todo>> {
        Ok(self
            .working
            .todos
            .values()
            .filter(|todo| todo.parent == Some(id))
            .cloned()
            .collect())
    }

    async fn attendees_of(&mut self, todo: TodoId) -> DbResult<Vec<Attendee>> {
        Ok(self
            .working
            .attendees
            .values()
            .filter(|attendee| attendee.todo == todo)
            .cloned()
            .collect())
    }

    async fn find_attendees(&mut self, filter: &AttendeeFilter) -> DbResult<Vec<Attendee>> {
        let tables = &self.working;
        Ok(tables
            .attendees
            .values()
            .filter(|attendee| tables.matches_attendee(attendee, filter))
            .cloned()
            .collect())
    }

    async fn get_attendee(&mut self, id: AttendeeId) -> DbResult<Attendee> {
        self.working.attendee(id).cloned()
    }

    async fn insert_attendee(
        &mut self,
        todo: TodoId,
        values: &AttendeeValues,
    ) -> DbResult<AttendeeId> {
        self.dirty = true;
        self.working.todo(todo)?;
        let id = AttendeeId(self.working.next_id());
        self.working.attendees.insert(
            id,
            Attendee {
                id,
                todo,
                email: values.email.clone(),
                status: values.status,
                common_name: values.common_name.clone(),
                role: values.role.clone(),
            },
        );
        Ok(id)
    }

    async fn update_attendee(&mut self, id: AttendeeId, update: &AttendeeUpdate) -> DbResult<()> {
        self.dirty = true;
        update.apply(self.working.attendee_mut(id)?);
        Ok(())
    }

    async fn delete_attendee(&mut self, id: AttendeeId) -> DbResult<()> {
        self.dirty = true;
        self.working.attendee(id)?;
        self.working.attendees.remove(&id);
        Ok(())
    }

    async fn alarms_of(&mut self, todo: TodoId) -> DbResult<Vec<Alarm>> {
        Ok(self
            .working
            .alarms
            .values()
            .filter(|alarm| alarm.todo == todo)
            .cloned()
            .collect())
    }

    async fn get_alarm(&mut self, id: AlarmId) -> DbResult<Alarm> {
        self.working.alarm(id).cloned()
    }

    async fn insert_alarm(&mut self, todo: TodoId, values: &AlarmValues) -> DbResult<AlarmId> {
        self.dirty = true;
        self.working.todo(todo)?;
        let id = AlarmId(self.working.next_id());
        self.working.alarms.insert(
            id,
            Alarm {
                id,
                todo,
                valarm: values.valarm.clone(),
            },
        );
        Ok(id)
    }

    async fn update_alarm(&mut self, id: AlarmId, values: &AlarmValues) -> DbResult<()> {
        self.dirty = true;
        self.working.alarm_mut(id)?.valarm.clone_from(&values.valarm);
        Ok(())
    }

    async fn delete_alarm(&mut self, id: AlarmId) -> DbResult<()> {
        self.dirty = true;
        self.working.alarm(id)?;
        self.working.alarms.remove(&id);
        Ok(())
    }

    async fn dates_of(&mut self, todo: TodoId, kind: DateKind) -> DbResult<Vec<DateRecord>> {
        Ok(self
            .working
            .dates
            .values()
            .filter(|date| date.todo == todo && date.kind == kind)
            .cloned()
            .collect())
    }

    async fn get_date(&mut self, id: DateId) -> DbResult<DateRecord> {
        self.working.date(id).cloned()
    }

    async fn insert_date(
        &mut self,
        todo: TodoId,
        kind: DateKind,
        values: &DateValues,
    ) -> DbResult<DateId> {
        self.dirty = true;
        self.working.todo(todo)?;
        let id = DateId(self.working.next_id());
        self.working.dates.insert(
            id,
            DateRecord {
                id,
                todo,
                kind,
                values: *values,
            },
        );
        Ok(id)
    }

    async fn update_date(&mut self, id: DateId, values: &DateValues) -> DbResult<()> {
        self.dirty = true;
        self.working.date_mut(id)?.values = *values;
        Ok(())
    }

    async fn delete_date(&mut self, id: DateId) -> DbResult<()> {
        self.dirty = true;
        self.working.date(id)?;
        self.working.dates.remove(&id);
        Ok(())
    }

    async fn rules_of(&mut self, todo: TodoId, kind: RuleKind) -> DbResult<Vec<RuleRecord>> {
        Ok(self
            .working
            .rules
            .values()
            .filter(|rule| rule.todo == todo && rule.kind == kind)
            .cloned()
            .collect())
    }

    async fn get_rule(&mut self, id: RuleId) -> DbResult<RuleRecord> {
        self.working.rule(id).cloned()
    }

    async fn insert_rule(
        &mut self,
        todo: TodoId,
        kind: RuleKind,
        values: &RuleValues,
    ) -> DbResult<RuleId> {
        self.dirty = true;
        self.working.todo(todo)?;
        let id = RuleId(self.working.next_id());
        self.working.rules.insert(
            id,
            RuleRecord {
                id,
                todo,
                kind,
                values: values.clone(),
            },
        );
        Ok(id)
    }

    async fn update_rule(&mut self, id: RuleId, values: &RuleValues) -> DbResult<()> {
        self.dirty = true;
        self.working.rule_mut(id)?.values.clone_from(values);
        Ok(())
    }

    async fn delete_rule(&mut self, id: RuleId) -> DbResult<()> {
        self.dirty = true;
        self.working.rule(id)?;
        self.working.rules.remove(&id);
        Ok(())
    }
}
