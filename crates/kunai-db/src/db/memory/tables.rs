//! Table storage behind the in-memory store.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use kunai_core::constants::UUID_RECURRENCE_UNIQUE_MESSAGE;
use kunai_core::types::{
    AlarmId, AttendeeId, CalendarId, CategoryId, DateId, LocationId, RuleId, TodoId, UserId,
};

use crate::db::model::{
    Alarm, Attendee, Calendar, Category, DateRecord, Location, RuleRecord, Todo, User,
};
use crate::db::store::{AttendeeFilter, TodoFilter};
use crate::error::{DbError, DbResult};

#[derive(Debug, Clone, Default)]
pub(super) struct Tables {
    last_id: i64,
    pub users: BTreeMap<UserId, User>,
    pub calendars: BTreeMap<CalendarId, Calendar>,
    pub categories: BTreeMap<CategoryId, Category>,
    pub locations: BTreeMap<LocationId, Location>,
    pub todos: BTreeMap<TodoId, Todo>,
    pub attendees: BTreeMap<AttendeeId, Attendee>,
    pub alarms: BTreeMap<AlarmId, Alarm>,
    pub dates: BTreeMap<DateId, DateRecord>,
    pub rules: BTreeMap<RuleId, RuleRecord>,
}

fn lookup<'a, K: Ord + Copy + Into<i64>, V>(
    table: &'a BTreeMap<K, V>,
    entity: &'static str,
    id: K,
) -> DbResult<&'a V> {
    table
        .get(&id)
        .ok_or_else(|| DbError::not_found(entity, id.into()))
}

fn lookup_mut<'a, K: Ord + Copy + Into<i64>, V>(
    table: &'a mut BTreeMap<K, V>,
    entity: &'static str,
    id: K,
) -> DbResult<&'a mut V> {
    table
        .get_mut(&id)
        .ok_or_else(|| DbError::not_found(entity, id.into()))
}

impl Tables {
    /// Ids are unique across tables, which keeps them easy to tell apart in
    /// logs.
    pub fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    pub fn user(&self, id: UserId) -> DbResult<&User> {
        lookup(&self.users, "user", id)
    }

    pub fn calendar(&self, id: CalendarId) -> DbResult<&Calendar> {
        lookup(&self.calendars, "calendar", id)
    }

    pub fn category(&self, id: CategoryId) -> DbResult<&Category> {
        lookup(&self.categories, "category", id)
    }

    pub fn location(&self, id: LocationId) -> DbResult<&Location> {
        lookup(&self.locations, "location", id)
    }

    pub fn todo(&self, id: TodoId) -> DbResult<&Todo> {
        lookup(&self.todos, "todo", id)
    }

    pub fn todo_mut(&mut self, id: TodoId) -> DbResult<&mut Todo> {
        lookup_mut(&mut self.todos, "todo", id)
    }

    pub fn attendee(&self, id: AttendeeId) -> DbResult<&Attendee> {
        lookup(&self.attendees, "attendee", id)
    }

    pub fn attendee_mut(&mut self, id: AttendeeId) -> DbResult<&mut Attendee> {
        lookup_mut(&mut self.attendees, "attendee", id)
    }

    pub fn alarm(&self, id: AlarmId) -> DbResult<&Alarm> {
        lookup(&self.alarms, "alarm", id)
    }

    pub fn alarm_mut(&mut self, id: AlarmId) -> DbResult<&mut Alarm> {
        lookup_mut(&mut self.alarms, "alarm", id)
    }

    pub fn date(&self, id: DateId) -> DbResult<&DateRecord> {
        lookup(&self.dates, "date", id)
    }

    pub fn date_mut(&mut self, id: DateId) -> DbResult<&mut DateRecord> {
        lookup_mut(&mut self.dates, "date", id)
    }

    pub fn rule(&self, id: RuleId) -> DbResult<&RuleRecord> {
        lookup(&self.rules, "rule", id)
    }

    pub fn rule_mut(&mut self, id: RuleId) -> DbResult<&mut RuleRecord> {
        lookup_mut(&mut self.rules, "rule", id)
    }

    /// Email of the owner of `calendar`, if both exist.
    fn owner_email(&self, calendar: CalendarId) -> Option<&str> {
        let calendar = self.calendars.get(&calendar)?;
        self.users.get(&calendar.owner).map(|user| user.email.as_str())
    }

    fn owned_by(&self, calendar: CalendarId, emails: &[String]) -> bool {
        self.owner_email(calendar)
            .is_some_and(|email| emails.iter().any(|e| e == email))
    }

    pub fn matches_todo(&self, todo: &Todo, filter: &TodoFilter) -> bool {
        filter.uuid.as_ref().is_none_or(|uuid| *uuid == todo.uuid)
            && filter.calendar.is_none_or(|calendar| calendar == todo.calendar)
            && filter
                .owner_emails
                .as_ref()
                .is_none_or(|emails| self.owned_by(todo.calendar, emails))
            && filter.exclude.is_none_or(|id| id != todo.id)
            && filter
                .recurrence
                .is_none_or(|recurrence| recurrence == todo.recurrence)
            && filter.parent.is_none_or(|parent| parent == todo.parent)
            && (!filter.public_only || todo.classification_public())
    }

    pub fn matches_attendee(&self, attendee: &Attendee, filter: &AttendeeFilter) -> bool {
        if filter.exclude == Some(attendee.id)
            || filter
                .email
                .as_ref()
                .is_some_and(|email| *email != attendee.email)
        {
            return false;
        }
        let Some(todo) = self.todos.get(&attendee.todo) else {
            return false;
        };
        filter.todo_uuid.as_ref().is_none_or(|uuid| *uuid == todo.uuid)
            && filter
                .todo_recurrence
                .is_none_or(|recurrence| recurrence == todo.recurrence)
            && filter
                .owner_emails
                .as_ref()
                .is_none_or(|emails| self.owned_by(todo.calendar, emails))
    }

    /// ## Errors
    /// Returns `DbError::UniqueViolation` when another to-do holds the same
    /// `(uuid, calendar, recurrence)`.
    pub fn check_unique(&self, todo: &Todo) -> DbResult<()> {
        let taken = self.todos.values().any(|other| {
            other.id != todo.id
                && other.uuid == todo.uuid
                && other.calendar == todo.calendar
                && other.recurrence == todo.recurrence
        });
        if taken {
            return Err(DbError::UniqueViolation(UUID_RECURRENCE_UNIQUE_MESSAGE));
        }
        Ok(())
    }

    pub fn touch(&mut self, id: TodoId, now: NaiveDateTime) -> DbResult<()> {
        self.todo_mut(id)?.write_date = Some(now);
        Ok(())
    }

    /// Removes a to-do, its sub-records and its occurrences.
    pub fn remove_todo(&mut self, id: TodoId) -> DbResult<()> {
        self.todo(id)?;
        let occurrences: Vec<TodoId> = self
            .todos
            .values()
            .filter(|todo| todo.parent == Some(id))
            .map(|todo| todo.id)
            .collect();
        for occurrence in occurrences {
            self.remove_todo(occurrence)?;
        }
        self.attendees.retain(|_, attendee| attendee.todo != id);
        self.alarms.retain(|_, alarm| alarm.todo != id);
        self.dates.retain(|_, date| date.todo != id);
        self.rules.retain(|_, rule| rule.todo != id);
        self.todos.remove(&id);
        Ok(())
    }
}
