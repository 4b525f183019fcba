//! The persistence collaborator used by the to-do service.
//!
//! Every call runs inside the transaction the implementor stands for. The
//! store is deliberately dumb: it enforces the `(uuid, calendar,
//! recurrence)` constraint and cascades deletes, nothing else. Access
//! checks, defaults and propagation belong to the caller.

use async_trait::async_trait;
use chrono::NaiveDateTime;
use kunai_core::types::{
    AlarmId, AttendeeId, CalendarId, CategoryId, DateId, LocationId, RuleId, TodoId, UserId,
};

use super::enums::{DateKind, RuleKind};
use super::model::{
    Alarm, AlarmValues, Attendee, AttendeeUpdate, AttendeeValues, Calendar, Category, DateRecord,
    DateValues, Location, NewTodo, RuleRecord, RuleValues, Todo, TodoFields, User,
};
use crate::error::DbResult;

/// Search criteria for to-dos. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFilter {
    pub uuid: Option<String>,
    pub calendar: Option<CalendarId>,
    /// Only to-dos in calendars whose owner has one of these emails.
    pub owner_emails: Option<Vec<String>>,
    pub exclude: Option<TodoId>,
    /// `Some(None)` matches masters, `Some(Some(t))` the occurrence at `t`.
    pub recurrence: Option<Option<NaiveDateTime>>,
    pub parent: Option<Option<TodoId>>,
    pub public_only: bool,
}

impl TodoFilter {
    #[must_use]
    pub fn uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = Some(uuid.into());
        self
    }

    #[must_use]
    pub const fn calendar(mut self, calendar: CalendarId) -> Self {
        self.calendar = Some(calendar);
        self
    }

    #[must_use]
    pub fn owner_emails(mut self, emails: Vec<String>) -> Self {
        self.owner_emails = Some(emails);
        self
    }

    #[must_use]
    pub const fn excluding(mut self, id: TodoId) -> Self {
        self.exclude = Some(id);
        self
    }

    #[must_use]
    pub const fn recurrence(mut self, recurrence: Option<NaiveDateTime>) -> Self {
        self.recurrence = Some(recurrence);
        self
    }

    #[must_use]
    pub const fn parent(mut self, parent: Option<TodoId>) -> Self {
        self.parent = Some(parent);
        self
    }

    #[must_use]
    pub const fn public_only(mut self) -> Self {
        self.public_only = true;
        self
    }
}

/// Search criteria for attendees. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeFilter {
    pub email: Option<String>,
    /// Matched against the `uuid` of the owning to-do.
    pub todo_uuid: Option<String>,
    /// Matched against the `recurrence` of the owning to-do.
    pub todo_recurrence: Option<Option<NaiveDateTime>>,
    /// Owning to-do lives in a calendar owned by one of these emails.
    pub owner_emails: Option<Vec<String>>,
    pub exclude: Option<AttendeeId>,
}

/// Persistence operations needed by the to-do service.
#[async_trait]
pub trait TodoStore: Send {
    /// Whether this unit of work has changes not yet committed.
    ///
    /// Reads made while this holds reflect state other units of work can
    /// not see, so they must not be shared through process-wide caches.
    fn has_pending_changes(&self) -> bool;

    // Directory

    async fn get_user(&mut self, id: UserId) -> DbResult<User>;

    async fn get_calendar(&mut self, id: CalendarId) -> DbResult<Calendar>;

    /// Calendars whose owner has one of `emails`, in id order.
    async fn find_calendars_by_owner_emails(
        &mut self,
        emails: &[String],
    ) -> DbResult<Vec<Calendar>>;

    /// The owner of `calendar`.
    async fn calendar_owner(&mut self, calendar: CalendarId) -> DbResult<User> {
        let calendar = self.get_calendar(calendar).await?;
        self.get_user(calendar.owner).await
    }

    // Categories and locations

    async fn find_categories(&mut self, names: &[String]) -> DbResult<Vec<Category>>;

    async fn insert_category(&mut self, name: &str) -> DbResult<CategoryId>;

    async fn get_category(&mut self, id: CategoryId) -> DbResult<Category>;

    /// First location named exactly `name`.
    async fn find_location(&mut self, name: &str) -> DbResult<Option<Location>>;

    async fn insert_location(&mut self, name: &str) -> DbResult<LocationId>;

    async fn get_location(&mut self, id: LocationId) -> DbResult<Location>;

    // To-dos

    /// Ids of the matching to-dos, in id order.
    async fn find_todos(&mut self, filter: &TodoFilter) -> DbResult<Vec<TodoId>>;

    async fn get_todo(&mut self, id: TodoId) -> DbResult<Todo>;

    /// ## Errors
    /// Returns `DbError::UniqueViolation` when `(uuid, calendar, recurrence)`
    /// is already taken.
    async fn insert_todo(&mut self, todo: NewTodo, now: NaiveDateTime) -> DbResult<TodoId>;

    /// Applies `fields` and sets the modification time to `now`.
    ///
    /// ## Errors
    /// Returns `DbError::UniqueViolation` when the result collides with
    /// another to-do.
    async fn update_todo(
        &mut self,
        id: TodoId,
        fields: &TodoFields,
        now: NaiveDateTime,
    ) -> DbResult<()>;

    async fn set_categories(
        &mut self,
        id: TodoId,
        categories: Vec<CategoryId>,
        now: NaiveDateTime,
    ) -> DbResult<()>;

    /// Sets the modification time only.
    async fn touch_todo(&mut self, id: TodoId, now: NaiveDateTime) -> DbResult<()>;

    /// Deletes a to-do with its sub-records and occurrences.
    async fn delete_todo(&mut self, id: TodoId) -> DbResult<()>;

    async fn occurrences_of(&mut self, id: TodoId) -> DbResult<Vec<Todo>>;

    // Attendees

    async fn attendees_of(&mut self, todo: TodoId) -> DbResult<Vec<Attendee>>;

    async fn find_attendees(&mut self, filter: &AttendeeFilter) -> DbResult<Vec<Attendee>>;

    async fn get_attendee(&mut self, id: AttendeeId) -> DbResult<Attendee>;

    async fn insert_attendee(
        &mut self,
        todo: TodoId,
        values: &AttendeeValues,
    ) -> DbResult<AttendeeId>;

    async fn update_attendee(&mut self, id: AttendeeId, update: &AttendeeUpdate) -> DbResult<()>;

    async fn delete_attendee(&mut self, id: AttendeeId) -> DbResult<()>;

    // Alarms

    async fn alarms_of(&mut self, todo: TodoId) -> DbResult<Vec<Alarm>>;

    async fn get_alarm(&mut self, id: AlarmId) -> DbResult<Alarm>;

    async fn insert_alarm(&mut self, todo: TodoId, values: &AlarmValues) -> DbResult<AlarmId>;

    async fn update_alarm(&mut self, id: AlarmId, values: &AlarmValues) -> DbResult<()>;

    async fn delete_alarm(&mut self, id: AlarmId) -> DbResult<()>;

    // Recurrence and exception dates

    async fn dates_of(&mut self, todo: TodoId, kind: DateKind) -> DbResult<Vec<DateRecord>>;

    async fn get_date(&mut self, id: DateId) -> DbResult<DateRecord>;

    async fn insert_date(
        &mut self,
        todo: TodoId,
        kind: DateKind,
        values: &DateValues,
    ) -> DbResult<DateId>;

    async fn update_date(&mut self, id: DateId, values: &DateValues) -> DbResult<()>;

    async fn delete_date(&mut self, id: DateId) -> DbResult<()>;

    // Recurrence and exception rules

    async fn rules_of(&mut self, todo: TodoId, kind: RuleKind) -> DbResult<Vec<RuleRecord>>;

    async fn get_rule(&mut self, id: RuleId) -> DbResult<RuleRecord>;

    async fn insert_rule(
        &mut self,
        todo: TodoId,
        kind: RuleKind,
        values: &RuleValues,
    ) -> DbResult<RuleId>;

    async fn update_rule(&mut self, id: RuleId, values: &RuleValues) -> DbResult<()>;

    async fn delete_rule(&mut self, id: RuleId) -> DbResult<()>;
}
