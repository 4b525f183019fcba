//! The to-do record and its scalar field patch.

use chrono::NaiveDateTime;
use kunai_core::types::{CalendarId, CategoryId, LocationId, TodoId};

use crate::db::enums::{Classification, TodoStatus};

/// A stored to-do.
///
/// Timestamps are naive wall-clock values in the server's local zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Todo {
    pub id: TodoId,
    pub uuid: String,
    pub calendar: CalendarId,
    /// Master of this occurrence. Set exactly when `recurrence` is set.
    pub parent: Option<TodoId>,
    /// Original instant of the instance this occurrence overrides.
    pub recurrence: Option<NaiveDateTime>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub percent_complete: Option<i32>,
    pub completed: Option<NaiveDateTime>,
    pub dtstart: Option<NaiveDateTime>,
    pub due: Option<NaiveDateTime>,
    pub classification: Classification,
    pub location: Option<LocationId>,
    pub categories: Vec<CategoryId>,
    /// Organizer email, without the `mailto:` scheme.
    pub organizer: Option<String>,
    pub timezone: Option<String>,
    pub sequence: i32,
    /// Last raw `VTODO` block seen for this record.
    pub vtodo: Option<String>,
    pub create_date: NaiveDateTime,
    pub write_date: Option<NaiveDateTime>,
}

impl Todo {
    /// Returns `true` for a master (a to-do that is not an occurrence).
    #[must_use]
    pub const fn is_master(&self) -> bool {
        self.parent.is_none()
    }

    #[must_use]
    pub fn classification_public(&self) -> bool {
        self.classification == Classification::Public
    }

    /// Modification time, falling back to creation time.
    #[must_use]
    pub fn last_modified(&self) -> NaiveDateTime {
        self.write_date.unwrap_or(self.create_date)
    }

    /// Applies a field patch in place. Untouched slots are left alone.
    pub fn apply(&mut self, fields: &TodoFields) {
        fn set<T: Clone>(target: &mut T, value: Option<&T>) {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }

        set(&mut self.uuid, fields.uuid.as_ref());
        set(&mut self.calendar, fields.calendar.as_ref());
        set(&mut self.parent, fields.parent.as_ref());
        set(&mut self.recurrence, fields.recurrence.as_ref());
        set(&mut self.summary, fields.summary.as_ref());
        set(&mut self.description, fields.description.as_ref());
        set(&mut self.status, fields.status.as_ref());
        set(&mut self.percent_complete, fields.percent_complete.as_ref());
        set(&mut self.completed, fields.completed.as_ref());
        set(&mut self.dtstart, fields.dtstart.as_ref());
        set(&mut self.due, fields.due.as_ref());
        set(&mut self.classification, fields.classification.as_ref());
        set(&mut self.location, fields.location.as_ref());
        set(&mut self.organizer, fields.organizer.as_ref());
        set(&mut self.timezone, fields.timezone.as_ref());
        set(&mut self.sequence, fields.sequence.as_ref());
        set(&mut self.vtodo, fields.vtodo.as_ref());
    }
}

/// Scalar field assignments for a to-do.
///
/// `None` leaves a field untouched. Nullable fields nest a second option:
/// `Some(None)` clears the field, `Some(Some(v))` sets it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoFields {
    pub uuid: Option<String>,
    pub calendar: Option<CalendarId>,
    pub parent: Option<Option<TodoId>>,
    pub recurrence: Option<Option<NaiveDateTime>>,
    pub summary: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub status: Option<Option<TodoStatus>>,
    pub percent_complete: Option<Option<i32>>,
    pub completed: Option<Option<NaiveDateTime>>,
    pub dtstart: Option<Option<NaiveDateTime>>,
    pub due: Option<Option<NaiveDateTime>>,
    pub classification: Option<Classification>,
    pub location: Option<Option<LocationId>>,
    pub organizer: Option<Option<String>>,
    pub timezone: Option<Option<String>>,
    pub sequence: Option<i32>,
    pub vtodo: Option<Option<String>>,
}

impl TodoFields {
    /// Returns `true` when no slot is touched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A fully defaulted to-do ready for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTodo {
    pub uuid: String,
    pub calendar: CalendarId,
    pub parent: Option<TodoId>,
    pub recurrence: Option<NaiveDateTime>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub status: Option<TodoStatus>,
    pub percent_complete: Option<i32>,
    pub completed: Option<NaiveDateTime>,
    pub dtstart: Option<NaiveDateTime>,
    pub due: Option<NaiveDateTime>,
    pub classification: Classification,
    pub location: Option<LocationId>,
    pub categories: Vec<CategoryId>,
    pub organizer: Option<String>,
    pub timezone: Option<String>,
    pub sequence: i32,
    pub vtodo: Option<String>,
}

impl NewTodo {
    /// ## Summary
    /// Builds an insertable to-do from the touched slots of `fields`.
    ///
    /// Slots that are not touched take their empty value; `classification`
    /// defaults to public and `sequence` to zero.
    #[must_use]
    pub fn from_fields(uuid: String, calendar: CalendarId, fields: &TodoFields) -> Self {
        Self {
            uuid,
            calendar,
            parent: fields.parent.flatten(),
            recurrence: fields.recurrence.flatten(),
            summary: fields.summary.clone().flatten(),
            description: fields.description.clone().flatten(),
            status: fields.status.flatten(),
            percent_complete: fields.percent_complete.flatten(),
            completed: fields.completed.flatten(),
            dtstart: fields.dtstart.flatten(),
            due: fields.due.flatten(),
            classification: fields.classification.unwrap_or_default(),
            location: fields.location.flatten(),
            categories: Vec::new(),
            organizer: fields.organizer.clone().flatten(),
            timezone: fields.timezone.clone().flatten(),
            sequence: fields.sequence.unwrap_or(0),
            vtodo: fields.vtodo.clone().flatten(),
        }
    }

    /// Materializes the stored record.
    #[must_use]
    pub fn into_todo(self, id: TodoId, create_date: NaiveDateTime) -> Todo {
        Todo {
            id,
            uuid: self.uuid,
            calendar: self.calendar,
            parent: self.parent,
            recurrence: self.recurrence,
            summary: self.summary,
            description: self.description,
            status: self.status,
            percent_complete: self.percent_complete,
            completed: self.completed,
            dtstart: self.dtstart,
            due: self.due,
            classification: self.classification,
            location: self.location,
            categories: self.categories,
            organizer: self.organizer,
            timezone: self.timezone,
            sequence: self.sequence,
            vtodo: self.vtodo,
            create_date,
            write_date: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 4)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn todo() -> Todo {
        NewTodo::from_fields(
            "uid-1".to_string(),
            CalendarId(1),
            &TodoFields {
                summary: Some(Some("Write report".to_string())),
                ..TodoFields::default()
            },
        )
        .into_todo(TodoId(7), at(8))
    }

    #[test]
    fn new_todo_defaults() {
        let todo = todo();
        assert_eq!(todo.sequence, 0);
        assert!(todo.classification_public());
        assert!(todo.is_master());
        assert_eq!(todo.last_modified(), at(8));
    }

    #[test]
    fn apply_sets_and_clears() {
        let mut todo = todo();
        todo.apply(&TodoFields {
            summary: Some(None),
            due: Some(Some(at(17))),
            classification: Some(Classification::Private),
            ..TodoFields::default()
        });
        assert_eq!(todo.summary, None);
        assert_eq!(todo.due, Some(at(17)));
        assert_eq!(todo.classification, Classification::Private);
        assert_eq!(todo.uuid, "uid-1");
    }

    #[test]
    fn empty_fields() {
        assert!(TodoFields::default().is_empty());
        assert!(
            !TodoFields {
                sequence: Some(1),
                ..TodoFields::default()
            }
            .is_empty()
        );
    }
}
