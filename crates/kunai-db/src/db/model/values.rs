//! The diff language: field assignments plus child operations, usable
//! against either a create or an update.

use kunai_core::types::{AlarmId, AttendeeId, CategoryId, DateId, RuleId, TodoId};

use super::children::{AlarmValues, AttendeeValues, DateValues, RuleValues};
use super::todo::TodoFields;

/// One operation on a set of child records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildOp<I, V> {
    /// Create a child from values.
    Create(V),
    /// Write values onto an existing child.
    Write(I, V),
    /// Delete the listed children.
    Delete(Vec<I>),
    /// Delete every child of the set.
    DeleteAll,
}

/// Assignment of the category links of a to-do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryOp {
    Set(Vec<CategoryId>),
    UnlinkAll,
}

/// A complete change set for a to-do and its children.
///
/// Child operations are applied in order. Occurrences nest: each
/// `Create`/`Write` of an occurrence carries its own change set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoValues {
    pub fields: TodoFields,
    pub categories: Option<CategoryOp>,
    pub attendees: Vec<ChildOp<AttendeeId, AttendeeValues>>,
    pub alarms: Vec<ChildOp<AlarmId, AlarmValues>>,
    pub rdates: Vec<ChildOp<DateId, DateValues>>,
    pub exdates: Vec<ChildOp<DateId, DateValues>>,
    pub rrules: Vec<ChildOp<RuleId, RuleValues>>,
    pub exrules: Vec<ChildOp<RuleId, RuleValues>>,
    pub occurrences: Vec<ChildOp<TodoId, TodoValues>>,
}

impl TodoValues {
    #[must_use]
    pub fn from_fields(fields: TodoFields) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Returns `true` when the change set creates recurrence data: a
    /// recurrence or exception date or rule, or an occurrence.
    #[must_use]
    pub fn creates_recurrence_data(&self) -> bool {
        fn creates<I, V>(ops: &[ChildOp<I, V>]) -> bool {
            ops.iter().any(|op| matches!(op, ChildOp::Create(_)))
        }

        creates(&self.rdates)
            || creates(&self.exdates)
            || creates(&self.rrules)
            || creates(&self.exrules)
            || creates(&self.occurrences)
    }
}
