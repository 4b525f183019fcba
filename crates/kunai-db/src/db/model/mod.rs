//! Stored records and the diff language used to change them.

pub mod children;
pub mod directory;
pub mod todo;
pub mod values;

pub use children::{
    Alarm, AlarmValues, Attendee, AttendeeUpdate, AttendeeValues, DateRecord, DateValues,
    RuleRecord, RuleValues,
};
pub use directory::{Calendar, Category, Location, User};
pub use todo::{NewTodo, Todo, TodoFields};
pub use values::{CategoryOp, ChildOp, TodoValues};
