//! Core iCalendar types.

mod component;
mod datetime;
mod parameter;
mod property;
mod value;

pub use component::{Component, ComponentKind, ICalendar};
pub use datetime::{DateOrDateTime, DateTime, DateTimeForm};
pub use parameter::Parameter;
pub use property::{ContentLine, Property, names};
pub use value::Value;
