//! iCalendar serialization.

pub mod escape;
mod fold;
mod serializer;

pub use fold::fold_line;
pub use serializer::{serialize, serialize_component, serialize_property};
