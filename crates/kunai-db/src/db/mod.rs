pub mod enums;
pub mod memory;
pub mod model;
pub mod store;

pub use memory::{MemoryStore, MemoryTransaction};
pub use store::{AttendeeFilter, TodoFilter, TodoStore};
