//! To-do synchronization engine: VTODO decode/encode, recurrence rules and
//! attendee fan-out on top of a [`TodoStore`](kunai_db::db::TodoStore).

pub mod cache;
pub mod codec;
pub mod context;
pub mod error;
pub mod recurrence;
pub mod service;
pub mod vtodo;

pub use cache::{ListingCache, MemoryListingCache};
pub use context::Context;
pub use error::{ServiceError, ServiceResult};
pub use service::{DuplicateDefaults, TodoService};
