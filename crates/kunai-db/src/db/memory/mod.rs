//! In-memory implementation of [`TodoStore`](super::TodoStore).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut store = MemoryStore::new();
//! let alice = store.add_user("Alice", "alice@example.com", None);
//! let calendar = store.add_calendar("Alice", alice);
//!
//! let mut tx = store.begin();
//! service.create(&mut tx, &ctx, values).await?;
//! tx.commit();
//! ```

mod tables;
mod transaction;

pub use transaction::MemoryTransaction;

use kunai_core::types::{CalendarId, UserId};

use super::model::{Calendar, User};
use tables::Tables;

/// A transactional in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Tables,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user and returns its id.
    pub fn add_user(
        &mut self,
        name: impl Into<String>,
        email: impl Into<String>,
        timezone: Option<&str>,
    ) -> UserId {
        let id = UserId(self.tables.next_id());
        self.tables.users.insert(
            id,
            User {
                id,
                name: name.into(),
                email: email.into(),
                timezone: timezone.map(str::to_string),
            },
        );
        id
    }

    /// Registers a calendar owned by `owner` and returns its id.
    pub fn add_calendar(&mut self, name: impl Into<String>, owner: UserId) -> CalendarId {
        let id = CalendarId(self.tables.next_id());
        self.tables.calendars.insert(
            id,
            Calendar {
                id,
                name: name.into(),
                owner,
            },
        );
        id
    }

    /// ## Summary
    /// Starts a transaction over a working copy of the store.
    ///
    /// Changes become visible only through [`MemoryTransaction::commit`].
    /// Dropping the transaction discards them.
    pub fn begin(&mut self) -> MemoryTransaction<'_> {
        let working = self.tables.clone();
        MemoryTransaction::new(self, working)
    }

    /// Number of stored to-dos.
    #[must_use]
    pub fn todo_count(&self) -> usize {
        self.tables.todos.len()
    }
}
