//! Process-wide cache of collection listings.
//!
//! Listings are grouped by database identity, and a whole database is
//! invalidated at once. Readers may see a stale listing between a write and
//! its invalidation.

use std::collections::HashMap;

use kunai_core::types::CalendarId;
use parking_lot::RwLock;

/// Cached to-do collection entries, per database and calendar.
pub trait ListingCache: Send + Sync {
    fn get(&self, database: &str, calendar: CalendarId) -> Option<Vec<String>>;

    fn put(&self, database: &str, calendar: CalendarId, entries: Vec<String>);

    /// Drops every listing cached for `database`.
    fn invalidate(&self, database: &str);
}

/// [`ListingCache`] held in memory.
#[derive(Debug, Default)]
pub struct MemoryListingCache {
    entries: RwLock<HashMap<String, HashMap<CalendarId, Vec<String>>>>,
}

impl MemoryListingCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ListingCache for MemoryListingCache {
    fn get(&self, database: &str, calendar: CalendarId) -> Option<Vec<String>> {
        self.entries
            .read()
            .get(database)
            .and_then(|listings| listings.get(&calendar))
            .cloned()
    }

    fn put(&self, database: &str, calendar: CalendarId, entries: Vec<String>) {
        self.entries
            .write()
            .entry(database.to_string())
            .or_default()
            .insert(calendar, entries);
    }

    fn invalidate(&self, database: &str) {
        if self.entries.write().remove(database).is_some() {
            tracing::trace!(database, "Listing cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalidate_drops_only_its_database() {
        let cache = MemoryListingCache::new();
        cache.put("db1", CalendarId(1), vec!["a.ics".to_string()]);
        cache.put("db1", CalendarId(2), vec!["b.ics".to_string()]);
        cache.put("db2", CalendarId(1), vec!["c.ics".to_string()]);

        cache.invalidate("db1");
        assert_eq!(cache.get("db1", CalendarId(1)), None);
        assert_eq!(cache.get("db1", CalendarId(2)), None);
        assert_eq!(
            cache.get("db2", CalendarId(1)),
            Some(vec!["c.ics".to_string()])
        );
    }
}
