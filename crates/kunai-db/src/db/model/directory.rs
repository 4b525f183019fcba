//! Users, calendars and the lookup tables to-dos point at.

use kunai_core::types::{CalendarId, CategoryId, LocationId, UserId};

/// A principal owning calendars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    /// Preferred IANA timezone name.
    pub timezone: Option<String>,
}

/// A calendar. Every calendar has exactly one owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Calendar {
    pub id: CalendarId,
    pub name: String,
    pub owner: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
}
