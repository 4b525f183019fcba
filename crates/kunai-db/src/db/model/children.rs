//! Sub-records owned by a to-do: attendees, alarms, recurrence dates and
//! recurrence rules.

use chrono::NaiveDateTime;
use kunai_core::types::{AlarmId, AttendeeId, DateId, RuleId, TodoId};

use crate::db::enums::{DateKind, Frequency, PartStat, RuleKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attendee {
    pub id: AttendeeId,
    pub todo: TodoId,
    pub email: String,
    pub status: Option<PartStat>,
    pub common_name: Option<String>,
    pub role: Option<String>,
}

impl Attendee {
    #[must_use]
    pub fn is_declined(&self) -> bool {
        self.status == Some(PartStat::Declined)
    }

    /// Values needed to recreate this attendee elsewhere.
    #[must_use]
    pub fn values(&self) -> AttendeeValues {
        AttendeeValues {
            email: self.email.clone(),
            status: self.status,
            common_name: self.common_name.clone(),
            role: self.role.clone(),
        }
    }
}

/// Attendee fields used for creates and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendeeValues {
    pub email: String,
    pub status: Option<PartStat>,
    pub common_name: Option<String>,
    pub role: Option<String>,
}

impl AttendeeValues {
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            status: None,
            common_name: None,
            role: None,
        }
    }

    #[must_use]
    pub const fn with_status(mut self, status: PartStat) -> Self {
        self.status = Some(status);
        self
    }

    /// The writable part of these values. The email of a stored attendee
    /// never changes.
    #[must_use]
    pub fn update(&self) -> AttendeeUpdate {
        AttendeeUpdate {
            status: Some(self.status),
            common_name: Some(self.common_name.clone()),
            role: Some(self.role.clone()),
        }
    }
}

/// Patch for a stored attendee. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendeeUpdate {
    pub status: Option<Option<PartStat>>,
    pub common_name: Option<Option<String>>,
    pub role: Option<Option<String>>,
}

impl AttendeeUpdate {
    #[must_use]
    pub const fn status(status: PartStat) -> Self {
        Self {
            status: Some(Some(status)),
            common_name: None,
            role: None,
        }
    }

    pub fn apply(&self, attendee: &mut Attendee) {
        if let Some(status) = self.status {
            attendee.status = status;
        }
        if let Some(common_name) = &self.common_name {
            attendee.common_name.clone_from(common_name);
        }
        if let Some(role) = &self.role {
            attendee.role.clone_from(role);
        }
    }
}

/// An alarm, kept as its serialized `VALARM` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub id: AlarmId,
    pub todo: TodoId,
    pub valarm: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmValues {
    pub valarm: String,
}

/// A recurrence (`RDATE`) or exception (`EXDATE`) date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRecord {
    pub id: DateId,
    pub todo: TodoId,
    pub kind: DateKind,
    pub values: DateValues,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateValues {
    /// The date is a whole day; `datetime` is its local midnight.
    pub all_day: bool,
    pub datetime: NaiveDateTime,
}

/// A recurrence (`RRULE`) or exception (`EXRULE`) rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRecord {
    pub id: RuleId,
    pub todo: TodoId,
    pub kind: RuleKind,
    pub values: RuleValues,
}

/// The parts of a recurrence rule. `BYxxx` lists are kept as their
/// comma-separated wire text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleValues {
    pub freq: Frequency,
    pub until: Option<NaiveDateTime>,
    /// `UNTIL` is a date rather than a date-time.
    pub until_date: bool,
    pub count: Option<u32>,
    pub interval: Option<u32>,
    pub by_second: Option<String>,
    pub by_minute: Option<String>,
    pub by_hour: Option<String>,
    pub by_day: Option<String>,
    pub by_month_day: Option<String>,
    pub by_year_day: Option<String>,
    pub by_week_no: Option<String>,
    pub by_month: Option<String>,
    pub by_set_pos: Option<String>,
    pub wkst: Option<String>,
}

impl RuleValues {
    #[must_use]
    pub const fn new(freq: Frequency) -> Self {
        Self {
            freq,
            until: None,
            until_date: false,
            count: None,
            interval: None,
            by_second: None,
            by_minute: None,
            by_hour: None,
            by_day: None,
            by_month_day: None,
            by_year_day: None,
            by_week_no: None,
            by_month: None,
            by_set_pos: None,
            wkst: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendee_update_keeps_email() {
        let mut attendee = Attendee {
            id: AttendeeId(1),
            todo: TodoId(1),
            email: "bob@example.com".to_string(),
            status: None,
            common_name: Some("Bob".to_string()),
            role: None,
        };
        AttendeeUpdate::status(PartStat::Declined).apply(&mut attendee);
        assert!(attendee.is_declined());
        assert_eq!(attendee.common_name.as_deref(), Some("Bob"));

        let values = AttendeeValues::new("carol@example.com").with_status(PartStat::Accepted);
        values.update().apply(&mut attendee);
        assert_eq!(attendee.email, "bob@example.com");
        assert_eq!(attendee.status, Some(PartStat::Accepted));
        assert_eq!(attendee.common_name, None);
    }
}
