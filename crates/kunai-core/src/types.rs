//! Typed record identifiers shared by the store and the service layer.

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i64 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

record_id!(
    /// Identifier of a user (principal owning calendars).
    UserId
);
record_id!(
    /// Identifier of a calendar.
    CalendarId
);
record_id!(
    /// Identifier of a to-do record.
    TodoId
);
record_id!(
    /// Identifier of an attendee sub-record.
    AttendeeId
);
record_id!(
    /// Identifier of an alarm sub-record.
    AlarmId
);
record_id!(
    /// Identifier of a recurrence or exception date sub-record.
    DateId
);
record_id!(
    /// Identifier of a recurrence or exception rule sub-record.
    RuleId
);
record_id!(
    /// Identifier of a category.
    CategoryId
);
record_id!(
    /// Identifier of a location.
    LocationId
);
