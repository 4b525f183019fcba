/// Product identifier pieces shared across crates
pub const PRODUCT_NAME: &str = "Kunai";
pub const PRODUCT_ID: &str = const_str::concat!("-//", PRODUCT_NAME, "//Kunai Todo Sync//EN");

/// Calendar address scheme prefix used for organizer and attendee values.
pub const MAILTO_PREFIX: &str = "MAILTO:";

/// Suffix of a to-do collection entry name.
pub const TODO_ENTRY_SUFFIX: &str = ".ics";

/// Message reported when an occurrence carries recurrence data of its own.
pub const INVALID_RECURRENCE_MESSAGE: &str = "Recurrence can not be recurrent!";

/// Message reported when the `(uuid, calendar, recurrence)` key collides.
pub const UUID_RECURRENCE_UNIQUE_MESSAGE: &str = "UUID and recurrence must be unique in a calendar!";
