//! Document-level integration tests: storing, serving and propagating
//! to-dos through the service against the in-memory store.

mod helpers;

mod fan_out;
mod listing;
mod recurrence;
mod round_trip;
