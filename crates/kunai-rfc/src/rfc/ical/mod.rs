//! iCalendar (RFC 5545) support limited to what to-do synchronization needs.

pub mod build;
pub mod core;
pub mod parse;
pub mod timezone;

#[cfg(test)]
mod tests;
