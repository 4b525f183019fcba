//! Shared building blocks for the kunai workspace: errors, typed ids,
//! configuration and constants.

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

pub use error::{CoreError, CoreResult};
