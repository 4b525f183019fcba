//! RFC 5545 text layer: content-line lexing, component model, serializer
//! and timezone helpers.

pub mod error;
pub mod rfc;

pub use error::{RfcError, RfcResult};
