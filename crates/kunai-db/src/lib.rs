//! Record model, diff language and persistence collaborator for to-dos.

pub mod db;
pub mod error;

pub use error::{DbError, DbResult};
