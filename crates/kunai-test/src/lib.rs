//! Kunai to-do engine - integration test support.
//!
//! Re-exports the workspace crates so integration tests can use one import
//! root.

pub mod component {
    pub use kunai_core::{config, constants, types};
    pub use kunai_service::*;

    pub mod db {
        pub use kunai_db::db::*;
        pub use kunai_db::error::{DbError, DbResult};
    }
}

pub use kunai_rfc as rfc;
