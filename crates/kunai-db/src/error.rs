use thiserror::Error;

/// Database layer errors
#[derive(Error, Debug)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Unique constraint violated: {0}")]
    UniqueViolation(&'static str),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),
}

impl DbError {
    #[must_use]
    pub const fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }
}

pub type DbResult<T> = std::result::Result<T, DbError>;
