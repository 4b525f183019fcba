use thiserror::Error;

/// Service layer errors - combines all error types
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    DatabaseError(#[from] kunai_db::error::DbError),

    #[error(transparent)]
    RfcError(#[from] kunai_rfc::error::RfcError),

    #[error(transparent)]
    CoreError(#[from] kunai_core::error::CoreError),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<kunai_rfc::rfc::ical::parse::ParseError> for ServiceError {
    fn from(err: kunai_rfc::rfc::ical::parse::ParseError) -> Self {
        Self::ParseError(err.to_string())
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
