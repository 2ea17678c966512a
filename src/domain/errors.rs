//! Domain errors for the stratify loader.

use thiserror::Error;

/// Domain-level errors that can occur during a load run.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Page source failure: {0}")]
    SourceFailed(String),

    #[error("Sink failure: {0}")]
    SinkFailed(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),
}

pub type DomainResult<T> = Result<T, DomainError>;

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::DatabaseError(err.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(err: serde_json::Error) -> Self {
        DomainError::SerializationError(err.to_string())
    }
}
