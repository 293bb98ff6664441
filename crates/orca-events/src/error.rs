//! Error types for CloudEvent construction, validation, and emission
//! (§7 `SCHEMA_ERROR`, `EMISSION_ERROR`).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EventsError>;

#[derive(Debug, Error)]
pub enum EventsError {
    #[error("subject '{0}' does not match ^txn_[A-Za-z0-9_-]+$")]
    InvalidSubject(String),

    #[error("schema validation failed: {0:?}")]
    ValidationFailed(Vec<crate::validator::ValidationIssue>),

    #[error("no schema available for {0}, used fallback validator")]
    SchemaUnavailable(String),

    #[error("event emission failed after retries: {0}")]
    EmissionFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
