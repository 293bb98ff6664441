//! Engine-level error taxonomy (§7).
//!
//! Only `VALIDATION_ERROR` and `MODEL_ERROR` can abort a decision outright.
//! Everything from `SIGNING_ERROR` onward is post-decision and recovered
//! locally; the orchestrator never constructs those variants for a
//! decision it still returns successfully, but callers driving the engine
//! directly (CLI `validate-only`, tests) may want the full taxonomy named
//! in one place.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("llm error: {0}")]
    Llm(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("emission error: {0}")]
    Emission(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error("cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, EngineError>;

impl From<orca_core::CoreError> for EngineError {
    fn from(err: orca_core::CoreError) -> Self {
        EngineError::Validation(err.to_string())
    }
}
