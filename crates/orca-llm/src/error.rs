//! Error types for the LLM explanation overlay (§7 `LLM_ERROR`).

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("LLM explainer is not configured")]
    NotConfigured,

    #[error("LLM API call failed: {0}")]
    ApiCallFailed(String),

    #[error("LLM API call timed out")]
    Timeout,

    #[error("LLM response could not be parsed as JSON: {0}")]
    InvalidResponse(String),

    #[error("LLM response rejected by guardrail: {0}")]
    GuardrailRejected(String),
}
