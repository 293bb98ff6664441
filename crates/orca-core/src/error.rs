//! Error types for the Orca core decision pipeline

use thiserror::Error;

/// Core error type returned by the deterministic stages of the pipeline
/// (feature extraction, rule evaluation, aggregation, contract assembly).
#[derive(Error, Debug)]
pub enum CoreError {
    /// The inbound request failed shape or enum-membership validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// A contract could not be assembled from a decision response.
    #[error("contract build error: {0}")]
    ContractBuild(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;
