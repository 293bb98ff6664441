//! Errors raised while loading a risk model's artifacts (§4.2).
//!
//! [`crate::RiskModel::predict`] itself never raises: runtime failures are
//! folded into a stub prediction with reason code `MODEL_ERROR` by the
//! caller (§4.2, §7).

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RiskError {
    #[error("risk model artifact missing: {0}")]
    ArtifactMissing(String),

    #[error("risk model artifact invalid: {0}")]
    ArtifactInvalid(String),
}

pub type Result<T> = std::result::Result<T, RiskError>;
