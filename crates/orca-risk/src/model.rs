//! Risk model capability (§4.2): a single trait with a deterministic stub
//! implementation and a trained gradient-boosted implementation.

use orca_core::DerivedFeatures;
use serde::{Deserialize, Serialize};

/// Output of a risk model invocation (§3 `RiskPrediction`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPrediction {
    /// Clamped to `[0.0, 1.0]`.
    pub risk_score: f64,
    /// Ordered; e.g. `BASELINE`, `DUMMY_MCC`, `VELOCITY`, `CROSS_BORDER`, `HIGH_RISK`, `LOW_RISK`.
    pub reason_codes: Vec<String>,
    pub version: String,
    pub model_type: String,
}

impl RiskPrediction {
    pub fn clamp_score(mut self) -> Self {
        self.risk_score = self.risk_score.clamp(0.0, 1.0);
        self
    }
}

/// A risk scoring capability. Implementations must be deterministic given
/// the same input features and must never panic or propagate I/O errors
/// from `predict` itself (§4.2, §7 `MODEL_ERROR`).
pub trait RiskModel: Send + Sync {
    fn predict(&self, features: &DerivedFeatures) -> RiskPrediction;
}
