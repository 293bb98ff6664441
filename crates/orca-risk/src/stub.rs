//! Deterministic stub risk model (§4.2).
//!
//! A fixed additive scoring function. Used by default and as the fallback
//! when the trained model's artifacts cannot be loaded.

use crate::model::{RiskModel, RiskPrediction};
use orca_core::DerivedFeatures;

pub const STUB_VERSION: &str = "stub-0.1.0";

#[derive(Debug, Clone, Default)]
pub struct StubRiskModel;

impl RiskModel for StubRiskModel {
    fn predict(&self, features: &DerivedFeatures) -> RiskPrediction {
        let mut score = 0.35;
        let mut reason_codes = Vec::new();

        if features.get_or("is_high_ticket", 0.0) > 0.0 || features.get_or("amount", 0.0) > 500.0 {
            score += 0.20;
            reason_codes.push("DUMMY_MCC".to_string());
        }
        if features.get_or("velocity_24h", 0.0) > 2.0 {
            score += 0.10;
            reason_codes.push("VELOCITY".to_string());
        }
        if features.get_or("cross_border", 0.0) > 0.0 || features.get_or("ip_country_mismatch", 0.0) > 0.0 {
            score += 0.10;
            reason_codes.push("CROSS_BORDER".to_string());
        }
        if reason_codes.is_empty() {
            reason_codes.push("BASELINE".to_string());
        }

        RiskPrediction {
            risk_score: score,
            reason_codes,
            version: STUB_VERSION.to_string(),
            model_type: "stub".to_string(),
        }
        .clamp_score()
    }
}

/// Build a `MODEL_ERROR` prediction, used when a trained model fails at
/// inference time rather than at load time (§7).
pub fn model_error_prediction() -> RiskPrediction {
    RiskPrediction {
        risk_score: 0.35,
        reason_codes: vec!["MODEL_ERROR".to_string()],
        version: STUB_VERSION.to_string(),
        model_type: "stub".to_string(),
    }
}
