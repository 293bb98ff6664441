//! Risk scoring models for the Orca decision engine (§4.2).
//!
//! Exposes a single [`RiskModel`] capability with two implementations: a
//! deterministic [`stub::StubRiskModel`] and an artifact-backed
//! [`xgb::XgbRiskModel`]. The engine selects between them from
//! configuration; [`load_risk_model`] implements that selection, including
//! the fallback-to-stub-with-warning behavior when the trained artifacts
//! cannot be loaded.

pub mod error;
pub mod model;
pub mod stub;
pub mod xgb;

pub use error::{RiskError, Result};
pub use model::{RiskModel, RiskPrediction};
pub use stub::{model_error_prediction, StubRiskModel};
pub use xgb::XgbRiskModel;

use std::path::Path;

/// Select a risk model per configuration (§4.2, §4.12 `use_xgb`/`xgb_model_dir`).
///
/// When `use_xgb` is set but the artifacts fail to load, logs a warning and
/// falls back to the stub rather than failing engine startup.
pub fn load_risk_model(use_xgb: bool, xgb_model_dir: Option<&Path>) -> Box<dyn RiskModel> {
    if !use_xgb {
        return Box::new(StubRiskModel);
    }
    let Some(dir) = xgb_model_dir else {
        tracing::warn!("ORCA_USE_XGB set but no model directory configured, falling back to stub");
        return Box::new(StubRiskModel);
    };
    match XgbRiskModel::load(dir) {
        Ok(model) => Box::new(model),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load xgb risk model artifacts, falling back to stub");
            Box::new(StubRiskModel)
        }
    }
}
