//! Trained gradient-boosted risk model (§4.2).
//!
//! Loads four artifacts from a directory: a tree ensemble, a probability
//! calibrator, a feature scaler, and a metadata descriptor naming the
//! feature order and each feature's importance. All four must be present at
//! startup; a missing or malformed artifact is an [`RiskError`], which the
//! caller (`orca-engine`) turns into a stub fallback with a logged warning.

use crate::error::{RiskError, Result};
use crate::model::{RiskModel, RiskPrediction};
use orca_core::DerivedFeatures;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A depth-one decision stump. The ensemble score is the sum of every
/// stump's contribution plus `base_score`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeStump {
    pub feature: String,
    pub threshold: f64,
    pub left_value: f64,
    pub right_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub base_score: f64,
    pub trees: Vec<TreeStump>,
}

/// Platt-scaling calibrator mapping a raw ensemble score to `[0, 1]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Calibrator {
    pub a: f64,
    pub b: f64,
}

impl Calibrator {
    fn apply(&self, raw: f64) -> f64 {
        1.0 / (1.0 + (-(self.a * raw + self.b)).exp())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeatureScaler {
    pub means: HashMap<String, f64>,
    pub stds: HashMap<String, f64>,
}

impl FeatureScaler {
    fn scale(&self, feature: &str, raw: f64) -> f64 {
        let mean = self.means.get(feature).copied().unwrap_or(0.0);
        let std = self.stds.get(feature).copied().unwrap_or(1.0);
        if std == 0.0 {
            raw - mean
        } else {
            (raw - mean) / std
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelProvenance {
    pub trained_at: String,
    #[serde(default)]
    pub training_dataset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub version: String,
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub defaults: HashMap<String, f64>,
    #[serde(default)]
    pub importance: HashMap<String, f64>,
    pub provenance: ModelProvenance,
}

/// The four artifacts that make up a trained risk model.
pub struct XgbRiskModel {
    ensemble: TreeEnsemble,
    calibrator: Calibrator,
    scaler: FeatureScaler,
    metadata: ModelMetadata,
    /// Minimum |importance| for a feature to surface as a reason code.
    importance_margin: f64,
}

fn read_artifact<T: for<'de> Deserialize<'de>>(dir: &Path, file_name: &str) -> Result<T> {
    let path = dir.join(file_name);
    let contents = std::fs::read_to_string(&path)
        .map_err(|_| RiskError::ArtifactMissing(path.display().to_string()))?;
    serde_json::from_str(&contents).map_err(|e| RiskError::ArtifactInvalid(format!("{file_name}: {e}")))
}

impl XgbRiskModel {
    /// Load all four artifacts from `dir`. Fails fast if any is missing or malformed.
    pub fn load(dir: &Path) -> Result<Self> {
        let ensemble: TreeEnsemble = read_artifact(dir, "trees.json")?;
        let calibrator: Calibrator = read_artifact(dir, "calibrator.json")?;
        let scaler: FeatureScaler = read_artifact(dir, "scaler.json")?;
        let metadata: ModelMetadata = read_artifact(dir, "metadata.json")?;
        Ok(Self {
            ensemble,
            calibrator,
            scaler,
            metadata,
            importance_margin: 0.05,
        })
    }

    fn raw_feature(&self, features: &DerivedFeatures, name: &str) -> f64 {
        features
            .get(name)
            .or_else(|| self.metadata.defaults.get(name).copied())
            .unwrap_or(0.0)
    }

    fn reason_codes(&self, features: &DerivedFeatures) -> Vec<String> {
        let mut ranked: Vec<(&String, f64)> = self
            .metadata
            .importance
            .iter()
            .filter(|(_, weight)| weight.abs() >= self.importance_margin)
            .map(|(name, weight)| (name, *weight))
            .collect();
        ranked.sort_by(|a, b| b.1.abs().partial_cmp(&a.1.abs()).unwrap_or(std::cmp::Ordering::Equal));

        let codes: Vec<String> = ranked
            .into_iter()
            .filter(|(name, _)| self.raw_feature(features, name) != 0.0)
            .map(|(name, _)| name.to_ascii_uppercase())
            .collect();

        if codes.is_empty() {
            vec!["BASELINE".to_string()]
        } else {
            codes
        }
    }
}

impl RiskModel for XgbRiskModel {
    fn predict(&self, features: &DerivedFeatures) -> RiskPrediction {
        let raw_score: f64 = self.ensemble.base_score
            + self
                .metadata
                .feature_names
                .iter()
                .flat_map(|name| {
                    let raw = self.raw_feature(features, name);
                    let scaled = self.scaler.scale(name, raw);
                    self.ensemble
                        .trees
                        .iter()
                        .filter(move |tree| &tree.feature == name)
                        .map(move |tree| {
                            if scaled <= tree.threshold {
                                tree.left_value
                            } else {
                                tree.right_value
                            }
                        })
                })
                .sum::<f64>();

        RiskPrediction {
            risk_score: self.calibrator.apply(raw_score),
            reason_codes: self.reason_codes(features),
            version: self.metadata.version.clone(),
            model_type: "xgb".to_string(),
        }
        .clamp_score()
    }
}
