//! Process-wide configuration snapshot (§4.12), read once at startup.
//!
//! Field names follow the env vars in spec §6 (`ORCA_*`/`AZURE_*`) rather
//! than a single shared prefix, so this reads each variable directly
//! instead of going through `config::Environment`'s prefix-based mapping —
//! mirroring the per-field `os.getenv` reads of `orca_core.config` rather
//! than the single-prefix style `corint-server::config::ServerConfig::load`
//! uses for its own, single-prefixed `CORINT_*` variables.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionMode {
    RulesOnly,
    RulesPlusAi,
}

impl Default for DecisionMode {
    fn default() -> Self {
        DecisionMode::RulesOnly
    }
}

impl DecisionMode {
    fn parse(raw: &str) -> Self {
        match raw {
            "RULES_PLUS_AI" => DecisionMode::RulesPlusAi,
            _ => DecisionMode::RulesOnly,
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_bool(key: &str, default: bool) -> bool {
    env_string(key).map(|v| v.eq_ignore_ascii_case("true") || v == "1").unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    env_string(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrcaSettings {
    pub decision_mode: DecisionMode,

    pub use_xgb: bool,
    pub xgb_model_dir: Option<PathBuf>,

    pub azure_openai_endpoint: Option<String>,
    pub azure_openai_api_key: Option<String>,
    pub azure_openai_deployment: String,

    pub explain_max_tokens: u32,
    pub explain_strict_json: bool,
    pub explain_refuse_on_uncertainty: bool,

    pub sign_decisions: bool,
    pub receipt_hash_only: bool,

    pub ce_subscriber_url: Option<String>,
    pub ce_source_uri: String,

    pub signing_key_path: Option<PathBuf>,
    pub key_id: Option<String>,

    /// Directory tree holding the bundled mandate/event JSON schemas
    /// (§4.11). `None` means schemas are unavailable and the Contract
    /// Validator falls back to its minimal built-in checks.
    pub schemas_dir: Option<PathBuf>,

    /// Alternate Azure ML-hosted model config, carried for forward
    /// compatibility alongside `xgb_model_dir` (§3 supplemented features).
    /// Azure ML deployment itself is out of scope; only the local-artifact
    /// path in `orca-risk::load_risk_model` is implemented.
    pub azure_ml_endpoint: Option<String>,
    pub azure_ml_key: Option<String>,
    pub azure_ml_model_name: Option<String>,
}

impl Default for OrcaSettings {
    fn default() -> Self {
        Self {
            decision_mode: DecisionMode::RulesOnly,
            use_xgb: false,
            xgb_model_dir: None,
            azure_openai_endpoint: None,
            azure_openai_api_key: None,
            azure_openai_deployment: "gpt-4o-mini".to_string(),
            explain_max_tokens: 300,
            explain_strict_json: true,
            explain_refuse_on_uncertainty: true,
            sign_decisions: false,
            receipt_hash_only: false,
            ce_subscriber_url: None,
            ce_source_uri: "https://orca.ocn.ai/decision-engine".to_string(),
            signing_key_path: None,
            key_id: None,
            schemas_dir: None,
            azure_ml_endpoint: None,
            azure_ml_key: None,
            azure_ml_model_name: None,
        }
    }
}

impl OrcaSettings {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        Self {
            decision_mode: env_string("ORCA_MODE").map(|v| DecisionMode::parse(&v)).unwrap_or(defaults.decision_mode),
            use_xgb: env_bool("ORCA_USE_XGB", defaults.use_xgb),
            xgb_model_dir: env_string("ORCA_XGB_MODEL_DIR").map(PathBuf::from),
            azure_openai_endpoint: env_string("AZURE_OPENAI_ENDPOINT"),
            azure_openai_api_key: env_string("AZURE_OPENAI_API_KEY"),
            azure_openai_deployment: env_string("AZURE_OPENAI_DEPLOYMENT").unwrap_or(defaults.azure_openai_deployment),
            explain_max_tokens: env_u32("ORCA_EXPLAIN_MAX_TOKENS", defaults.explain_max_tokens),
            explain_strict_json: env_bool("ORCA_EXPLAIN_STRICT_JSON", defaults.explain_strict_json),
            explain_refuse_on_uncertainty: env_bool(
                "ORCA_EXPLAIN_REFUSE_ON_UNCERTAINTY",
                defaults.explain_refuse_on_uncertainty,
            ),
            sign_decisions: env_bool("ORCA_SIGN_DECISIONS", defaults.sign_decisions),
            receipt_hash_only: env_bool("ORCA_RECEIPT_HASH_ONLY", defaults.receipt_hash_only),
            ce_subscriber_url: env_string("ORCA_CE_SUBSCRIBER_URL"),
            ce_source_uri: env_string("ORCA_CE_SOURCE_URI").unwrap_or(defaults.ce_source_uri),
            signing_key_path: env_string("ORCA_SIGNING_KEY_PATH").map(PathBuf::from),
            key_id: env_string("ORCA_KEY_ID"),
            schemas_dir: env_string("ORCA_SCHEMAS_DIR").map(PathBuf::from),
            azure_ml_endpoint: env_string("AZURE_ML_ENDPOINT"),
            azure_ml_key: env_string("AZURE_ML_KEY"),
            azure_ml_model_name: env_string("AZURE_ML_MODEL_NAME"),
        }
    }

    pub fn is_ai_enabled(&self) -> bool {
        self.decision_mode == DecisionMode::RulesPlusAi
    }

    pub fn has_azure_openai_config(&self) -> bool {
        self.azure_openai_endpoint.is_some() && self.azure_openai_api_key.is_some()
    }

    pub fn has_azure_ml_config(&self) -> bool {
        self.azure_ml_endpoint.is_some() && self.azure_ml_key.is_some()
    }

    /// Human-readable configuration issues. Inconsistent configuration is
    /// permitted but logged — the engine degrades gracefully rather than
    /// refusing to start (§4.12).
    pub fn validate_config(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if self.is_ai_enabled() && !self.has_azure_openai_config() {
            issues.push("Azure OpenAI configuration missing".to_string());
        }
        if self.use_xgb && self.xgb_model_dir.is_none() && !self.has_azure_ml_config() {
            issues.push("ORCA_USE_XGB is set but neither xgb_model_dir nor Azure ML configuration is present".to_string());
        }
        if self.sign_decisions && self.signing_key_path.is_none() && std::env::var("ORCA_PRIVATE_KEY").is_err() {
            issues.push("ORCA_SIGN_DECISIONS is set but no signing key is configured; an ephemeral test key will be used".to_string());
        }
        issues
    }
}
