//! Decision Orchestrator (§4.9): binds feature extraction, risk scoring,
//! rule evaluation, aggregation, explanation, contract assembly, receipt
//! signing and event emission into a single entry point.
//!
//! Stages 1-8 run sequentially and synchronously; stage 9 (event emission)
//! is spawned onto a background task and never blocks the decision already
//! computed in stage 10 (§5).

use crate::error::{EngineError, Result};
use crate::settings::OrcaSettings;
use chrono::Utc;
use orca_core::contract::DecisionContract;
use orca_core::{
    aggregate, build_contract, compose_explanation, compose_human_explanation, extract_features,
    DecisionRequest, DecisionResponse, MetaStructured, RuleRegistry,
};
use orca_events::EventEmitter;
use orca_llm::{ExplainerConfig, LlmExplainer, Provenance};
use orca_risk::{load_risk_model, RiskModel};
use orca_signing::{apply_signing, KeyManager, SigningMode};
use std::sync::Arc;
use uuid::Uuid;

pub const MODEL_NAME: &str = "orca-engine";
const HIGH_RISK_THRESHOLD: f64 = 0.80;

fn generate_trace_id() -> String {
    format!("txn_{}", Uuid::new_v4().simple())
}

/// Output of a full decision cycle: the internal response plus the AP2
/// wire contract built from it (§4.9 step 10).
#[derive(Debug, Clone)]
pub struct DecisionOutcome {
    pub response: DecisionResponse,
    pub contract: DecisionContract,
}

/// Binds the deterministic pipeline (`orca-core`), the risk model
/// (`orca-risk`), the optional LLM overlay (`orca-llm`), receipt
/// signing (`orca-signing`) and event emission (`orca-events`).
///
/// Holds only read-only, already-loaded resources (risk model artifact,
/// signing keys, rule registry); safe to share behind an `Arc` and invoke
/// concurrently (§5).
pub struct DecisionEngine {
    rules: RuleRegistry,
    risk_model: Box<dyn RiskModel>,
    explainer: Option<LlmExplainer>,
    signing_mode: SigningMode,
    signing_keys: Option<KeyManager>,
    emitter: Arc<EventEmitter>,
}

impl DecisionEngine {
    /// Build the engine from a configuration snapshot. The risk model
    /// artifact and signing keys are loaded once here; both are read-only
    /// for the lifetime of the engine (§5 shared resources).
    pub fn new(settings: &OrcaSettings, explainer: Option<LlmExplainer>) -> Self {
        let risk_model = load_risk_model(settings.use_xgb, settings.xgb_model_dir.as_deref());

        let signing_mode = SigningMode {
            receipt_hash_only: settings.receipt_hash_only,
            sign_decisions: settings.sign_decisions,
        };
        let signing_keys = if settings.sign_decisions {
            match settings
                .signing_key_path
                .as_deref()
                .map(KeyManager::load_from_file)
                .unwrap_or_else(KeyManager::load_from_env)
            {
                Ok(keys) => Some(keys),
                Err(err) => {
                    tracing::warn!(error = %err, "failed to load signing key material, falling back to an ephemeral test key");
                    Some(KeyManager::load_test_keys())
                }
            }
        } else {
            None
        };

        let validator = orca_events::ContractValidator::new(settings.schemas_dir.clone());
        let emitter = Arc::new(EventEmitter::new(
            settings.ce_subscriber_url.clone(),
            settings.ce_source_uri.clone(),
            validator,
        ));

        Self {
            rules: RuleRegistry::with_builtins(),
            risk_model,
            explainer,
            signing_mode,
            signing_keys,
            emitter,
        }
    }

    /// Construct an explainer from settings, if AI mode and Azure OpenAI
    /// credentials are both present. Returns `None` otherwise so the
    /// engine falls back to deterministic explanations only.
    pub fn build_explainer(settings: &OrcaSettings) -> Option<LlmExplainer> {
        if !settings.is_ai_enabled() || !settings.has_azure_openai_config() {
            return None;
        }
        let endpoint = settings.azure_openai_endpoint.clone()?;
        let api_key = settings.azure_openai_api_key.clone()?;
        let config = ExplainerConfig {
            model: settings.azure_openai_deployment.clone(),
            max_tokens: settings.explain_max_tokens,
            strict_json: settings.explain_strict_json,
            refuse_on_uncertainty: settings.explain_refuse_on_uncertainty,
            ..ExplainerConfig::default()
        };
        let provider = orca_llm::AzureOpenAiProvider::new(
            endpoint,
            api_key,
            settings.azure_openai_deployment.clone(),
            config.timeout,
        );
        Some(LlmExplainer::new(Box::new(provider), config))
    }

    /// Run a single decision cycle (§4.9 steps 1-10).
    pub async fn decide(&self, request: DecisionRequest) -> Result<DecisionOutcome> {
        // 1. Validate request.
        request.validate().map_err(EngineError::Validation)?;

        // 2. Extract features.
        let features = extract_features(&request);

        // 3. Invoke risk model. Predictions never panic or error (§4.2);
        // a malformed artifact is already handled at load time.
        let prediction = self.risk_model.predict(&features).clamp_score();

        // 4. Run rule registry.
        let rule_outcomes = self.rules.evaluate(&request, &features);

        // 5. Aggregate decision.
        let aggregated = aggregate(&request, &rule_outcomes, prediction.risk_score, HIGH_RISK_THRESHOLD);

        // 6. Compose explanation (deterministic; optional guardrailed LLM overlay).
        let deterministic_explanation =
            compose_explanation(aggregated.decision, &aggregated.reasons, &request, prediction.risk_score);
        let explanation_human = compose_human_explanation(aggregated.decision, &aggregated.reasons);

        let (explanation, llm_provenance) = match &self.explainer {
            Some(explainer) => {
                let outcome = explainer
                    .explain(
                        aggregated.decision.as_str(),
                        &aggregated.reasons,
                        request.cart_total,
                        prediction.risk_score,
                        &deterministic_explanation,
                    )
                    .await;
                let provenance = outcome.provenance.clone();
                (outcome.text, Some(provenance))
            }
            None => (deterministic_explanation, None),
        };

        let trace_id = generate_trace_id();
        let timestamp = Utc::now();

        let mut meta = std::collections::HashMap::new();
        meta.insert("transaction_id".to_string(), serde_json::json!(trace_id));
        if let Some(provenance) = &llm_provenance {
            meta.insert("explanation_provenance".to_string(), serde_json::json!(provenance.as_str()));
        }

        let response = DecisionResponse {
            decision: aggregated.decision,
            status: aggregated.status,
            reasons: aggregated.reasons,
            actions: aggregated.actions,
            signals_triggered: aggregated.signals_triggered,
            routing_hint: aggregated.routing_hint,
            meta,
            meta_structured: MetaStructured {
                risk_score: prediction.risk_score,
                risk_reason_codes: prediction.reason_codes,
                risk_model_version: prediction.version,
                risk_model_type: prediction.model_type,
                risk_model_error: None,
                approved_amount: aggregated.approved_amount,
            },
            explanation,
            explanation_human,
            transaction_id: trace_id.clone(),
            timestamp: timestamp.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            cart_total: request.cart_total,
            rail: request.rail.as_str().to_string(),
        };

        // 7. Build contract.
        let mut contract = build_contract(&request, &response, MODEL_NAME, &trace_id, timestamp)?;

        // 8. Hash receipt (and sign if configured).
        apply_signing(&mut contract, &trace_id, self.signing_mode, self.signing_keys.as_ref());

        // 9. Fire-and-record event emission; never blocks the response (§5, §4.9 step 9).
        let emitter = Arc::clone(&self.emitter);
        let event_data = serde_json::to_value(&contract).unwrap_or(serde_json::Value::Null);
        let emit_trace_id = trace_id.clone();
        tokio::spawn(async move {
            if let Err(err) = emitter.emit_decision_event(event_data, &emit_trace_id).await {
                tracing::warn!(error = %err, trace_id = %emit_trace_id, "decision event emission failed");
            }
        });

        // 10. Return the internal response plus the wire contract.
        Ok(DecisionOutcome { response, contract })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(value: serde_json::Value) -> DecisionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[tokio::test]
    async fn approves_low_risk_low_ticket_request() {
        let settings = OrcaSettings::default();
        let engine = DecisionEngine::new(&settings, None);
        let outcome = engine
            .decide(request(json!({"cart_total": 25.0})))
            .await
            .expect("decision succeeds");
        assert_eq!(outcome.response.decision, orca_core::Decision::Approve);
        assert_eq!(outcome.contract.decision.result, "APPROVE");
        assert!(outcome.contract.signing.receipt_hash.is_none());
    }

    #[tokio::test]
    async fn rejects_invalid_request_before_touching_downstream_stages() {
        let settings = OrcaSettings::default();
        let engine = DecisionEngine::new(&settings, None);
        let result = engine.decide(request(json!({"cart_total": -5.0}))).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn high_ticket_request_is_flagged_for_review() {
        let settings = OrcaSettings::default();
        let engine = DecisionEngine::new(&settings, None);
        let outcome = engine
            .decide(request(json!({"cart_total": 750.0})))
            .await
            .expect("decision succeeds");
        assert_ne!(outcome.response.decision, orca_core::Decision::Approve);
        assert!(outcome.response.signals_triggered.contains(&"HIGH_TICKET".to_string()));
    }

    #[tokio::test]
    async fn receipt_hash_is_populated_when_configured() {
        let mut settings = OrcaSettings::default();
        settings.receipt_hash_only = true;
        let engine = DecisionEngine::new(&settings, None);
        let outcome = engine
            .decide(request(json!({"cart_total": 10.0})))
            .await
            .expect("decision succeeds");
        assert!(outcome.contract.signing.receipt_hash.is_some());
        assert!(outcome.contract.signing.vc_proof.is_none());
    }

    #[tokio::test]
    async fn generated_trace_id_matches_expected_shape() {
        let settings = OrcaSettings::default();
        let engine = DecisionEngine::new(&settings, None);
        let outcome = engine
            .decide(request(json!({"cart_total": 10.0})))
            .await
            .expect("decision succeeds");
        assert!(outcome.response.transaction_id.starts_with("txn_"));
        assert!(orca_events::validate_trace_id(&outcome.response.transaction_id).is_ok());
    }
}
