//! Orchestrates the optional LLM explanation overlay: builds the prompt,
//! calls the configured provider under a timeout, and runs the guardrail
//! pipeline over whatever comes back (§4.5).

use crate::client::{LLMClient, LLMRequest};
use crate::guardrail::{self, ValidationResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const SYSTEM_PROMPT: &str = "You are a payments risk explainer. Given a checkout decision and its \
machine-generated reason codes, write a short customer-facing explanation. Respond with ONLY a JSON \
object of the form {\"explanation\": string, \"confidence\": number between 0 and 1, \"key_factors\": \
array of the reason codes you relied on}. Never invent a reason code that was not given to you, never \
include personal data, never give legal advice, and never claim certainty you do not have.";

#[derive(Debug, Clone)]
pub struct ExplainerConfig {
    pub model: String,
    pub max_tokens: u32,
    pub strict_json: bool,
    pub refuse_on_uncertainty: bool,
    pub timeout: Duration,
}

impl Default for ExplainerConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            max_tokens: 300,
            strict_json: true,
            refuse_on_uncertainty: true,
            timeout: Duration::from_secs(8),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Provenance {
    Llm,
    GuardrailRefusal,
    ServiceUnavailable,
}

impl Provenance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provenance::Llm => "llm",
            Provenance::GuardrailRefusal => "guardrail_refusal",
            Provenance::ServiceUnavailable => "503_service_unavailable",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExplanationOutcome {
    pub text: String,
    pub confidence: Option<f64>,
    pub key_factors: Vec<String>,
    pub provenance: Provenance,
    pub rejection: Option<ValidationResult>,
}

pub struct LlmExplainer {
    client: Box<dyn LLMClient>,
    config: ExplainerConfig,
}

impl LlmExplainer {
    pub fn new(client: Box<dyn LLMClient>, config: ExplainerConfig) -> Self {
        Self { client, config }
    }

    fn build_prompt(decision: &str, reasons: &[String], cart_total: f64, risk_score: f64) -> String {
        format!(
            "Decision: {decision}\nReason codes: {}\nCart total: ${cart_total:.2}\nRisk score: {risk_score:.3}",
            reasons.join(", ")
        )
    }

    /// Calls the LLM and runs the guardrail pipeline, falling back to
    /// `deterministic_fallback` (verbatim) whenever the LLM is unavailable
    /// or its completion is rejected.
    pub async fn explain(
        &self,
        decision: &str,
        reasons: &[String],
        cart_total: f64,
        risk_score: f64,
        deterministic_fallback: &str,
    ) -> ExplanationOutcome {
        let prompt = Self::build_prompt(decision, reasons, cart_total, risk_score);
        let request = LLMRequest::new(prompt, self.config.model.clone())
            .with_max_tokens(self.config.max_tokens)
            .with_system(SYSTEM_PROMPT.to_string());

        let call = tokio::time::timeout(self.config.timeout, self.client.call(request)).await;

        let raw = match call {
            Ok(Ok(response)) => response.content,
            Ok(Err(_)) | Err(_) => {
                return ExplanationOutcome {
                    text: deterministic_fallback.to_string(),
                    confidence: None,
                    key_factors: Vec::new(),
                    provenance: Provenance::ServiceUnavailable,
                    rejection: None,
                };
            }
        };

        let outcome = guardrail::evaluate(&raw, reasons, self.config.refuse_on_uncertainty);
        match outcome.payload {
            Some(payload) if outcome.result == ValidationResult::Valid => ExplanationOutcome {
                text: payload.explanation,
                confidence: Some(payload.confidence),
                key_factors: payload.key_factors,
                provenance: Provenance::Llm,
                rejection: None,
            },
            _ => ExplanationOutcome {
                text: deterministic_fallback.to_string(),
                confidence: None,
                key_factors: Vec::new(),
                provenance: Provenance::GuardrailRefusal,
                rejection: Some(outcome.result),
            },
        }
    }
}
