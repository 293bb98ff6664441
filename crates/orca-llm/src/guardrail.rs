//! Guardrail pipeline for LLM-generated explanations (§4.5).
//!
//! Five stages run in order: markdown-fence stripping, JSON-schema
//! validation, hallucination detection, content-policy validation, and
//! uncertainty detection. Any stage failing short-circuits to a rejection;
//! the caller falls back to the deterministic narrative.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationResult {
    Valid,
    SchemaViolation,
    Hallucination,
    ContentViolation,
    UncertaintyRefusal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExplanationPayload {
    pub explanation: String,
    pub confidence: f64,
    #[serde(default)]
    pub key_factors: Vec<String>,
}

pub struct GuardrailOutcome {
    pub result: ValidationResult,
    pub payload: Option<ExplanationPayload>,
}

fn ssn_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b\d{3}-\d{2}-\d{4}\b").unwrap())
}

fn legal_advice_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(consult (a|an|your) lawyer|legal advice|seek legal counsel)").unwrap())
}

/// Matches absolute-certainty claims the content policy rejects outright.
/// Bare "guarantee(d)" is deliberately excluded here: it is softened by
/// [`sanitize`] rather than blocked, so only the stronger absolute phrasings
/// ("100% certain", "always approved", "never declined") trip this stage.
fn guarantee_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(100% certain|always approved|never declined)").unwrap())
}

fn uncertainty_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(i'?m not sure|i cannot determine|might be|possibly|unclear whether)").unwrap()
    })
}

/// Strip a leading/trailing ```json ... ``` fence if present.
pub fn extract_json_from_markdown(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.trim_end_matches("```").trim().to_string()
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.trim_end_matches("```").trim().to_string()
    } else {
        trimmed.to_string()
    }
}

fn validate_schema(raw: &str) -> Result<ExplanationPayload, ValidationResult> {
    let payload: ExplanationPayload = serde_json::from_str(raw).map_err(|_| ValidationResult::SchemaViolation)?;
    if !(10..=2000).contains(&payload.explanation.len()) {
        return Err(ValidationResult::SchemaViolation);
    }
    if !(0.0..=1.0).contains(&payload.confidence) {
        return Err(ValidationResult::SchemaViolation);
    }
    if payload.key_factors.len() > 10 {
        return Err(ValidationResult::SchemaViolation);
    }
    Ok(payload)
}

/// Reject explanations that invent reason codes the decision never produced,
/// or that never reference any actual reason code at all.
fn detect_hallucinations(payload: &ExplanationPayload, known_reason_codes: &[String]) -> bool {
    if known_reason_codes.is_empty() {
        return false;
    }
    let known_upper: Vec<String> = known_reason_codes.iter().map(|c| c.to_ascii_uppercase()).collect();
    let has_fabricated = payload
        .key_factors
        .iter()
        .any(|factor| !known_upper.contains(&factor.to_ascii_uppercase()));
    let references_any = known_upper
        .iter()
        .any(|code| payload.explanation.to_ascii_uppercase().contains(code.as_str()))
        || payload.key_factors.iter().any(|f| known_upper.contains(&f.to_ascii_uppercase()));
    has_fabricated || !references_any
}

fn validate_content(text: &str) -> bool {
    !ssn_pattern().is_match(text) && !legal_advice_pattern().is_match(text) && !guarantee_pattern().is_match(text)
}

fn detect_uncertainty(payload: &ExplanationPayload, refuse_on_uncertainty: bool) -> bool {
    refuse_on_uncertainty && (payload.confidence < 0.5 || uncertainty_pattern().is_match(&payload.explanation))
}

/// Redact PII and soften absolute phrasing in an already-accepted explanation.
pub fn sanitize(text: &str) -> String {
    let redacted = ssn_pattern().replace_all(text, "[REDACTED]").to_string();
    let softened = redacted
        .replace("guaranteed", "likely")
        .replace("Guaranteed", "Likely")
        .replace("exactly", "approximately")
        .replace("should consult", "may wish to review with");
    softened
}

/// Run the full guardrail pipeline over a raw LLM completion.
pub fn evaluate(raw_completion: &str, known_reason_codes: &[String], refuse_on_uncertainty: bool) -> GuardrailOutcome {
    let stripped = extract_json_from_markdown(raw_completion);

    let payload = match validate_schema(&stripped) {
        Ok(payload) => payload,
        Err(result) => return GuardrailOutcome { result, payload: None },
    };

    if detect_hallucinations(&payload, known_reason_codes) {
        return GuardrailOutcome { result: ValidationResult::Hallucination, payload: None };
    }

    if !validate_content(&payload.explanation) {
        return GuardrailOutcome { result: ValidationResult::ContentViolation, payload: None };
    }

    if detect_uncertainty(&payload, refuse_on_uncertainty) {
        return GuardrailOutcome { result: ValidationResult::UncertaintyRefusal, payload: None };
    }

    let sanitized = ExplanationPayload {
        explanation: sanitize(&payload.explanation),
        confidence: payload.confidence,
        key_factors: payload.key_factors,
    };
    GuardrailOutcome { result: ValidationResult::Valid, payload: Some(sanitized) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reasons() -> Vec<String> {
        vec!["HIGH_TICKET".to_string(), "VELOCITY".to_string()]
    }

    fn good_json() -> String {
        r#"{"explanation":"Declined due to HIGH_TICKET: the cart total exceeded policy.","confidence":0.8,"key_factors":["HIGH_TICKET"]}"#.to_string()
    }

    #[test]
    fn strips_markdown_code_fence() {
        let fenced = format!("```json\n{}\n```", good_json());
        assert_eq!(extract_json_from_markdown(&fenced), good_json());
    }

    #[test]
    fn accepts_well_formed_grounded_explanation() {
        let outcome = evaluate(&good_json(), &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::Valid);
        assert!(outcome.payload.is_some());
    }

    #[test]
    fn rejects_explanation_shorter_than_ten_characters() {
        let raw = r#"{"explanation":"short","confidence":0.8,"key_factors":[]}"#;
        let outcome = evaluate(raw, &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::SchemaViolation);
    }

    #[test]
    fn rejects_fabricated_reason_code() {
        let raw = r#"{"explanation":"Declined due to FABRICATED_CODE risk factor.","confidence":0.8,"key_factors":["FABRICATED_CODE"]}"#;
        let outcome = evaluate(raw, &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::Hallucination);
    }

    #[test]
    fn rejects_explanation_with_no_context_reference() {
        let raw = r#"{"explanation":"This transaction looks totally fine to me honestly.","confidence":0.8,"key_factors":[]}"#;
        let outcome = evaluate(raw, &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::Hallucination);
    }

    #[test]
    fn rejects_pii_in_explanation() {
        let raw = r#"{"explanation":"Customer SSN 123-45-6789 triggered HIGH_TICKET review.","confidence":0.8,"key_factors":["HIGH_TICKET"]}"#;
        let outcome = evaluate(raw, &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::ContentViolation);
    }

    #[test]
    fn rejects_legal_advice_phrasing() {
        let raw = r#"{"explanation":"Due to HIGH_TICKET you should consult a lawyer immediately.","confidence":0.8,"key_factors":["HIGH_TICKET"]}"#;
        let outcome = evaluate(raw, &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::ContentViolation);
    }

    #[test]
    fn rejects_guarantee_phrasing() {
        let raw = r#"{"explanation":"HIGH_TICKET transactions like this are always approved.","confidence":0.8,"key_factors":["HIGH_TICKET"]}"#;
        let outcome = evaluate(raw, &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::ContentViolation);
    }

    #[test]
    fn rejects_low_confidence_when_refuse_on_uncertainty_enabled() {
        let raw = r#"{"explanation":"HIGH_TICKET might be the cause, I'm not sure.","confidence":0.3,"key_factors":["HIGH_TICKET"]}"#;
        let outcome = evaluate(raw, &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::UncertaintyRefusal);
    }

    #[test]
    fn sanitizes_absolute_phrasing_in_accepted_output() {
        let raw = r#"{"explanation":"HIGH_TICKET guaranteed exactly this outcome.","confidence":0.9,"key_factors":["HIGH_TICKET"]}"#;
        let outcome = evaluate(raw, &reasons(), true);
        assert_eq!(outcome.result, ValidationResult::Valid);
        let text = outcome.payload.unwrap().explanation;
        assert!(!text.to_ascii_lowercase().contains("guaranteed"));
    }
}
