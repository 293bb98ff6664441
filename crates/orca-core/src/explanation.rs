//! Explanation Composer (§4.5) — deterministic, template-based narrative.
//!
//! An optional LLM overlay lives in the `orca-llm` crate; the deterministic
//! narrative computed here is always available as a fallback (§9: "the LLM
//! call is an optional overlay, not a replacement").

use crate::decision::Decision;
use crate::request::DecisionRequest;

fn first_two_joined(reasons: &[String]) -> String {
    reasons.iter().take(2).cloned().collect::<Vec<_>>().join(", ")
}

/// Compose the short deterministic narrative (§4.5).
pub fn compose_explanation(decision: Decision, reasons: &[String], request: &DecisionRequest, risk_score: f64) -> String {
    match decision {
        Decision::Approve => format!(
            "Transaction approved for ${:.2}. Cart total within approved limits.",
            request.cart_total
        ),
        Decision::Decline if risk_score > 0.9 => {
            format!("Transaction declined due to high ML risk score of {risk_score:.3}.")
        }
        Decision::Decline => format!("Transaction declined due to: {}.", first_two_joined(reasons)),
        Decision::Review => format!("Transaction flagged for manual review due to: {}.", first_two_joined(reasons)),
    }
}

/// Extract the canonical code prefix of a reason string, e.g.
/// `"HIGH_TICKET: Cart total $750.00 exceeds $500.00 threshold"` -> `"HIGH_TICKET"`.
fn reason_code(reason: &str) -> &str {
    reason.split(':').next().unwrap_or(reason).trim()
}

fn gloss_for_code(code: &str) -> Option<&'static str> {
    match code {
        "HIGH_TICKET" | "high_ticket" => Some("The cart total was unusually high; flagged for review."),
        "VELOCITY" | "VELOCITY_FLAG" | "velocity_flag" => {
            Some("Transaction velocity over the last 24 hours exceeded the configured limit.")
        }
        "LOCATION_MISMATCH" | "location_mismatch" | "ACH_LOCATION_MISMATCH" => {
            Some("The IP-derived country did not match the billing country on file.")
        }
        "HIGH_IP_DISTANCE" => Some("The connecting IP address was geographically distant from prior activity."),
        "CHARGEBACK_HISTORY" => Some("The customer has chargebacks on file within the last 12 months."),
        "LOYALTY_BOOST" => Some("The customer's loyalty tier qualifies them for expedited processing."),
        "ITEM_COUNT" => Some("The cart contained an unusually large number of items."),
        "ach_limit_exceeded" | "ACH_LIMIT" => Some("The transaction amount exceeded the ACH per-transaction limit."),
        "online_verification" => Some("An online card purchase above the step-up threshold required additional verification."),
        "ach_online_verification" => Some("An online ACH transfer above the verification threshold requires a micro-deposit check."),
        "HIGH_RISK" | "ml_score_high" => Some("The machine-learned risk score exceeded the decline threshold."),
        _ => None,
    }
}

/// Compose the longer human phrasing: a sentence per distinct reason code,
/// followed by `Final decision: <label>` (§4.5).
pub fn compose_human_explanation(decision: Decision, reasons: &[String]) -> String {
    let mut sentences: Vec<String> = Vec::new();
    let mut seen = std::collections::HashSet::new();
    for reason in reasons {
        let code = reason_code(reason);
        if let Some(gloss) = gloss_for_code(code) {
            if seen.insert(code.to_string()) {
                sentences.push(gloss.to_string());
            }
        }
    }
    sentences.push(format!("Final decision: {}", decision.as_str()));
    sentences.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(value: serde_json::Value) -> DecisionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn approve_narrative_includes_cart_total() {
        let request = req(json!({"cart_total": 250.0}));
        let text = compose_explanation(Decision::Approve, &[], &request, 0.1);
        assert!(text.contains("$250.00"));
    }

    #[test]
    fn decline_above_point_nine_mentions_risk_score() {
        let request = req(json!({"cart_total": 100.0}));
        let text = compose_explanation(Decision::Decline, &[], &request, 0.95);
        assert!(text.contains("0.950"));
    }

    #[test]
    fn decline_otherwise_lists_first_two_reasons() {
        let request = req(json!({"cart_total": 100.0}));
        let reasons = vec!["ach_limit_exceeded".to_string(), "location_mismatch".to_string(), "extra".to_string()];
        let text = compose_explanation(Decision::Decline, &reasons, &request, 0.1);
        assert!(text.contains("ach_limit_exceeded, location_mismatch"));
        assert!(!text.contains("extra"));
    }

    #[test]
    fn human_explanation_ends_with_final_decision() {
        let reasons = vec!["HIGH_TICKET: Cart total $750.00 exceeds $500.00 threshold".to_string()];
        let text = compose_human_explanation(Decision::Review, &reasons);
        assert!(text.ends_with("Final decision: REVIEW"));
        assert!(text.contains("unusually high"));
    }
}
