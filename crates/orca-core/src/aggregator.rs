//! Decision Aggregator (§4.4) — combines rule outcomes and the risk score
//! into a single decision using fixed precedence rules.

use crate::decision::{Decision, RoutingHint, Status};
use crate::request::DecisionRequest;
use crate::rules::RuleOutcome;

/// Result of aggregating rule outcomes with the risk score.
#[derive(Debug, Clone)]
pub struct AggregatedDecision {
    pub decision: Decision,
    pub status: Status,
    pub reasons: Vec<String>,
    pub actions: Vec<String>,
    pub signals_triggered: Vec<String>,
    pub routing_hint: RoutingHint,
    /// Set only when the APPROVE default reason was synthesized (step 5).
    pub approved_amount: Option<f64>,
}

fn dedup_preserve_order(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

fn routing_hint_for_approval(payment_method: Option<&str>) -> RoutingHint {
    match payment_method.map(|s| s.to_ascii_lowercase()) {
        Some(pm) if pm == "visa" || pm == "mastercard" || pm == "amex" => RoutingHint::RouteToVisaNetwork,
        Some(pm) if pm == "ach" || pm == "bank_transfer" => RoutingHint::RouteToAchNetwork,
        _ => RoutingHint::ProcessNormally,
    }
}

/// Aggregate rule outcomes and a clamped risk score into a final decision.
///
/// `high_risk_threshold` defaults to `0.80` (§4.3 `HIGH_RISK` rule / §4.4 step 3).
pub fn aggregate(
    request: &DecisionRequest,
    rule_outcomes: &[RuleOutcome],
    risk_score: f64,
    high_risk_threshold: f64,
) -> AggregatedDecision {
    let mut decision = Decision::Approve;
    let mut signals_triggered: Vec<String> = Vec::new();

    for outcome in rule_outcomes {
        signals_triggered.push(outcome.name.to_string());
        if let Some(hint) = outcome.decision_hint {
            decision = decision.max(hint.into());
        }
    }

    let mut reasons: Vec<String> = rule_outcomes.iter().flat_map(|o| o.reasons.clone()).collect();
    let mut actions: Vec<String> = rule_outcomes.iter().flat_map(|o| o.actions.clone()).collect();

    if risk_score > high_risk_threshold && decision != Decision::Decline {
        decision = Decision::Decline;
        reasons.push(format!(
            "HIGH_RISK: ML risk score {risk_score:.3} exceeds {high_risk_threshold:.3} threshold"
        ));
        reasons.push("ml_score_high".to_string());
        actions.push("BLOCK".to_string());
        signals_triggered.push("HIGH_RISK".to_string());
    }

    reasons = dedup_preserve_order(reasons);
    actions = dedup_preserve_order(actions);

    let mut approved_amount = None;
    if decision == Decision::Approve && reasons.is_empty() {
        reasons.push(format!(
            "Cart total ${:.2} within approved threshold",
            request.cart_total
        ));
        actions.push("Process payment".to_string());
        actions.push("Send confirmation".to_string());
        approved_amount = Some(request.cart_total);
    }

    let routing_hint = match decision {
        Decision::Decline => RoutingHint::BlockTransaction,
        Decision::Review => RoutingHint::RouteToManualReview,
        Decision::Approve => routing_hint_for_approval(request.payment_method().as_deref()),
    };

    AggregatedDecision {
        status: Status::from(decision),
        decision,
        reasons,
        actions,
        signals_triggered,
        routing_hint,
        approved_amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::RuleHint;
    use serde_json::json;

    fn req(value: serde_json::Value) -> DecisionRequest {
        serde_json::from_value(value).unwrap()
    }

    fn outcome(name: &'static str, hint: Option<RuleHint>, reason: &str, action: &str) -> RuleOutcome {
        RuleOutcome {
            name,
            decision_hint: hint,
            reasons: vec![reason.to_string()],
            actions: vec![action.to_string()],
        }
    }

    #[test]
    fn decline_beats_review() {
        let request = req(json!({"cart_total": 100.0}));
        let outcomes = vec![
            outcome("A", Some(RuleHint::Review), "review-reason", "act1"),
            outcome("B", Some(RuleHint::Decline), "decline-reason", "act2"),
        ];
        let result = aggregate(&request, &outcomes, 0.0, 0.80);
        assert_eq!(result.decision, Decision::Decline);
        assert_eq!(result.reasons, vec!["review-reason".to_string(), "decline-reason".to_string()]);
    }

    #[test]
    fn high_risk_exact_boundary_not_triggered() {
        let request = req(json!({"cart_total": 100.0}));
        let result = aggregate(&request, &[], 0.80, 0.80);
        assert_eq!(result.decision, Decision::Approve);
    }

    #[test]
    fn high_risk_above_boundary_declines() {
        let request = req(json!({"cart_total": 100.0}));
        let result = aggregate(&request, &[], 0.8001, 0.80);
        assert_eq!(result.decision, Decision::Decline);
        assert!(result.reasons[0].contains("HIGH_RISK"));
        assert!(result.actions.contains(&"BLOCK".to_string()));
    }

    #[test]
    fn empty_request_synthesizes_default_approval() {
        let request = req(json!({"cart_total": 250.0}));
        let result = aggregate(&request, &[], 0.1, 0.80);
        assert_eq!(result.decision, Decision::Approve);
        assert!(result.reasons[0].contains("within approved threshold"));
        assert_eq!(result.approved_amount, Some(250.0));
    }

    #[test]
    fn reasons_and_actions_are_deduplicated_preserving_order() {
        let request = req(json!({"cart_total": 100.0}));
        let outcomes = vec![
            outcome("A", Some(RuleHint::Review), "same-reason", "same-action"),
            outcome("B", Some(RuleHint::Review), "same-reason", "same-action"),
        ];
        let result = aggregate(&request, &outcomes, 0.0, 0.80);
        assert_eq!(result.reasons, vec!["same-reason".to_string()]);
        assert_eq!(result.actions, vec!["same-action".to_string()]);
    }

    #[test]
    fn approve_routes_by_payment_method_case_insensitively() {
        let request = req(json!({"cart_total": 100.0, "context": {"payment_method": "VISA"}}));
        let result = aggregate(&request, &[], 0.0, 0.80);
        assert_eq!(result.routing_hint, RoutingHint::RouteToVisaNetwork);

        let request = req(json!({"cart_total": 100.0, "context": {"payment_method": "bank_transfer"}}));
        let result = aggregate(&request, &[], 0.0, 0.80);
        assert_eq!(result.routing_hint, RoutingHint::RouteToAchNetwork);

        let request = req(json!({"cart_total": 100.0}));
        let result = aggregate(&request, &[], 0.0, 0.80);
        assert_eq!(result.routing_hint, RoutingHint::ProcessNormally);
    }
}
