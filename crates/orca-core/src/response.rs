//! Internal decision response (§3 `DecisionResponse`).
//!
//! This is the shape the orchestrator hands back to callers inside the
//! process; [`crate::contract::DecisionContract`] is the AP2-shaped wire
//! projection built from it.

use crate::decision::{Decision, RoutingHint, Status};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use std::collections::HashMap;

/// Typed mirror of the free-form `meta` bag, for callers that want fields
/// without parsing JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaStructured {
    pub risk_score: f64,
    pub risk_reason_codes: Vec<String>,
    pub risk_model_version: String,
    pub risk_model_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_model_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_amount: Option<f64>,
}

/// Internal decision response returned by the orchestrator (§3, §4.9).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub decision: Decision,
    pub status: Status,
    pub reasons: Vec<String>,
    pub actions: Vec<String>,
    pub signals_triggered: Vec<String>,
    pub routing_hint: RoutingHint,

    /// Free-form metadata bag, kept alongside `meta_structured` for
    /// callers that expect an open schema (§3).
    pub meta: HashMap<String, Json>,
    pub meta_structured: MetaStructured,

    pub explanation: String,
    pub explanation_human: String,

    /// Backward-compatible flat fields carried alongside the structured response.
    pub transaction_id: String,
    pub timestamp: String,
    pub cart_total: f64,
    pub rail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meta_structured_defaults_have_no_error() {
        let meta = MetaStructured::default();
        assert!(meta.risk_model_error.is_none());
        assert_eq!(meta.risk_score, 0.0);
    }

    #[test]
    fn response_round_trips_through_json() {
        let response = DecisionResponse {
            decision: Decision::Approve,
            status: Status::Approve,
            reasons: vec!["ok".into()],
            actions: vec!["Process payment".into()],
            signals_triggered: vec![],
            routing_hint: RoutingHint::ProcessNormally,
            meta: HashMap::new(),
            meta_structured: MetaStructured::default(),
            explanation: "Transaction approved for $10.00. Cart total within approved limits.".into(),
            explanation_human: "Final decision: APPROVE".into(),
            transaction_id: "txn_abc123".into(),
            timestamp: "2026-01-01T00:00:00Z".into(),
            cart_total: 10.0,
            rail: "Card".into(),
        };
        let json = serde_json::to_string(&response).unwrap();
        let back: DecisionResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(back.decision, Decision::Approve);
        assert_eq!(back.transaction_id, "txn_abc123");
    }
}
