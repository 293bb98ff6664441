//! Rule Registry (§4.3) — an ordered collection of independently-evaluable rules.
//!
//! Each rule is a small capability (a struct closing over its own thresholds)
//! rather than a class hierarchy, per §9. Rules are collected, not
//! short-circuited: every applicable rule contributes to reasons, actions
//! and signals.

mod ach;
mod builtins;
mod card;

use crate::decision::RuleHint;
use crate::features::DerivedFeatures;
use crate::request::DecisionRequest;

/// Outcome of a single rule evaluation (§3 RuleOutcome).
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub name: &'static str,
    pub decision_hint: Option<RuleHint>,
    pub reasons: Vec<String>,
    pub actions: Vec<String>,
}

impl RuleOutcome {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            decision_hint: None,
            reasons: Vec::new(),
            actions: Vec::new(),
        }
    }

    fn with_hint(mut self, hint: RuleHint) -> Self {
        self.decision_hint = Some(hint);
        self
    }

    fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions.push(action.into());
        self
    }
}

/// A single decision rule: a pure function of the request (and its derived features).
pub trait Rule: Send + Sync {
    /// Stable rule identifier, used in `signals_triggered`.
    fn name(&self) -> &'static str;

    /// Evaluate the rule. Returns `None` when the rule does not apply.
    fn apply(&self, request: &DecisionRequest, features: &DerivedFeatures) -> Option<RuleOutcome>;
}

/// Ordered registry of rules, evaluated in registration order for determinism.
pub struct RuleRegistry {
    rules: Vec<Box<dyn Rule>>,
}

impl RuleRegistry {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn register(&mut self, rule: Box<dyn Rule>) -> &mut Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate every registered rule against the request, in order. Every
    /// rule contributes independently; nothing is short-circuited.
    pub fn evaluate(&self, request: &DecisionRequest, features: &DerivedFeatures) -> Vec<RuleOutcome> {
        self.rules
            .iter()
            .filter_map(|rule| rule.apply(request, features))
            .collect()
    }

    /// The mandatory built-in rule set (§4.3 table) at its default thresholds.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_all(&mut registry);
        card::register_all(&mut registry);
        ach::register_all(&mut registry);
        registry
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(value: serde_json::Value) -> DecisionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn registry_evaluates_every_applicable_rule() {
        let registry = RuleRegistry::with_builtins();
        let request = req(json!({
            "cart_total": 750.0,
            "rail": "Card",
            "channel": "online",
            "features": {"velocity_24h": 1.0}
        }));
        let features = crate::features::extract_features(&request);
        let outcomes = registry.evaluate(&request, &features);
        let names: Vec<&str> = outcomes.iter().map(|o| o.name).collect();
        assert!(names.contains(&"HIGH_TICKET"));
    }

    #[test]
    fn empty_request_triggers_no_rules() {
        let registry = RuleRegistry::with_builtins();
        let request = req(json!({"cart_total": 0.0}));
        let features = crate::features::extract_features(&request);
        let outcomes = registry.evaluate(&request, &features);
        assert!(outcomes.is_empty());
    }
}
