//! ACH-rail-specific rules (§4.3).

use super::{Rule, RuleOutcome, RuleRegistry};
use crate::decision::RuleHint;
use crate::features::DerivedFeatures;
use crate::request::{DecisionRequest, Rail};

/// Enforces the ACH per-transaction limit.
pub struct AchLimitRule {
    pub limit: f64,
}

impl Default for AchLimitRule {
    fn default() -> Self {
        Self { limit: 2000.0 }
    }
}

impl Rule for AchLimitRule {
    fn name(&self) -> &'static str {
        "ACH_LIMIT"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        if request.rail != Rail::ACH || request.cart_total <= self.limit {
            return None;
        }
        Some(
            RuleOutcome::new(self.name())
                .with_hint(RuleHint::Decline)
                .with_reason("ach_limit_exceeded")
                .with_action("fallback_card"),
        )
    }
}

/// Declines ACH transactions with a location mismatch (ACH cannot be stepped up like Card).
#[derive(Default)]
pub struct AchLocationMismatchRule;

impl Rule for AchLocationMismatchRule {
    fn name(&self) -> &'static str {
        "ACH_LOCATION_MISMATCH"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        if request.rail != Rail::ACH {
            return None;
        }
        let explicit_mismatch = request.location_mismatch_flag();
        let ip = request.location_ip_country().unwrap_or("");
        let billing = request.billing_country().unwrap_or("");
        let derived_mismatch = !ip.is_empty() && !billing.is_empty() && ip != billing;

        if explicit_mismatch || derived_mismatch {
            Some(
                RuleOutcome::new(self.name())
                    .with_hint(RuleHint::Decline)
                    .with_reason("location_mismatch")
                    .with_action("fallback_card"),
            )
        } else {
            None
        }
    }
}

/// Applies channel-specific handling for ACH transactions: micro-deposit
/// verification for large online transfers, straight-through at point of sale.
#[derive(Default)]
pub struct AchChannelRule {
    pub online_threshold: f64,
}

impl Rule for AchChannelRule {
    fn name(&self) -> &'static str {
        "ACH_CHANNEL"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        if request.rail != Rail::ACH {
            return None;
        }
        match request.channel {
            crate::request::Channel::Online => {
                let threshold = if self.online_threshold > 0.0 {
                    self.online_threshold
                } else {
                    500.0
                };
                if request.cart_total > threshold {
                    Some(
                        RuleOutcome::new(self.name())
                            .with_hint(RuleHint::Review)
                            .with_reason("ach_online_verification")
                            .with_action("micro_deposit_verification"),
                    )
                } else {
                    None
                }
            }
            crate::request::Channel::Pos => {
                Some(RuleOutcome::new(self.name()).with_action("ach_pos_processing"))
            }
        }
    }
}

pub(super) fn register_all(registry: &mut RuleRegistry) {
    registry
        .register(Box::new(AchLimitRule::default()))
        .register(Box::new(AchLocationMismatchRule))
        .register(Box::new(AchChannelRule::default()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(value: serde_json::Value) -> DecisionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn ach_limit_declines_above_threshold() {
        let rule = AchLimitRule::default();
        let request = req(json!({"cart_total": 2500.0, "rail": "ACH"}));
        let outcome = rule.apply(&request, &DerivedFeatures::default()).unwrap();
        assert_eq!(outcome.reasons, vec!["ach_limit_exceeded".to_string()]);
        assert_eq!(outcome.actions, vec!["fallback_card".to_string()]);
    }

    #[test]
    fn ach_location_mismatch_from_explicit_flag() {
        let rule = AchLocationMismatchRule;
        let request = req(json!({
            "cart_total": 10.0,
            "rail": "ACH",
            "context": {"location_mismatch": true}
        }));
        assert!(rule.apply(&request, &DerivedFeatures::default()).is_some());
    }
}
