//! General-purpose built-in rules (§4.3), independent of payment rail.

use super::{Rule, RuleOutcome, RuleRegistry};
use crate::decision::RuleHint;
use crate::features::DerivedFeatures;
use crate::request::DecisionRequest;

/// Flags high-value transactions for review.
pub struct HighTicketRule {
    pub threshold: f64,
}

impl Default for HighTicketRule {
    fn default() -> Self {
        Self { threshold: 500.0 }
    }
}

impl Rule for HighTicketRule {
    fn name(&self) -> &'static str {
        "HIGH_TICKET"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        if request.cart_total > self.threshold {
            Some(
                RuleOutcome::new(self.name())
                    .with_hint(RuleHint::Review)
                    .with_reason(format!(
                        "HIGH_TICKET: Cart total ${:.2} exceeds ${:.2} threshold",
                        request.cart_total, self.threshold
                    ))
                    .with_action("ROUTE_TO_REVIEW"),
            )
        } else {
            None
        }
    }
}

/// Flags high-velocity transactions for review.
pub struct VelocityRule {
    pub threshold: f64,
}

impl Default for VelocityRule {
    fn default() -> Self {
        Self { threshold: 3.0 }
    }
}

impl Rule for VelocityRule {
    fn name(&self) -> &'static str {
        "VELOCITY"
    }

    fn apply(&self, _request: &DecisionRequest, features: &DerivedFeatures) -> Option<RuleOutcome> {
        let velocity = features.get_or("velocity_24h", 0.0);
        if velocity > self.threshold {
            Some(
                RuleOutcome::new(self.name())
                    .with_hint(RuleHint::Review)
                    .with_reason(format!(
                        "VELOCITY_FLAG: 24h velocity {} exceeds {} threshold",
                        velocity, self.threshold
                    ))
                    .with_action("ROUTE_TO_REVIEW"),
            )
        } else {
            None
        }
    }
}

/// Flags transactions whose IP country differs from the billing country.
#[derive(Default)]
pub struct LocationMismatchRule;

impl Rule for LocationMismatchRule {
    fn name(&self) -> &'static str {
        "LOCATION_MISMATCH"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        let ip = request.location_ip_country()?;
        let billing = request.billing_country()?;
        if !ip.is_empty() && !billing.is_empty() && ip != billing {
            Some(
                RuleOutcome::new(self.name())
                    .with_hint(RuleHint::Review)
                    .with_reason(format!(
                        "LOCATION_MISMATCH: IP country '{ip}' differs from billing country '{billing}'"
                    ))
                    .with_action("ROUTE_TO_REVIEW"),
            )
        } else {
            None
        }
    }
}

/// Flags transactions originating from a high-risk IP distance.
#[derive(Default)]
pub struct HighIpDistanceRule;

impl Rule for HighIpDistanceRule {
    fn name(&self) -> &'static str {
        "HIGH_IP_DISTANCE"
    }

    fn apply(&self, _request: &DecisionRequest, features: &DerivedFeatures) -> Option<RuleOutcome> {
        if features.get_or("high_ip_distance", 0.0) > 0.0 {
            Some(
                RuleOutcome::new(self.name())
                    .with_hint(RuleHint::Review)
                    .with_reason("HIGH_IP_DISTANCE: Transaction originates from high-risk IP distance")
                    .with_action("ROUTE_TO_REVIEW"),
            )
        } else {
            None
        }
    }
}

/// Flags customers with recent chargeback history.
#[derive(Default)]
pub struct ChargebackHistoryRule;

impl Rule for ChargebackHistoryRule {
    fn name(&self) -> &'static str {
        "CHARGEBACK_HISTORY"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        let chargebacks = request.chargebacks_12m();
        if chargebacks > 0.0 {
            Some(
                RuleOutcome::new(self.name())
                    .with_hint(RuleHint::Review)
                    .with_reason(format!(
                        "CHARGEBACK_HISTORY: Customer has {chargebacks} chargeback(s) in last 12 months"
                    ))
                    .with_action("ROUTE_TO_REVIEW"),
            )
        } else {
            None
        }
    }
}

/// Adds a loyalty-boost action for premium customers. Never changes the decision hint.
#[derive(Default)]
pub struct LoyaltyBoostRule;

impl Rule for LoyaltyBoostRule {
    fn name(&self) -> &'static str {
        "LOYALTY_BOOST"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        let tier = request.loyalty_tier()?;
        if tier == "GOLD" || tier == "PLATINUM" {
            Some(
                RuleOutcome::new(self.name())
                    .with_reason(format!("LOYALTY_BOOST: Customer has {tier} loyalty tier"))
                    .with_action("LOYALTY_BOOST"),
            )
        } else {
            None
        }
    }
}

/// Flags carts with an unusually high item count for review.
pub struct ItemCountRule {
    pub threshold: f64,
}

impl Default for ItemCountRule {
    fn default() -> Self {
        Self { threshold: 10.0 }
    }
}

impl Rule for ItemCountRule {
    fn name(&self) -> &'static str {
        "ITEM_COUNT"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        let item_count = request.item_count();
        if item_count > self.threshold {
            Some(
                RuleOutcome::new(self.name())
                    .with_hint(RuleHint::Review)
                    .with_reason(format!(
                        "ITEM_COUNT: Cart has {item_count} items, exceeds {} threshold",
                        self.threshold
                    ))
                    .with_action("ROUTE_TO_REVIEW"),
            )
        } else {
            None
        }
    }
}

pub(super) fn register_all(registry: &mut RuleRegistry) {
    registry
        .register(Box::new(HighTicketRule::default()))
        .register(Box::new(VelocityRule::default()))
        .register(Box::new(LocationMismatchRule))
        .register(Box::new(HighIpDistanceRule))
        .register(Box::new(ChargebackHistoryRule))
        .register(Box::new(LoyaltyBoostRule))
        .register(Box::new(ItemCountRule::default()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(value: serde_json::Value) -> DecisionRequest {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn high_ticket_boundary_at_500() {
        let rule = HighTicketRule::default();
        let features = DerivedFeatures::default();

        let at = req(json!({"cart_total": 500.0}));
        assert!(rule.apply(&at, &features).is_none());

        let above = req(json!({"cart_total": 500.01}));
        assert!(rule.apply(&above, &features).is_some());
    }

    #[test]
    fn loyalty_boost_does_not_set_a_hint() {
        let rule = LoyaltyBoostRule;
        let request = req(json!({
            "cart_total": 1.0,
            "context": {"customer": {"loyalty_tier": "GOLD"}}
        }));
        let outcome = rule.apply(&request, &DerivedFeatures::default()).unwrap();
        assert!(outcome.decision_hint.is_none());
        assert_eq!(outcome.actions, vec!["LOYALTY_BOOST".to_string()]);
    }

    #[test]
    fn silver_tier_does_not_trigger_loyalty_boost() {
        let rule = LoyaltyBoostRule;
        let request = req(json!({
            "cart_total": 1.0,
            "context": {"customer": {"loyalty_tier": "SILVER"}}
        }));
        assert!(rule.apply(&request, &DerivedFeatures::default()).is_none());
    }
}
