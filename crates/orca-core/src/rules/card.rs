//! Card-rail-specific rules (§4.3).

use super::{Rule, RuleOutcome, RuleRegistry};
use crate::decision::RuleHint;
use crate::features::DerivedFeatures;
use crate::request::{DecisionRequest, Rail};

/// Declines high-value Card transactions outright.
pub struct CardHighTicketRule {
    pub threshold: f64,
}

impl Default for CardHighTicketRule {
    fn default() -> Self {
        Self { threshold: 5000.0 }
    }
}

impl Rule for CardHighTicketRule {
    fn name(&self) -> &'static str {
        "CARD_HIGH_TICKET"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        if request.rail != Rail::Card || request.cart_total <= self.threshold {
            return None;
        }
        Some(
            RuleOutcome::new(self.name())
                .with_hint(RuleHint::Decline)
                .with_reason("high_ticket")
                .with_action("manual_review"),
        )
    }
}

/// Declines high-velocity Card transactions outright.
pub struct CardVelocityRule {
    pub threshold: f64,
}

impl Default for CardVelocityRule {
    fn default() -> Self {
        Self { threshold: 4.0 }
    }
}

impl Rule for CardVelocityRule {
    fn name(&self) -> &'static str {
        "CARD_VELOCITY"
    }

    fn apply(&self, request: &DecisionRequest, features: &DerivedFeatures) -> Option<RuleOutcome> {
        if request.rail != Rail::Card {
            return None;
        }
        if features.get_or("velocity_24h", 0.0) <= self.threshold {
            return None;
        }
        Some(
            RuleOutcome::new(self.name())
                .with_hint(RuleHint::Decline)
                .with_reason("velocity_flag")
                .with_action("block_transaction"),
        )
    }
}

/// Applies channel-specific handling for Card transactions: step-up auth for
/// large online purchases, straight-through processing at point of sale.
#[derive(Default)]
pub struct CardChannelRule {
    pub online_threshold: f64,
}

impl Rule for CardChannelRule {
    fn name(&self) -> &'static str {
        "CARD_CHANNEL"
    }

    fn apply(&self, request: &DecisionRequest, _features: &DerivedFeatures) -> Option<RuleOutcome> {
        if request.rail != Rail::Card {
            return None;
        }
        match request.channel {
            crate::request::Channel::Online => {
                let threshold = if self.online_threshold > 0.0 {
                    self.online_threshold
                } else {
                    1000.0
                };
                if request.cart_total > threshold {
                    Some(
                        RuleOutcome::new(self.name())
                            .with_hint(RuleHint::Review)
                            .with_reason("online_verification")
                            .with_action("step_up_auth"),
                    )
                } else {
                    None
                }
            }
            crate::request::Channel::Pos => {
                Some(RuleOutcome::new(self.name()).with_action("pos_processing"))
            }
        }
    }
}

pub(super) fn register_all(registry: &mut RuleRegistry) {
    registry
        .register(Box::new(CardHighTicketRule::default()))
        .register(Box::new(CardVelocityRule::default()))
        .register(Box::new(CardChannelRule::default()));
}
