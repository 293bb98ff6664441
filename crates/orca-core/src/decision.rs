//! Shared closed enumerations carried by tag rather than compared as strings (§9 design notes).

use serde::{Deserialize, Serialize};

/// Final decision outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    Approve,
    Review,
    Decline,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Review => "REVIEW",
            Decision::Decline => "DECLINE",
        }
    }

    /// Precedence ordering: Decline > Review > Approve.
    fn rank(&self) -> u8 {
        match self {
            Decision::Approve => 0,
            Decision::Review => 1,
            Decision::Decline => 2,
        }
    }

    /// Raise `self` to `other` if `other` outranks it.
    pub fn max(self, other: Decision) -> Decision {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }
}

/// A rule's hint: rules may only push the decision toward REVIEW or DECLINE, never APPROVE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleHint {
    Review,
    Decline,
}

impl From<RuleHint> for Decision {
    fn from(hint: RuleHint) -> Self {
        match hint {
            RuleHint::Review => Decision::Review,
            RuleHint::Decline => Decision::Decline,
        }
    }
}

/// External `status` projection of `decision` (§3, §9 Open Questions: kept for
/// backward compatibility alongside `decision`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Approve,
    Route,
    Decline,
}

impl From<Decision> for Status {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approve => Status::Approve,
            Decision::Review => Status::Route,
            Decision::Decline => Status::Decline,
        }
    }
}

/// Routing hint (§4.4) attached to the response for downstream processors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoutingHint {
    BlockTransaction,
    RouteToManualReview,
    RouteToVisaNetwork,
    RouteToAchNetwork,
    ProcessNormally,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decline_outranks_review_outranks_approve() {
        assert_eq!(Decision::Approve.max(Decision::Review), Decision::Review);
        assert_eq!(Decision::Review.max(Decision::Decline), Decision::Decline);
        assert_eq!(Decision::Decline.max(Decision::Approve), Decision::Decline);
        assert_eq!(Decision::Review.max(Decision::Approve), Decision::Review);
    }

    #[test]
    fn status_projects_review_to_route() {
        assert_eq!(Status::from(Decision::Approve), Status::Approve);
        assert_eq!(Status::from(Decision::Review), Status::Route);
        assert_eq!(Status::from(Decision::Decline), Status::Decline);
    }
}
