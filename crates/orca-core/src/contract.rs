//! Decision Contract Builder (§4.6) — the AP2-shaped wire projection of a
//! [`crate::response::DecisionResponse`].

use crate::error::Result;
use crate::request::DecisionRequest;
use crate::response::DecisionResponse;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

pub const AP2_VERSION: &str = "ap2.v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntentTimestamps {
    pub created: String,
    pub expires: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Intent {
    pub actor: String,
    pub intent_type: String,
    pub channel: String,
    pub agent_presence: String,
    pub timestamps: IntentTimestamps,
    pub nonce: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub quantity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartGeo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_country: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub items: Vec<CartItem>,
    /// Decimal string with exactly two digits (§4.6, §9 Open Questions).
    pub amount: String,
    pub currency: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mcc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<CartGeo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument_ref: Option<String>,
    pub modality: String,
    pub auth_requirements: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractMeta {
    pub model: String,
    pub version: String,
    pub processing_time_ms: u64,
    pub trace_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionSection {
    pub result: String,
    pub risk_score: f64,
    pub reasons: Vec<String>,
    pub actions: Vec<String>,
    pub meta: ContractMeta,
}

/// Side-data attached after hashing/signing; both fields start `null` (§4.7, §9).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Signing {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vc_proof: Option<Json>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_hash: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionContract {
    pub ap2_version: String,
    pub intent: Intent,
    pub cart: Cart,
    pub payment: Payment,
    pub decision: DecisionSection,
    pub signing: Signing,
}

fn decimal_amount(value: f64) -> String {
    format!("{value:.2}")
}

/// Build the AP2 wire contract for a decided transaction.
///
/// `trace_id` must already be validated to match `^txn_[A-Za-z0-9_-]+$`
/// (§4.8) by the caller; the contract builder trusts it verbatim.
pub fn build_contract(
    request: &DecisionRequest,
    response: &DecisionResponse,
    model_name: &str,
    trace_id: &str,
    now: DateTime<Utc>,
) -> Result<DecisionContract> {
    let actor = request.context_str("actor").unwrap_or("customer").to_string();
    let intent_type = request.context_str("intent_type").unwrap_or("checkout").to_string();
    let agent_presence = request.context_str("agent_presence").unwrap_or("human_present").to_string();

    let intent = Intent {
        actor,
        intent_type,
        channel: match request.channel {
            crate::request::Channel::Online => "online".to_string(),
            crate::request::Channel::Pos => "pos".to_string(),
        },
        agent_presence,
        timestamps: IntentTimestamps {
            created: now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            expires: (now + Duration::hours(24)).to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        },
        nonce: uuid::Uuid::new_v4().to_string(),
    };

    let geo = match (request.location_ip_country(), request.billing_country()) {
        (None, None) => None,
        (ip, billing) => Some(CartGeo {
            ip_country: ip.map(str::to_string),
            billing_country: billing.map(str::to_string),
        }),
    };

    let cart = Cart {
        items: Vec::new(),
        amount: decimal_amount(request.cart_total),
        currency: request.currency.clone(),
        mcc: request.context_str("mcc").map(str::to_string),
        geo,
    };

    let payment = Payment {
        instrument_ref: request.payment_method(),
        modality: request.rail.as_str().to_string(),
        auth_requirements: match request.rail {
            crate::request::Rail::Card => vec!["cvv".to_string()],
            crate::request::Rail::ACH => vec!["account_verification".to_string()],
        },
    };

    let decision = DecisionSection {
        result: response.decision.as_str().to_string(),
        risk_score: response.meta_structured.risk_score,
        reasons: response.reasons.clone(),
        actions: response.actions.clone(),
        meta: ContractMeta {
            model: model_name.to_string(),
            version: response.meta_structured.risk_model_version.clone(),
            processing_time_ms: 0,
            trace_id: trace_id.to_string(),
        },
    };

    Ok(DecisionContract {
        ap2_version: AP2_VERSION.to_string(),
        intent,
        cart,
        payment,
        decision,
        signing: Signing::default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decision::{Decision, RoutingHint, Status};
    use crate::response::MetaStructured;
    use serde_json::json;
    use std::collections::HashMap;

    fn request() -> DecisionRequest {
        serde_json::from_value(json!({
            "cart_total": 750.0,
            "rail": "Card",
            "channel": "online",
            "context": {"payment_method": "visa"}
        }))
        .unwrap()
    }

    fn response() -> DecisionResponse {
        DecisionResponse {
            decision: Decision::Review,
            status: Status::Route,
            reasons: vec!["HIGH_TICKET: Cart total $750.00 exceeds $500.00 threshold".into()],
            actions: vec!["ROUTE_TO_REVIEW".into()],
            signals_triggered: vec!["HIGH_TICKET".into()],
            routing_hint: RoutingHint::RouteToManualReview,
            meta: HashMap::new(),
            meta_structured: MetaStructured {
                risk_score: 0.4,
                risk_reason_codes: vec!["BASELINE".into()],
                risk_model_version: "stub-0.1.0".into(),
                risk_model_type: "stub".into(),
                risk_model_error: None,
                approved_amount: None,
            },
            explanation: "...".into(),
            explanation_human: "...".into(),
            transaction_id: "txn_abc123".into(),
            timestamp: "2026-01-01T00:00:00Z".into(),
            cart_total: 750.0,
            rail: "Card".into(),
        }
    }

    #[test]
    fn amount_is_formatted_with_two_decimals() {
        let contract = build_contract(&request(), &response(), "orca-core", "txn_abc123", Utc::now()).unwrap();
        assert_eq!(contract.cart.amount, "750.00");
    }

    #[test]
    fn signing_starts_unset() {
        let contract = build_contract(&request(), &response(), "orca-core", "txn_abc123", Utc::now()).unwrap();
        assert!(contract.signing.vc_proof.is_none());
        assert!(contract.signing.receipt_hash.is_none());
    }

    #[test]
    fn expires_is_24_hours_after_created() {
        let now = Utc::now();
        let contract = build_contract(&request(), &response(), "orca-core", "txn_abc123", now).unwrap();
        let created: DateTime<Utc> = contract.intent.timestamps.created.parse().unwrap();
        let expires: DateTime<Utc> = contract.intent.timestamps.expires.parse().unwrap();
        assert_eq!((expires - created).num_hours(), 24);
    }

    #[test]
    fn meta_carries_trace_id() {
        let contract = build_contract(&request(), &response(), "orca-core", "txn_abc123", Utc::now()).unwrap();
        assert_eq!(contract.decision.meta.trace_id, "txn_abc123");
    }
}
