//! Receipt Hasher (§4.7): a stable SHA-256 digest of a decision contract,
//! computed over a sanitized, canonicalized view that excludes signing
//! material and anything timestamp-bearing that would vary between
//! otherwise-identical decisions.

use crate::canonical::{canonicalize, to_hex};
use orca_core::contract::DecisionContract;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};

/// `receipt_metadata` version tag. The Python reference implementation this
/// was distilled from stamps `"1.0.0"`; the written specification for this
/// system calls for `"1.0"`. We follow the specification since it is the
/// authoritative wire contract here.
pub const RECEIPT_METADATA_VERSION: &str = "1.0";
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Build the sanitized view that gets hashed: drops `signing`, drops
/// `payment.instrument_ref`, drops `intent.nonce`, and keeps only `id`/`quantity`
/// per cart item (§4.7 steps 1-6).
fn receipt_view(contract: &DecisionContract) -> serde_json::Value {
    json!({
        "ap2_version": contract.ap2_version,
        "intent": {
            "actor": contract.intent.actor,
            "intent_type": contract.intent.intent_type,
            "channel": contract.intent.channel,
            "agent_presence": contract.intent.agent_presence,
            "timestamps": {
                "created": contract.intent.timestamps.created,
                "expires": contract.intent.timestamps.expires,
            },
        },
        "cart": {
            "items": contract.cart.items.iter()
                .map(|item| json!({"id": item.id, "quantity": item.quantity}))
                .collect::<Vec<_>>(),
            "amount": contract.cart.amount,
            "currency": contract.cart.currency,
            "mcc": contract.cart.mcc,
            "geo": contract.cart.geo,
        },
        "payment": {
            "modality": contract.payment.modality,
            "auth_requirements": contract.payment.auth_requirements,
        },
        "decision": {
            "result": contract.decision.result,
            "risk_score": contract.decision.risk_score,
            "reasons": contract.decision.reasons,
            "actions": contract.decision.actions,
            "meta": {
                "model": contract.decision.meta.model,
                "version": contract.decision.meta.version,
                "processing_time_ms": contract.decision.meta.processing_time_ms,
                "trace_id": contract.decision.meta.trace_id,
            },
        },
        "receipt_metadata": {
            "version": RECEIPT_METADATA_VERSION,
            "hash_algorithm": HASH_ALGORITHM,
        },
    })
}

/// A 64-character hex SHA-256 digest of a decision's sanitized canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub trace_id: String,
    pub receipt_hash: String,
}

impl Receipt {
    pub fn compute(trace_id: &str, contract: &DecisionContract) -> Self {
        let canonical = canonicalize(&receipt_view(contract));
        let digest = Sha256::digest(canonical.as_bytes());
        Self {
            trace_id: trace_id.to_string(),
            receipt_hash: to_hex(&digest),
        }
    }

    /// One-line human summary, used in logs and CLI output.
    pub fn summary(&self) -> String {
        format!("{}: {}", self.trace_id, self.receipt_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orca_core::contract::{Cart, ContractMeta, DecisionSection, Intent, IntentTimestamps, Payment, Signing};

    fn contract() -> DecisionContract {
        DecisionContract {
            ap2_version: "ap2.v1".to_string(),
            intent: Intent {
                actor: "customer".to_string(),
                intent_type: "checkout".to_string(),
                channel: "online".to_string(),
                agent_presence: "human_present".to_string(),
                timestamps: IntentTimestamps {
                    created: "2026-01-01T00:00:00Z".to_string(),
                    expires: "2026-01-02T00:00:00Z".to_string(),
                },
                nonce: "should-not-affect-hash".to_string(),
            },
            cart: Cart {
                items: vec![],
                amount: "100.00".to_string(),
                currency: "USD".to_string(),
                mcc: None,
                geo: None,
            },
            payment: Payment {
                instrument_ref: Some("tok_live_should_not_affect_hash".to_string()),
                modality: "Card".to_string(),
                auth_requirements: vec!["cvv".to_string()],
            },
            decision: DecisionSection {
                result: "APPROVE".to_string(),
                risk_score: 0.1,
                reasons: vec!["ok".to_string()],
                actions: vec!["Process payment".to_string()],
                meta: ContractMeta {
                    model: "orca-core".to_string(),
                    version: "stub-0.1.0".to_string(),
                    processing_time_ms: 12,
                    trace_id: "txn_abc123".to_string(),
                },
            },
            signing: Signing::default(),
        }
    }

    #[test]
    fn hash_is_64_hex_characters() {
        let receipt = Receipt::compute("txn_abc123", &contract());
        assert_eq!(receipt.receipt_hash.len(), 64);
        assert!(receipt.receipt_hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_is_stable_and_ignores_nonce_and_instrument_ref() {
        let mut mutated = contract();
        mutated.intent.nonce = "different-nonce".to_string();
        mutated.payment.instrument_ref = Some("tok_different".to_string());

        let a = Receipt::compute("txn_abc123", &contract());
        let b = Receipt::compute("txn_abc123", &mutated);
        assert_eq!(a.receipt_hash, b.receipt_hash);
    }

    #[test]
    fn hash_changes_when_cart_mcc_or_geo_changes() {
        let mut mutated = contract();
        mutated.cart.mcc = Some("5999".to_string());
        mutated.cart.geo = Some(orca_core::contract::CartGeo {
            ip_country: Some("US".to_string()),
            billing_country: Some("US".to_string()),
        });

        let a = Receipt::compute("txn_abc123", &contract());
        let b = Receipt::compute("txn_abc123", &mutated);
        assert_ne!(a.receipt_hash, b.receipt_hash);
    }

    #[test]
    fn hash_changes_when_decision_changes() {
        let mut mutated = contract();
        mutated.decision.result = "DECLINE".to_string();

        let a = Receipt::compute("txn_abc123", &contract());
        let b = Receipt::compute("txn_abc123", &mutated);
        assert_ne!(a.receipt_hash, b.receipt_hash);
    }
}
