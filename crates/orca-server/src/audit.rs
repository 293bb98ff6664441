//! Audit Subscriber sink (§4.10): receives CloudEvents emitted by the
//! decision engine, re-validates them, stores a content-hash receipt, and
//! emits an audit CloudEvent of its own carrying that receipt.
//!
//! Grounded on `weave/subscriber.py`'s `WeaveClient`/`WeaveReceipt`: the
//! monotonic block height and deterministic transaction hash are kept as a
//! mock ledger, since no real chain backend is in scope.

use orca_signing::canonical::{canonicalize, to_hex};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Receipt {
    pub trace_id: String,
    pub receipt_hash: String,
    pub event_type: String,
    pub timestamp: String,
    pub block_height: u64,
    pub transaction_hash: String,
    pub gas_used: u64,
    pub gas_price: String,
    pub status: String,
}

const GAS_USED: u64 = 21_000;
const GAS_PRICE: &str = "20000000000";

/// Content hash of a CloudEvent's `data` payload: `"sha256:" + hex(SHA-256(sort_keys(data)))`.
pub fn content_hash(data: &serde_json::Value) -> String {
    let serialized = canonicalize(data);
    let digest = Sha256::digest(serialized.as_bytes());
    format!("sha256:{}", to_hex(&digest))
}

fn transaction_hash(trace_id: &str, receipt_hash: &str) -> String {
    let digest = Sha256::digest(format!("{trace_id}_{receipt_hash}").as_bytes());
    format!("0x{}", to_hex(&digest))
}

/// In-memory receipt ledger keyed by trace id (§4.10: "an in-memory map is
/// acceptable"). A real chain backend would replace only `store`.
pub struct ReceiptStore {
    block_height: Mutex<u64>,
    receipts: Mutex<HashMap<String, Receipt>>,
}

impl Default for ReceiptStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReceiptStore {
    pub fn new() -> Self {
        Self { block_height: Mutex::new(1_000_000), receipts: Mutex::new(HashMap::new()) }
    }

    pub fn store(&self, trace_id: &str, event_type: &str, data: &serde_json::Value, now: chrono::DateTime<chrono::Utc>) -> Receipt {
        let receipt_hash = content_hash(data);
        let block_height = {
            let mut height = self.block_height.lock().unwrap_or_else(|e| e.into_inner());
            let current = *height;
            *height += 1;
            current
        };

        let receipt = Receipt {
            trace_id: trace_id.to_string(),
            receipt_hash: receipt_hash.clone(),
            event_type: event_type.to_string(),
            timestamp: now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            block_height,
            transaction_hash: transaction_hash(trace_id, &receipt_hash),
            gas_used: GAS_USED,
            gas_price: GAS_PRICE.to_string(),
            status: "success".to_string(),
        };

        self.receipts.lock().unwrap_or_else(|e| e.into_inner()).insert(trace_id.to_string(), receipt.clone());
        receipt
    }

    pub fn latest(&self, trace_id: &str) -> Option<Receipt> {
        self.receipts.lock().unwrap_or_else(|e| e.into_inner()).get(trace_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn content_hash_is_order_independent() {
        let a = json!({"b": 1, "a": 2});
        let b = json!({"a": 2, "b": 1});
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn store_increments_block_height_monotonically() {
        let store = ReceiptStore::new();
        let now = chrono::Utc::now();
        let r1 = store.store("txn_a", "decision", &json!({"x": 1}), now);
        let r2 = store.store("txn_b", "decision", &json!({"x": 2}), now);
        assert!(r2.block_height > r1.block_height);
        assert_eq!(r1.gas_used, 21_000);
        assert_eq!(r1.gas_price, "20000000000");
    }

    #[test]
    fn latest_returns_most_recently_stored_receipt_for_trace_id() {
        let store = ReceiptStore::new();
        let now = chrono::Utc::now();
        assert!(store.latest("txn_missing").is_none());
        store.store("txn_a", "decision", &json!({"x": 1}), now);
        assert!(store.latest("txn_a").is_some());
    }
}
