//! Receipt hashing and signing for the Orca decision engine (§4.7).
//!
//! Every decision gets a [`Receipt`] hash. When signing is enabled, the
//! receipt hash is additionally wrapped in an [`VcProof`]
//! (`Ed25519Signature2020`). Both are side-data attached to the contract
//! after the deterministic decision pipeline has already run (§9): this
//! crate never influences the decision itself.

pub mod canonical;
pub mod error;
pub mod keys;
pub mod receipt;
pub mod vc_proof;

pub use error::{Result, SigningError};
pub use keys::KeyManager;
pub use receipt::{Receipt, HASH_ALGORITHM, RECEIPT_METADATA_VERSION};
pub use vc_proof::{sign_receipt, verify_proof, VcProof};

use chrono::Utc;
use orca_core::contract::DecisionContract;

/// Configuration switch for the orchestrator (§4.7, §4.12): neither flag set
/// leaves both `receipt_hash` and `vc_proof` null; `receipt_hash_only`
/// populates just the hash; `sign_decisions` populates both.
#[derive(Debug, Clone, Copy, Default)]
pub struct SigningMode {
    pub receipt_hash_only: bool,
    pub sign_decisions: bool,
}

/// Apply the configured signing mode to a contract's `signing` section,
/// mutating it in place.
pub fn apply_signing(contract: &mut DecisionContract, trace_id: &str, mode: SigningMode, keys: Option<&KeyManager>) {
    if !mode.receipt_hash_only && !mode.sign_decisions {
        return;
    }
    let receipt = Receipt::compute(trace_id, contract);
    contract.signing.receipt_hash = Some(receipt.receipt_hash.clone());

    if mode.sign_decisions {
        if let Some(keys) = keys {
            let proof = sign_receipt(keys, Utc::now());
            contract.signing.vc_proof = Some(serde_json::to_value(proof).expect("VcProof always serializes"));
        }
    }
}
