//! Ed25519Signature2020 verifiable-credential proof (§4.7).

use crate::canonical::canonicalize;
use crate::error::{Result, SigningError};
use crate::keys::KeyManager;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, Utc};
use ed25519_dalek::{Signature, Signer, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VcProof {
    #[serde(rename = "type")]
    pub proof_type: String,
    pub created: String,
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: String,
    #[serde(rename = "proofValue")]
    pub proof_value: String,
}

impl VcProof {
    /// The proof minus `proofValue`, in the same field order a deserialized
    /// struct would produce — canonicalization sorts keys regardless.
    fn unsigned_view(&self) -> serde_json::Value {
        json!({
            "type": self.proof_type,
            "created": self.created,
            "verificationMethod": self.verification_method,
            "proofPurpose": self.proof_purpose,
        })
    }
}

/// Sign the proof metadata, producing a VC proof that sits alongside
/// `receipt_hash` at the `signing` level of the contract (§4.7). `receipt_hash`
/// itself is not part of the proof object; content tampering is instead caught
/// by recomputing the receipt hash and comparing it to `contract.signing.receipt_hash`.
pub fn sign_receipt(keys: &KeyManager, now: DateTime<Utc>) -> VcProof {
    let verification_method = format!("{}#{}", keys.key_id, keys.public_key_fingerprint());
    let mut proof = VcProof {
        proof_type: "Ed25519Signature2020".to_string(),
        created: now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
        verification_method,
        proof_purpose: "assertionMethod".to_string(),
        proof_value: String::new(),
    };
    let canonical = canonicalize(&proof.unsigned_view());
    let signature = keys.signing_key().sign(canonical.as_bytes());
    proof.proof_value = BASE64.encode(signature.to_bytes());
    proof
}

/// Verify a VC proof against the public key it claims (§4.7, §8 bit-flip detection).
pub fn verify_proof(proof: &VcProof, verifying_key: &VerifyingKey) -> Result<()> {
    let canonical = canonicalize(&proof.unsigned_view());
    let signature_bytes = BASE64
        .decode(&proof.proof_value)
        .map_err(|e| SigningError::InvalidKey(format!("invalid base64 proofValue: {e}")))?;
    let signature = Signature::from_slice(&signature_bytes)
        .map_err(|e| SigningError::InvalidKey(format!("invalid signature bytes: {e}")))?;
    verifying_key
        .verify(canonical.as_bytes(), &signature)
        .map_err(|_| SigningError::VerificationFailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let keys = KeyManager::load_test_keys();
        let proof = sign_receipt(&keys, Utc::now());
        assert_eq!(proof.proof_type, "Ed25519Signature2020");
        verify_proof(&proof, &keys.signing_key().verifying_key()).unwrap();
    }

    #[test]
    fn bit_flipped_signature_fails_verification() {
        let keys = KeyManager::load_test_keys();
        let mut proof = sign_receipt(&keys, Utc::now());
        let mut raw = BASE64.decode(&proof.proof_value).unwrap();
        raw[0] ^= 0xFF;
        proof.proof_value = BASE64.encode(raw);
        assert!(verify_proof(&proof, &keys.signing_key().verifying_key()).is_err());
    }

    #[test]
    fn tampered_verification_method_fails_verification() {
        let keys = KeyManager::load_test_keys();
        let mut proof = sign_receipt(&keys, Utc::now());
        proof.verification_method = format!("{}-tampered", proof.verification_method);
        assert!(verify_proof(&proof, &keys.signing_key().verifying_key()).is_err());
    }
}
