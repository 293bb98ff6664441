//! Key management for decision signing (§4.7).
//!
//! Keys come from one of three sources, in order of how they're meant to be
//! used: environment variables in production, a PEM-adjacent file on disk,
//! or an ephemeral keypair for tests. `from_env` and `from_file` expect the
//! private key as base64-encoded 32-byte seed material.

use crate::error::{Result, SigningError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use std::path::Path;

const DEFAULT_KEY_ID: &str = "orca-default-key";
const TEST_KEY_ID: &str = "orca-test-key";

pub struct KeyManager {
    signing_key: SigningKey,
    pub key_id: String,
}

impl KeyManager {
    fn from_seed(seed_b64: &str, key_id: String) -> Result<Self> {
        let seed_bytes = BASE64
            .decode(seed_b64.trim())
            .map_err(|e| SigningError::InvalidKey(format!("invalid base64 seed: {e}")))?;
        let seed: [u8; 32] = seed_bytes
            .try_into()
            .map_err(|_| SigningError::InvalidKey("signing seed must be 32 bytes".to_string()))?;
        Ok(Self {
            signing_key: SigningKey::from_bytes(&seed),
            key_id,
        })
    }

    /// Load from `ORCA_PRIVATE_KEY` / `ORCA_KEY_ID` (§6 env var table).
    pub fn load_from_env() -> Result<Self> {
        let seed_b64 = std::env::var("ORCA_PRIVATE_KEY").map_err(|_| SigningError::KeyUnavailable)?;
        let key_id = std::env::var("ORCA_KEY_ID").unwrap_or_else(|_| DEFAULT_KEY_ID.to_string());
        Self::from_seed(&seed_b64, key_id)
    }

    /// Load the base64 seed from a file on disk, e.g. `ORCA_SIGNING_KEY_PATH`.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let key_id = std::env::var("ORCA_KEY_ID").unwrap_or_else(|_| DEFAULT_KEY_ID.to_string());
        Self::from_seed(&contents, key_id)
    }

    /// An ephemeral, in-memory keypair. **TEST KEY — do not use in production.**
    pub fn load_test_keys() -> Self {
        let signing_key = SigningKey::generate(&mut OsRng);
        Self {
            signing_key,
            key_id: TEST_KEY_ID.to_string(),
        }
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }

    /// Base64 SHA-256 digest of the raw public key bytes, used in
    /// `verificationMethod` (§4.7). A simplified stand-in for the original's
    /// DER-encoded SubjectPublicKeyInfo fingerprint: this system verifies
    /// proofs against its own receipts and never needs byte-compatibility
    /// with an external PKI, so the full DER/PKCS8 encoding path was skipped.
    pub fn public_key_fingerprint(&self) -> String {
        let public_bytes = self.signing_key.verifying_key().to_bytes();
        let digest = Sha256::digest(public_bytes);
        BASE64.encode(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_labeled_as_test_keys() {
        let manager = KeyManager::load_test_keys();
        assert_eq!(manager.key_id, "orca-test-key");
    }

    #[test]
    fn fingerprint_is_stable_for_same_key() {
        let manager = KeyManager::load_test_keys();
        assert_eq!(manager.public_key_fingerprint(), manager.public_key_fingerprint());
    }

    #[test]
    fn different_keys_have_different_fingerprints() {
        let a = KeyManager::load_test_keys();
        let b = KeyManager::load_test_keys();
        assert_ne!(a.public_key_fingerprint(), b.public_key_fingerprint());
    }
}
