//! # Ed25519 Signature Verification
//!
//! Pure domain logic for checking a wallet's detached signature over a
//! challenge string.
//!
//! ## Security Notes
//!
//! - Uses `verify_strict`: rejects small-order public keys and non-canonical
//!   signature encodings
//! - Decode failures never propagate to callers of [`SignatureVerifier::verify`];
//!   they count as verification failure

use super::errors::SignatureError;
use ed25519_dalek::{Signature, VerifyingKey};
use shared_types::PublicKey;
use tracing::debug;

/// Ed25519 signature length in bytes.
pub const SIGNATURE_LENGTH: usize = 64;

/// Ed25519 detached-signature verifier.
#[derive(Debug, Clone, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Create a new verifier.
    pub fn new() -> Self {
        Self
    }

    /// Verify a base58 signature over `message`.
    ///
    /// Deterministic: the same triple always yields the same answer.
    pub fn verify(&self, message: &str, signature_base58: &str, public_key: &PublicKey) -> bool {
        match self.check(message, signature_base58, public_key) {
            Ok(()) => true,
            Err(e) => {
                debug!(error = %e, "Signature rejected");
                false
            }
        }
    }

    /// Same as [`verify`](Self::verify) with the failure reason preserved.
    pub fn check(
        &self,
        message: &str,
        signature_base58: &str,
        public_key: &PublicKey,
    ) -> Result<(), SignatureError> {
        let signature = decode_signature(signature_base58)?;
        verify_ed25519(message.as_bytes(), &signature, public_key)
    }
}

/// Decode a base58 signature into 64 raw bytes.
pub fn decode_signature(signature_base58: &str) -> Result<[u8; SIGNATURE_LENGTH], SignatureError> {
    let bytes = bs58::decode(signature_base58.trim())
        .into_vec()
        .map_err(|_| SignatureError::InvalidSignatureEncoding)?;

    bytes
        .as_slice()
        .try_into()
        .map_err(|_| SignatureError::InvalidSignatureLength(bytes.len()))
}

/// Verify raw signature bytes against a raw public key.
pub fn verify_ed25519(
    message: &[u8],
    signature: &[u8; SIGNATURE_LENGTH],
    public_key: &PublicKey,
) -> Result<(), SignatureError> {
    let verifying_key =
        VerifyingKey::from_bytes(public_key).map_err(|_| SignatureError::InvalidPublicKey)?;
    let signature = Signature::from_bytes(signature);

    verifying_key
        .verify_strict(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

// =============================================================================
// TEST HELPERS
// =============================================================================
