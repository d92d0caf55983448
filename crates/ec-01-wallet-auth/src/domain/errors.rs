//! # Authentication Errors
//!
//! Error types for nonce, signature and token operations.

use shared_types::ValidationError;
use thiserror::Error;

/// Challenge lookup failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NonceError {
    /// No challenge is outstanding for this wallet
    #[error("No pending challenge for wallet")]
    NoPendingChallenge,

    /// The supplied nonce is not the wallet's current challenge
    #[error("Nonce does not match the current challenge")]
    NonceMismatch,

    /// The challenge existed but its TTL has elapsed (entry removed)
    #[error("Nonce expired")]
    NonceExpired,
}

/// Ed25519 signature check failures.
///
/// Never escapes `SignatureVerifier::verify`, which reports `false` instead.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Signature text is not valid base58
    #[error("Invalid signature encoding")]
    InvalidSignatureEncoding,

    /// Decoded signature is not 64 bytes
    #[error("Invalid signature length: {0}")]
    InvalidSignatureLength(usize),

    /// Public key bytes are not a valid Ed25519 point
    #[error("Invalid public key")]
    InvalidPublicKey,

    /// Signature does not match message/key
    #[error("Signature verification failed")]
    VerificationFailed,
}

/// Session token failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    /// Token does not have the expected shape
    #[error("Malformed token")]
    Malformed,

    /// MAC check failed
    #[error("Token signature invalid")]
    BadSignature,

    /// Token lifetime has elapsed
    #[error("Token expired")]
    Expired,

    /// The configured secret was rejected by the MAC
    #[error("Token key rejected")]
    KeyRejected,
}

/// Errors surfaced by the wallet authentication service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Malformed request input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Challenge missing, mismatched or expired
    #[error(transparent)]
    Nonce(#[from] NonceError),

    /// Wallet signature did not verify
    #[error("Invalid wallet signature")]
    InvalidSignature,

    /// Session token rejected
    #[error(transparent)]
    Token(#[from] TokenError),
}
