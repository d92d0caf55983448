//! # Domain Entities
//!
//! Core data structures for wallet authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared_types::WalletAddress;

// =============================================================================
// Challenge Types
// =============================================================================

/// A stored challenge. At most one exists per wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NonceRecord {
    /// Wallet the challenge was issued to
    pub wallet: WalletAddress,
    /// The challenge text the wallet must sign
    pub nonce: String,
    /// When the challenge was issued
    pub issued_at: DateTime<Utc>,
    /// When the challenge stops being accepted
    pub expires_at: DateTime<Utc>,
}

impl NonceRecord {
    /// Whether the challenge is past its TTL at `now`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Response to a challenge request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedNonce {
    pub nonce: String,
    pub expires_at: DateTime<Utc>,
}

// =============================================================================
// Token Types
// =============================================================================

/// Facts carried by a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenClaims {
    pub wallet: WalletAddress,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub is_admin: bool,
}

/// An encoded token together with its claims.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Result of a successful wallet verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthGrant {
    pub token: String,
    pub wallet_address: WalletAddress,
    pub is_admin: bool,
    pub expires_at: DateTime<Utc>,
}

impl From<SessionToken> for AuthGrant {
    fn from(session: SessionToken) -> Self {
        Self {
            token: session.token,
            wallet_address: session.claims.wallet,
            is_admin: session.claims.is_admin,
            expires_at: session.claims.expires_at,
        }
    }
}
