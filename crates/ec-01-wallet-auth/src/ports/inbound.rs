//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::{AuthGrant, IssuedNonce, TokenClaims};
use crate::domain::errors::AuthError;

/// Primary Wallet Authentication API.
///
/// This is the main entry point for the gateway's `/auth` routes and its
/// bearer-token layer. Implementations must be thread-safe (`Send + Sync`).
pub trait WalletAuthApi: Send + Sync {
    /// Issue a challenge for a wallet.
    ///
    /// # Errors
    /// * `AuthError::Validation` - the wallet address is malformed
    fn request_nonce(&self, wallet_address: &str) -> Result<IssuedNonce, AuthError>;

    /// Consume the wallet's challenge, check its signature and grant a token.
    ///
    /// # Errors
    /// * `AuthError::Validation` - the wallet address is malformed
    /// * `AuthError::Nonce` - challenge missing, mismatched or expired
    /// * `AuthError::InvalidSignature` - the signature does not verify
    fn verify(
        &self,
        wallet_address: &str,
        signature_base58: &str,
        nonce: &str,
    ) -> Result<AuthGrant, AuthError>;

    /// Validate a bearer token.
    fn authenticate(&self, token: &str) -> Result<TokenClaims, AuthError>;

    /// Remove abandoned challenges. Returns how many were removed.
    fn sweep_expired_nonces(&self) -> usize;

    /// Number of outstanding challenges.
    fn pending_nonces(&self) -> usize;
}
