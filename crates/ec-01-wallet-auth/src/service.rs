//! # Wallet Authentication Service
//!
//! Application service layer that implements the `WalletAuthApi` trait.
//!
//! ## Architecture
//!
//! This is the hexagonal "application service" that:
//! - Implements the inbound port (`WalletAuthApi`)
//! - Uses the outbound port (`NonceRepository`) through `NonceStore`
//! - Delegates cryptographic operations to the domain layer

use crate::domain::entities::{AuthGrant, IssuedNonce, TokenClaims};
use crate::domain::errors::AuthError;
use crate::domain::nonce::{NonceStore, DEFAULT_NONCE_TTL_SECS};
use crate::domain::signature::SignatureVerifier;
use crate::domain::token::{TokenIssuer, DEFAULT_TOKEN_TTL_SECS};
use crate::ports::inbound::WalletAuthApi;
use crate::ports::outbound::NonceRepository;
use shared_types::{Clock, TtlError, WalletAddress};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Wallet authentication settings.
#[derive(Debug, Clone)]
pub struct WalletAuthConfig {
    /// Challenge lifetime.
    pub nonce_ttl: Duration,
    /// Session token lifetime.
    pub token_ttl: Duration,
    /// HMAC key for session tokens (32 bytes).
    pub token_secret: [u8; 32],
    /// Wallets granted `isAdmin`.
    pub admin_wallets: HashSet<WalletAddress>,
}

impl WalletAuthConfig {
    /// Default lifetimes with the given token secret.
    pub fn with_secret(token_secret: [u8; 32]) -> Self {
        Self {
            nonce_ttl: Duration::from_secs(DEFAULT_NONCE_TTL_SECS),
            token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            token_secret,
            admin_wallets: HashSet::new(),
        }
    }
}

/// Wallet Authentication Service.
///
/// Owns its nonce store; constructed once by the runtime and shared with
/// request handlers behind an `Arc`.
pub struct WalletAuthService<R: NonceRepository> {
    nonces: NonceStore<R>,
    verifier: SignatureVerifier,
    tokens: TokenIssuer,
    admin_wallets: HashSet<WalletAddress>,
}

impl<R: NonceRepository> WalletAuthService<R> {
    /// Create a new wallet authentication service.
    ///
    /// # Arguments
    /// * `repository` - storage for outstanding challenges
    /// * `clock` - time source for challenge and token expiry
    /// * `config` - lifetimes, token secret and admin wallets
    ///
    /// # Errors
    /// Returns [`TtlError`] when either lifetime is zero or over a year.
    pub fn new(
        repository: R,
        clock: Arc<dyn Clock>,
        config: WalletAuthConfig,
    ) -> Result<Self, TtlError> {
        Ok(Self {
            nonces: NonceStore::with_ttl(repository, Arc::clone(&clock), config.nonce_ttl)?,
            verifier: SignatureVerifier::new(),
            tokens: TokenIssuer::new(config.token_secret, config.token_ttl, clock)?,
            admin_wallets: config.admin_wallets,
        })
    }

    /// Whether `wallet` is configured as an administrator.
    pub fn is_admin(&self, wallet: &WalletAddress) -> bool {
        self.admin_wallets.contains(wallet)
    }
}

impl<R: NonceRepository> WalletAuthApi for WalletAuthService<R> {
    fn request_nonce(&self, wallet_address: &str) -> Result<IssuedNonce, AuthError> {
        let wallet = WalletAddress::parse(wallet_address)?;
        Ok(self.nonces.issue(&wallet))
    }

    /// Consume the challenge first, then check the signature.
    ///
    /// The challenge is burned even when the signature turns out invalid, so
    /// a captured nonce can be tried at most once.
    fn verify(
        &self,
        wallet_address: &str,
        signature_base58: &str,
        nonce: &str,
    ) -> Result<AuthGrant, AuthError> {
        let wallet = WalletAddress::parse(wallet_address)?;

        self.nonces.consume(&wallet, nonce).map_err(|e| {
            warn!(wallet = %wallet, error = %e, "Challenge rejected");
            AuthError::from(e)
        })?;

        if !self
            .verifier
            .verify(nonce, signature_base58, wallet.public_key())
        {
            warn!(wallet = %wallet, "Wallet signature rejected");
            return Err(AuthError::InvalidSignature);
        }

        let is_admin = self.is_admin(&wallet);
        let session = self.tokens.issue(&wallet, is_admin)?;

        info!(wallet = %wallet, is_admin = is_admin, "Wallet authenticated");
        Ok(AuthGrant::from(session))
    }

    /// The token's admin flag only holds while the wallet is still in the
    /// configured admin set.
    fn authenticate(&self, token: &str) -> Result<TokenClaims, AuthError> {
        let mut claims = self.tokens.validate(token)?;
        if claims.is_admin && !self.is_admin(&claims.wallet) {
            warn!(wallet = %claims.wallet, "Admin flag on token no longer granted");
            claims.is_admin = false;
        }
        Ok(claims)
    }

    fn sweep_expired_nonces(&self) -> usize {
        self.nonces.sweep_expired()
    }

    fn pending_nonces(&self) -> usize {
        self.nonces.pending_count()
    }
}

// =============================================================================
// TESTS
// =============================================================================
