//! # Nonce Store
//!
//! Issues and validates short-lived authentication challenges keyed by
//! wallet address.
//!
//! ## Invariants
//!
//! - At most one outstanding challenge per wallet; re-issuing overwrites.
//! - A consumed or expired challenge is deleted and can never succeed again.
//! - Abandoned challenges are removed by [`NonceStore::sweep_expired`].

use super::entities::{IssuedNonce, NonceRecord};
use super::errors::NonceError;
use crate::ports::outbound::NonceRepository;
use chrono::Duration;
use rand::RngCore;
use shared_types::{checked_ttl, Clock, TtlError, WalletAddress};
use std::sync::Arc;
use subtle::ConstantTimeEq;
use tracing::debug;

/// Challenge lifetime (5 minutes).
pub const DEFAULT_NONCE_TTL_SECS: u64 = 300;

/// Leading tag of every challenge string.
pub const NONCE_PREFIX: &str = "estate-chain-auth";

/// Random bytes appended to each challenge.
const NONCE_RANDOM_BYTES: usize = 16;

/// Challenge issuer and validator.
pub struct NonceStore<R: NonceRepository> {
    repository: R,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<R: NonceRepository> NonceStore<R> {
    /// Create a store with the default 5 minute TTL.
    pub fn new(repository: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            ttl: Duration::seconds(DEFAULT_NONCE_TTL_SECS as i64),
        }
    }

    /// Create a store with a custom TTL.
    ///
    /// # Errors
    /// * `TtlError` - `ttl` is zero or longer than `MAX_TTL_SECS`
    pub fn with_ttl(
        repository: R,
        clock: Arc<dyn Clock>,
        ttl: std::time::Duration,
    ) -> Result<Self, TtlError> {
        Ok(Self {
            repository,
            clock,
            ttl: checked_ttl(ttl)?,
        })
    }

    /// Issue a fresh challenge for `wallet`, replacing any outstanding one.
    pub fn issue(&self, wallet: &WalletAddress) -> IssuedNonce {
        let issued_at = self.clock.now();
        let expires_at = issued_at + self.ttl;

        let mut suffix = [0u8; NONCE_RANDOM_BYTES];
        rand::thread_rng().fill_bytes(&mut suffix);
        let nonce = format!(
            "{}:{}:{}",
            NONCE_PREFIX,
            issued_at.timestamp_millis(),
            hex::encode(suffix)
        );

        self.repository.put(NonceRecord {
            wallet: wallet.clone(),
            nonce: nonce.clone(),
            issued_at,
            expires_at,
        });

        debug!(wallet = %wallet, expires_at = %expires_at, "Issued authentication challenge");

        IssuedNonce { nonce, expires_at }
    }

    /// Validate and delete the wallet's challenge.
    ///
    /// # Errors
    /// * `NoPendingChallenge` - nothing stored for this wallet
    /// * `NonceMismatch` - `supplied` is not the current challenge (entry kept)
    /// * `NonceExpired` - TTL elapsed (entry deleted)
    pub fn consume(&self, wallet: &WalletAddress, supplied: &str) -> Result<(), NonceError> {
        let record = self
            .repository
            .get(wallet)
            .ok_or(NonceError::NoPendingChallenge)?;

        if !nonces_equal(&record.nonce, supplied) {
            debug!(wallet = %wallet, "Challenge mismatch");
            return Err(NonceError::NonceMismatch);
        }

        if record.is_expired(self.clock.now()) {
            let _ = self
                .repository
                .remove_if(wallet, &|stored: &NonceRecord| stored.nonce == record.nonce);
            debug!(wallet = %wallet, "Challenge expired, removed");
            return Err(NonceError::NonceExpired);
        }

        // A concurrent consume or re-issue may have replaced the record since
        // the read above; only the exact challenge we validated is taken.
        self.repository
            .remove_if(wallet, &|stored: &NonceRecord| stored.nonce == record.nonce)
            .map(|_| ())
            .ok_or(NonceError::NoPendingChallenge)
    }

    /// Remove every expired challenge. Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self
            .repository
            .retain(&|record: &NonceRecord| !record.is_expired(now));
        if removed > 0 {
            debug!(removed = removed, "Swept expired challenges");
        }
        removed
    }

    /// Number of outstanding challenges.
    pub fn pending_count(&self) -> usize {
        self.repository.len()
    }

    /// Configured TTL.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

fn nonces_equal(stored: &str, supplied: &str) -> bool {
    stored.len() == supplied.len() && bool::from(stored.as_bytes().ct_eq(supplied.as_bytes()))
}
