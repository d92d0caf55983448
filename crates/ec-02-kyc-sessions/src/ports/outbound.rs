//! # Outbound Ports (Driven Ports / SPI)
//!
//! Session storage and the credential ledger this subsystem reads from.

use crate::domain::entities::{KycSession, SessionId};
use crate::domain::errors::{LedgerError, SessionError};
use async_trait::async_trait;
use shared_types::{Credential, WalletAddress};

/// Keyed storage for KYC sessions.
///
/// Holds records only; expiry and transition rules live in `SessionStore`.
/// Each call must be atomic with respect to its key.
pub trait SessionRepository: Send + Sync {
    /// Current record for `id`, if any.
    fn get(&self, id: &SessionId) -> Option<KycSession>;

    /// Store `session`, replacing any record with the same id.
    fn put(&self, session: KycSession);

    /// Apply `mutate` to the stored record while holding its entry.
    ///
    /// Returns the record as left by `mutate`. Changes `mutate` made before
    /// returning an error are kept, so it must check before it writes.
    ///
    /// # Errors
    /// * `SessionError::NotFound` - nothing stored under `id`
    /// * whatever `mutate` returns
    fn update(
        &self,
        id: &SessionId,
        mutate: &mut dyn FnMut(&mut KycSession) -> Result<(), SessionError>,
    ) -> Result<KycSession, SessionError>;

    /// Remove the record for `id`.
    fn remove(&self, id: &SessionId) -> Option<KycSession>;

    /// Remove the record for `id` only if `predicate` holds for it.
    fn remove_if(
        &self,
        id: &SessionId,
        predicate: &dyn Fn(&KycSession) -> bool,
    ) -> Option<KycSession>;

    /// Keep only the records for which `keep` returns true.
    ///
    /// Returns the number of records removed.
    fn retain(&self, keep: &dyn Fn(&KycSession) -> bool) -> usize;

    /// Every record for which `predicate` returns true.
    fn find(&self, predicate: &dyn Fn(&KycSession) -> bool) -> Vec<KycSession>;

    /// Number of stored records.
    fn len(&self) -> usize;

    /// Whether the repository is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read access to credential accounts on the ledger.
///
/// The ledger is opaque: this port only fetches and decodes accounts, it
/// never writes them.
#[async_trait]
pub trait CredentialLedger: Send + Sync {
    /// Fetch the credential account held by `holder`.
    ///
    /// Returns `Ok(None)` when no account exists.
    async fn fetch_credential_account(
        &self,
        holder: &WalletAddress,
    ) -> Result<Option<Credential>, LedgerError>;
}
