//! # KYC Service
//!
//! Application service layer that implements the `KycApi` trait.
//!
//! ## Architecture
//!
//! - Implements the inbound port (`KycApi`)
//! - Uses the outbound ports (`SessionRepository` via `SessionStore`, and
//!   `CredentialLedger`)
//! - Derives credential validity through `shared_types::is_credential_valid`

use crate::domain::entities::{CredentialView, KycSession, PersonalData, SessionId};
use crate::domain::errors::KycError;
use crate::domain::session::SessionStore;
use crate::ports::inbound::KycApi;
use crate::ports::outbound::{CredentialLedger, SessionRepository};
use async_trait::async_trait;
use shared_types::{
    effective_status, is_credential_valid, Clock, CredentialType, TtlError, WalletAddress,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// KYC Service.
pub struct KycService<R: SessionRepository, L: CredentialLedger> {
    sessions: SessionStore<R>,
    ledger: L,
    clock: Arc<dyn Clock>,
}

impl<R: SessionRepository, L: CredentialLedger> KycService<R, L> {
    /// Create a service with the given session TTL.
    ///
    /// Fails when `session_ttl` is zero or longer than a year.
    pub fn new(
        repository: R,
        ledger: L,
        clock: Arc<dyn Clock>,
        session_ttl: Duration,
    ) -> Result<Self, TtlError> {
        Ok(Self {
            sessions: SessionStore::with_ttl(repository, Arc::clone(&clock), session_ttl)?,
            ledger,
            clock,
        })
    }

    /// Underlying session store.
    pub fn store(&self) -> &SessionStore<R> {
        &self.sessions
    }
}

#[async_trait]
impl<R, L> KycApi for KycService<R, L>
where
    R: SessionRepository + 'static,
    L: CredentialLedger + 'static,
{
    fn create_session(
        &self,
        wallet_address: &str,
        credential_type: &str,
    ) -> Result<KycSession, KycError> {
        let wallet = WalletAddress::parse(wallet_address)?;
        let credential_type: CredentialType = credential_type.parse()?;
        Ok(self.sessions.create(wallet, credential_type))
    }

    fn get_session(&self, session_id: &str) -> Result<KycSession, KycError> {
        let id = SessionId::parse(session_id)?;
        Ok(self.sessions.get(&id)?)
    }

    fn update_session(
        &self,
        session_id: &str,
        patch: PersonalData,
    ) -> Result<KycSession, KycError> {
        let id = SessionId::parse(session_id)?;
        Ok(self.sessions.update_fields(&id, patch)?)
    }

    fn submit_session(&self, session_id: &str) -> Result<KycSession, KycError> {
        let id = SessionId::parse(session_id)?;
        Ok(self.sessions.submit(&id)?)
    }

    fn delete_session(&self, session_id: &str) -> Result<bool, KycError> {
        let id = SessionId::parse(session_id)?;
        Ok(self.sessions.delete(&id))
    }

    fn sessions_for_wallet(&self, wallet: &WalletAddress) -> Vec<KycSession> {
        self.sessions.list_for_wallet(wallet)
    }

    fn sweep_expired_sessions(&self) -> usize {
        self.sessions.sweep_expired()
    }

    fn session_count(&self) -> usize {
        self.sessions.session_count()
    }

    async fn credential_status(&self, holder: &str) -> Result<CredentialView, KycError> {
        let holder = WalletAddress::parse(holder)?;

        let credential = self
            .ledger
            .fetch_credential_account(&holder)
            .await
            .map_err(|e| {
                warn!(holder = %holder, error = %e, "Ledger read failed");
                KycError::from(e)
            })?
            .ok_or_else(|| KycError::CredentialNotFound(holder.to_string()))?;

        let now = self.clock.now().timestamp();
        let is_valid = is_credential_valid(&credential, now);
        let status = effective_status(&credential, now);

        debug!(holder = %holder, is_valid = is_valid, status = ?status, "Credential state derived");

        Ok(CredentialView {
            credential,
            is_valid,
            effective_status: status,
        })
    }
}

// =============================================================================
// TESTS
// =============================================================================
