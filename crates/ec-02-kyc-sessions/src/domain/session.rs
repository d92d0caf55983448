//! # Session Store
//!
//! Tracks KYC sessions through their lifecycle and enforces the session TTL.
//!
//! ## Invariants
//!
//! - Status never moves to a lower lifecycle rank; once a session has been
//!   evaluated it reads `completed` or `failed` until it is deleted.
//! - `completed` is final: updates and re-submits are rejected.
//! - An expired session behaves exactly like a missing one, whatever its
//!   status, and is removed the first time it is touched.

use super::entities::{KycSession, PersonalData, SessionId, SessionStatus};
use super::errors::SessionError;
use super::rules;
use crate::ports::outbound::SessionRepository;
use chrono::{DateTime, Duration, Utc};
use shared_types::{checked_ttl, Clock, CredentialType, TtlError, WalletAddress};
use std::sync::Arc;
use tracing::{debug, info};

/// Session lifetime (30 minutes).
pub const DEFAULT_SESSION_TTL_SECS: u64 = 1_800;

/// KYC session state machine over a [`SessionRepository`].
pub struct SessionStore<R: SessionRepository> {
    repository: R,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<R: SessionRepository> SessionStore<R> {
    /// Create a store with the default 30 minute TTL.
    pub fn new(repository: R, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            clock,
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS as i64),
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

    /// Open a new `pending` session.
    pub fn create(&self, wallet: WalletAddress, credential_type: CredentialType) -> KycSession {
        let now = self.clock.now();
        let session = KycSession {
            session_id: SessionId::new(),
            wallet_address: wallet,
            credential_type,
            status: SessionStatus::Pending,
            collected_fields: PersonalData::default(),
            created_at: now,
            updated_at: now,
            expires_at: now + self.ttl,
            verification_result: None,
        };
        self.repository.put(session.clone());

        info!(
            session_id = %session.session_id,
            wallet = %session.wallet_address,
            credential_type = %credential_type,
            "KYC session created"
        );
        session
    }

    /// Fetch a live session.
    ///
    /// # Errors
    /// * `NotFound` - unknown id, or expired (the record is removed)
    pub fn get(&self, id: &SessionId) -> Result<KycSession, SessionError> {
        let now = self.clock.now();
        match self.repository.get(id) {
            Some(session) if !session.is_expired(now) => Ok(session),
            Some(_) => {
                self.purge_if_expired(id, now);
                Err(SessionError::NotFound(*id))
            }
            None => Err(SessionError::NotFound(*id)),
        }
    }

    /// Merge `patch` into the collected fields. Status is left as is.
    ///
    /// # Errors
    /// * `NotFound` - unknown id, or expired
    /// * `AlreadyCompleted` - the session is final
    pub fn update_fields(
        &self,
        id: &SessionId,
        patch: PersonalData,
    ) -> Result<KycSession, SessionError> {
        let now = self.clock.now();
        let mut patch = Some(patch);

        let result = self.repository.update(id, &mut |session: &mut KycSession| {
            Self::ensure_open(session, now)?;
            if let Some(patch) = patch.take() {
                session.collected_fields.merge(patch);
            }
            session.updated_at = now;
            Ok(())
        });

        self.settle(id, now, result).inspect(|session| {
            debug!(session_id = %id, status = %session.status, "KYC session fields updated");
        })
    }

    /// Evaluate the collected fields and settle the session.
    ///
    /// A `pending` session is marked `in_progress` first. A `failed` session
    /// is re-evaluated against its current fields.
    ///
    /// # Errors
    /// * `NotFound` - unknown id, or expired
    /// * `AlreadyCompleted` - the session is final
    pub fn submit(&self, id: &SessionId) -> Result<KycSession, SessionError> {
        let now = self.clock.now();

        let started = self.repository.update(id, &mut |session: &mut KycSession| {
            Self::ensure_open(session, now)?;
            if session.status == SessionStatus::Pending {
                session.status = SessionStatus::InProgress;
                session.updated_at = now;
            }
            Ok(())
        });
        self.settle(id, now, started)?;

        let settled = self.repository.update(id, &mut |session: &mut KycSession| {
            // A concurrent submit may have completed the session in between
            Self::ensure_open(session, now)?;
            let result = rules::evaluate(session.credential_type, &session.collected_fields, now);
            session.status = if result.passed {
                SessionStatus::Completed
            } else {
                SessionStatus::Failed
            };
            session.verification_result = Some(result);
            session.updated_at = now;
            Ok(())
        });

        self.settle(id, now, settled).inspect(|session| {
            info!(
                session_id = %id,
                status = %session.status,
                credential_type = %session.credential_type,
                "KYC session evaluated"
            );
        })
    }

    /// Delete a session. Returns whether anything was removed.
    pub fn delete(&self, id: &SessionId) -> bool {
        let removed = self.repository.remove(id).is_some();
        if removed {
            debug!(session_id = %id, "KYC session deleted");
        }
        removed
    }

    /// Live sessions opened by `wallet`, oldest first.
    pub fn list_for_wallet(&self, wallet: &WalletAddress) -> Vec<KycSession> {
        let now = self.clock.now();
        let mut sessions = self.repository.find(&|session: &KycSession| {
            &session.wallet_address == wallet && !session.is_expired(now)
        });
        sessions.sort_by_key(|session| session.created_at);
        sessions
    }

    /// Remove every expired session regardless of status.
    ///
    /// Returns how many were removed.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let removed = self
            .repository
            .retain(&|session: &KycSession| !session.is_expired(now));
        if removed > 0 {
            info!(removed = removed, "Swept expired KYC sessions");
        }
        removed
    }

    /// Number of stored sessions, expired ones included until swept.
    pub fn session_count(&self) -> usize {
        self.repository.len()
    }

    /// Configured session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn ensure_open(session: &KycSession, now: DateTime<Utc>) -> Result<(), SessionError> {
        if session.is_expired(now) {
            return Err(SessionError::NotFound(session.session_id));
        }
        if session.status == SessionStatus::Completed {
            return Err(SessionError::AlreadyCompleted(session.session_id));
        }
        Ok(())
    }

    /// Purge the record if a `NotFound` came from expiry.
    fn settle(
        &self,
        id: &SessionId,
        now: DateTime<Utc>,
        result: Result<KycSession, SessionError>,
    ) -> Result<KycSession, SessionError> {
        if let Err(SessionError::NotFound(_)) = result {
            self.purge_if_expired(id, now);
        }
        result
    }

    fn purge_if_expired(&self, id: &SessionId, now: DateTime<Utc>) {
        if self
            .repository
            .remove_if(id, &|session: &KycSession| session.is_expired(now))
            .is_some()
        {
            debug!(session_id = %id, "Expired KYC session removed");
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
