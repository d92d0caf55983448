//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this subsystem.

use crate::domain::entities::{CredentialView, KycSession, PersonalData};
use crate::domain::errors::KycError;
use async_trait::async_trait;
use shared_types::WalletAddress;

/// Primary KYC API.
///
/// Called by the gateway's `/kyc` and `/credentials` routes. Identifiers
/// arrive as text and are validated here so every caller gets the same
/// field-level errors.
#[async_trait]
pub trait KycApi: Send + Sync {
    /// Open a session for `wallet_address` targeting `credential_type`.
    ///
    /// # Errors
    /// * `KycError::Validation` - bad wallet address or unknown credential type
    fn create_session(
        &self,
        wallet_address: &str,
        credential_type: &str,
    ) -> Result<KycSession, KycError>;

    /// Fetch a live session.
    fn get_session(&self, session_id: &str) -> Result<KycSession, KycError>;

    /// Merge collected fields into a session.
    fn update_session(&self, session_id: &str, patch: PersonalData)
        -> Result<KycSession, KycError>;

    /// Evaluate a session and record the verdict.
    fn submit_session(&self, session_id: &str) -> Result<KycSession, KycError>;

    /// Delete a session. Returns whether anything was removed.
    fn delete_session(&self, session_id: &str) -> Result<bool, KycError>;

    /// Live sessions opened by `wallet`.
    fn sessions_for_wallet(&self, wallet: &WalletAddress) -> Vec<KycSession>;

    /// Remove expired sessions. Returns how many were removed.
    fn sweep_expired_sessions(&self) -> usize;

    /// Number of stored sessions.
    fn session_count(&self) -> usize;

    /// Read a holder's credential from the ledger and derive its state.
    ///
    /// # Errors
    /// * `KycError::Validation` - bad holder address
    /// * `KycError::CredentialNotFound` - no account for the holder
    /// * `KycError::Ledger` - the ledger read failed
    async fn credential_status(&self, holder: &str) -> Result<CredentialView, KycError>;
}
