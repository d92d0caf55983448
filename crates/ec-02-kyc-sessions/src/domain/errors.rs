//! # KYC Errors

use super::entities::SessionId;
use shared_types::ValidationError;
use thiserror::Error;

/// Session lifecycle failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Unknown id, or the session expired
    #[error("Session not found: {0}")]
    NotFound(SessionId),

    /// Completed sessions are final
    #[error("Session already completed: {0}")]
    AlreadyCompleted(SessionId),
}

/// Ledger read failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The ledger could not be reached
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    /// The account exists but could not be decoded as a credential
    #[error("Malformed credential account: {0}")]
    MalformedAccount(String),
}

/// Errors surfaced by the KYC service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KycError {
    /// Malformed request input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Session lifecycle failure
    #[error(transparent)]
    Session(#[from] SessionError),

    /// No credential account for the holder
    #[error("Credential not found for holder {0}")]
    CredentialNotFound(String),

    /// Ledger read failure
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
