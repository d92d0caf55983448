//! # Credential State Derivation
//!
//! Pure functions deciding whether a ledger credential is usable right now.
//! Both the gateway and client read paths must go through these so the
//! check cannot drift between them.

use crate::entities::{Credential, CredentialStatus};

/// True iff the credential is `active` and its expiry is strictly in the
/// future relative to `now` (unix seconds).
pub fn is_credential_valid(credential: &Credential, now: i64) -> bool {
    credential.status == CredentialStatus::Active && credential.expires_at > now
}

/// Status as it should be presented at `now`.
///
/// An `active` credential whose expiry has passed reports `Expired`; every
/// other stored status is returned unchanged.
pub fn effective_status(credential: &Credential, now: i64) -> CredentialStatus {
    match credential.status {
        CredentialStatus::Active if credential.expires_at <= now => CredentialStatus::Expired,
        status => status,
    }
}
