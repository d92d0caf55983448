//! Request and response bodies for the REST routes.
//!
//! Field names are camelCase on the wire. Identifiers stay as text here;
//! the services validate them so field-level errors come from one place.

use ec_02_kyc_sessions::KycSession;
use serde::{Deserialize, Serialize};

/// `POST /auth/nonce`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NonceRequest {
    pub wallet_address: String,
}

/// `POST /auth/verify`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub wallet_address: String,
    /// Base58 detached Ed25519 signature over the nonce text
    pub signature: String,
    pub nonce: String,
}

/// `POST /kyc/session`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    pub wallet_address: String,
    pub credential_type: String,
}

/// `DELETE /kyc/session/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// `GET /kyc/sessions`
#[derive(Debug, Clone, Serialize)]
pub struct SessionList {
    pub count: usize,
    pub sessions: Vec<KycSession>,
}

impl From<Vec<KycSession>> for SessionList {
    fn from(sessions: Vec<KycSession>) -> Self {
        Self {
            count: sessions.len(),
            sessions,
        }
    }
}

/// `GET /health`
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "ok",
            version: crate::VERSION,
        }
    }
}
