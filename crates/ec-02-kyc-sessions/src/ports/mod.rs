//! Ports layer for KYC sessions.
//!
//! Inbound: `KycApi`, the surface the gateway calls.
//! Outbound: `SessionRepository` and `CredentialLedger`.

pub mod inbound;
pub mod outbound;
