//! # KYC Sessions Subsystem (EC-02)
//!
//! Tracks identity-verification sessions from creation to a verdict, and
//! reads issued credentials back from the ledger.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Session state machine, completeness rules. No I/O
//! - **Ports Layer** (`ports/`): `KycApi` (inbound), `SessionRepository` and
//!   `CredentialLedger` (outbound)
//! - **Adapters Layer** (`adapters/`): DashMap session storage, seedable ledger
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Session Lifecycle
//!
//! ```text
//!   create ──→ pending ──submit──→ in_progress ──→ completed
//!                 │                     │
//!              update                   └────────→ failed ──update/submit──┐
//!                                                    ▲                     │
//!                                                    └─────────────────────┘
//! ```
//!
//! Every session expires 30 minutes after creation regardless of status.
//! Expired sessions read as not-found and are purged by the sweeper.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::ledger::InMemoryLedger;
pub use adapters::memory::InMemorySessionRepository;
pub use domain::entities::{
    CredentialView, KycSession, PersonalData, ResidentialAddress, SessionId, SessionStatus,
    VerificationResult,
};
pub use domain::errors::{KycError, LedgerError, SessionError};
pub use domain::rules::evaluate;
pub use domain::session::{SessionStore, DEFAULT_SESSION_TTL_SECS};
pub use ports::inbound::KycApi;
pub use ports::outbound::{CredentialLedger, SessionRepository};
pub use service::KycService;
