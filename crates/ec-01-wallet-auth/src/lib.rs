//! # Wallet Authentication Subsystem (EC-01)
//!
//! Proves that a caller controls a wallet by having it sign a short-lived
//! challenge, then hands out a session token for follow-up requests.
//!
//! ## Architecture
//!
//! This subsystem follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Nonce policy, Ed25519 checks, token MACs. No I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Adapters Layer** (`adapters/`): In-memory nonce repository
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Flow
//!
//! ```text
//! POST /auth/nonce  ──→ NonceStore::issue ──→ {nonce, expiresAt}
//!                                                   │ wallet signs nonce
//! POST /auth/verify ──→ NonceStore::consume ──→ SignatureVerifier::verify
//!                                                   │
//!                                             TokenIssuer::issue ──→ {token, isAdmin}
//! ```
//!
//! ## Security Notes
//!
//! - **One-Time Challenges**: A nonce is deleted the moment it is consumed,
//!   whether or not the signature that follows is valid
//! - **Strict Verification**: Ed25519 signatures are checked with
//!   `verify_strict` (rejects small-order keys and malleable encodings)
//! - **Constant-Time Comparison**: Nonce strings and token MACs are compared
//!   without early exit

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::memory::InMemoryNonceRepository;
pub use domain::entities::{AuthGrant, IssuedNonce, NonceRecord, SessionToken, TokenClaims};
pub use domain::errors::{AuthError, NonceError, SignatureError, TokenError};
pub use domain::nonce::{NonceStore, DEFAULT_NONCE_TTL_SECS, NONCE_PREFIX};
pub use domain::signature::SignatureVerifier;
pub use domain::token::{TokenIssuer, DEFAULT_TOKEN_TTL_SECS};
pub use ports::inbound::WalletAuthApi;
pub use ports::outbound::NonceRepository;
pub use service::{WalletAuthConfig, WalletAuthService};
