//! # Shared Types Crate
//!
//! This crate contains the domain entities shared by every Estate-Chain
//! credential crate and by client-side readers of ledger accounts.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: Wallet addresses, credential types and the
//!   ledger credential record are defined once, here.
//! - **One Validity Check**: [`is_credential_valid`] is the only place that
//!   decides whether a credential is currently usable. Server handlers and
//!   client read paths both call it.
//! - **Injectable Time**: Every TTL decision reads the time through
//!   [`Clock`] so expiry can be tested without sleeping.

pub mod clock;
pub mod credential;
pub mod entities;
pub mod errors;

pub use clock::{checked_ttl, Clock, ManualClock, SystemClock, MAX_TTL_SECS};
pub use credential::{effective_status, is_credential_valid};
pub use entities::*;
pub use errors::*;
