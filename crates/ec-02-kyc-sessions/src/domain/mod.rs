//! Domain layer for KYC sessions.
//!
//! Pure business logic with no I/O dependencies.

pub mod entities;
pub mod errors;
pub mod rules;
pub mod session;
