//! Adapters for KYC sessions.

pub mod ledger;
pub mod memory;
