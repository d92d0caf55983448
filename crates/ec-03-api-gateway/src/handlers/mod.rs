//! Route handlers for the REST API.
//!
//! Handlers stay thin: decode the body, call the service port, map the
//! error. Domain rules live in the wallet-auth and KYC crates.

pub mod admin;
pub mod auth;
pub mod credentials;
pub mod kyc;
