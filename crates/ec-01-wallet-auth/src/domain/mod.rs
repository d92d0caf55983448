//! # Domain Layer
//!
//! Pure authentication logic with no I/O dependencies.
//! This is the inner layer of the hexagonal architecture.

pub mod entities;
pub mod errors;
pub mod nonce;
pub mod signature;
pub mod token;
