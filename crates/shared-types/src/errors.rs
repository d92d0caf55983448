//! # Error Types
//!
//! Defines error types used across crates.

use thiserror::Error;

/// Malformed input detected before any domain logic runs.
///
/// Carries the offending field name so the API boundary can report
/// field-level detail to the caller.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {field}: {reason}")]
pub struct ValidationError {
    /// Wire name of the rejected field (camelCase).
    pub field: &'static str,
    /// Human readable reason.
    pub reason: String,
}

impl ValidationError {
    /// Create a new validation error for `field`.
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// A configured lifetime that is zero or longer than [`MAX_TTL_SECS`].
///
/// [`MAX_TTL_SECS`]: crate::clock::MAX_TTL_SECS
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("lifetime of {secs}s is outside 1..={max}s", max = crate::clock::MAX_TTL_SECS)]
pub struct TtlError {
    /// Rejected lifetime, whole seconds.
    pub secs: u64,
}
