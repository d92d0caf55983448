//! # Node Runtime Library
//!
//! This library exposes the runtime's building blocks for testing.
//! The main entry point is the `main.rs` binary.
//!
//! ## Architectural Patterns
//!
//! - **Hexagonal Architecture**: each subsystem crate defines ports; this
//!   crate picks the adapters (in-memory stores, ledger reader, wall clock)
//! - **Explicit wiring**: stores are instances injected into services, and
//!   services into the gateway. Nothing is global.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod runtime;

pub use config::{load_config, load_config_from, EnvConfigError, NodeConfig};
pub use runtime::NodeRuntime;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
