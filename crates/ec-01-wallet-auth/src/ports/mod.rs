//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that the gateway uses
//! - **Outbound (Driven)**: Storage this subsystem needs

pub mod inbound;
pub mod outbound;
