//! EC-03 API Gateway - HTTP surface for the Estate-Chain credential layer.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    API GATEWAY (ec-03)                        │
//! ├──────────────────────────────────────────────────────────────┤
//! │  CORS → Tracing/Metrics → RateLimit → Timeout                │
//! │                       │                                      │
//! │   ┌───────────────────┼──────────────────────┐               │
//! │   │ /auth/*           │ /kyc/*, /credentials │ /metrics      │
//! │   │                   │   (bearer on         │ (admin token) │
//! │   │                   │    /kyc/sessions)    │               │
//! │   └─────────┬─────────┴──────────┬───────────┘               │
//! │             │                    │                           │
//! │      WalletAuthApi            KycApi          Sweeper task   │
//! └─────────────┼────────────────────┼───────────────────────────┘
//!               ▼                    ▼
//!      ec-01-wallet-auth     ec-02-kyc-sessions ──→ credential ledger
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ec_03_api_gateway::{ApiGatewayService, GatewayConfig};
//!
//! let config = GatewayConfig::default();
//! let mut gateway = ApiGatewayService::new(config, auth, kyc)?;
//! let addr = gateway.start().await?;
//! // ...
//! gateway.shutdown().await;
//! ```
//!
//! # Security
//!
//! - Per-IP rate limiting with separate read and write budgets
//! - Bearer session tokens checked before protected handlers run
//! - Request body size limit and per-request timeout
//! - Internal failures are logged; clients only see a generic message

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod service;

// Re-exports for public API
pub use domain::config::{ConfigError, GatewayConfig};
pub use domain::error::{codes, ApiError, ApiResult, GatewayError};
pub use middleware::GatewayMetrics;
pub use router::{build_router, AppState};
pub use service::{run_sweep, sweeper_task, ApiGatewayService, SweepReport};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
