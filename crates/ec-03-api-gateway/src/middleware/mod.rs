//! Middleware stack for the API Gateway.
//!
//! Layer order: Request → CORS → Tracing/Metrics → RateLimit → Timeout → Handler.
//! Bearer authentication is a route layer on the protected routes only.

pub mod auth;
pub mod cors;
pub mod metrics;
pub mod rate_limit;
pub mod tracing;

pub use auth::AuthLayer;
pub use cors::create_cors_layer;
pub use metrics::{GatewayMetrics, RequestTimer, StoreGauges};
pub use rate_limit::{RateLimitLayer, RateLimitState};
pub use tracing::TracingLayer;
