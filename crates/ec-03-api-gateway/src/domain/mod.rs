//! Domain types for the API Gateway.

pub mod config;
pub mod error;
pub mod methods;
pub mod types;

pub use config::{ConfigError, GatewayConfig};
pub use error::{ApiError, ApiResult, GatewayError};
pub use methods::is_write_method;
pub use types::*;
