//! CORS middleware.
//!
//! Wrapper around tower-http CORS with gateway configuration. The web client
//! calls the gateway cross-origin, so preflight for PUT/DELETE and the
//! `Authorization` header must be answered here.

use crate::domain::config::CorsConfig;
use axum::http::{HeaderName, HeaderValue, Method};
use std::str::FromStr;
use std::time::Duration;
use tower_http::cors::{AllowHeaders, AllowOrigin, Any, CorsLayer};

/// Create CORS layer from gateway config
pub fn create_cors_layer(config: &CorsConfig) -> CorsLayer {
    if !config.enabled {
        return CorsLayer::very_permissive();
    }

    let origins = if is_wildcard(&config.allowed_origins) {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(parse_all::<HeaderValue>(&config.allowed_origins))
    };

    let headers = if is_wildcard(&config.allowed_headers) {
        AllowHeaders::from(Any)
    } else {
        AllowHeaders::list(parse_all::<HeaderName>(&config.allowed_headers))
    };

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(parse_all::<Method>(&config.allowed_methods))
        .allow_headers(headers)
        .max_age(Duration::from_secs(config.max_age));

    if !config.expose_headers.is_empty() {
        cors = cors.expose_headers(parse_all::<HeaderName>(&config.expose_headers));
    }

    // tower-http rejects credentials combined with wildcards, so only honour
    // the flag for explicit lists.
    if config.allow_credentials
        && !is_wildcard(&config.allowed_origins)
        && !is_wildcard(&config.allowed_headers)
    {
        cors = cors.allow_credentials(true);
    }

    cors
}

fn is_wildcard(values: &[String]) -> bool {
    values.iter().any(|v| v == "*")
}

/// Parse every entry, skipping the ones that are not valid.
fn parse_all<T: FromStr>(values: &[String]) -> Vec<T> {
    values.iter().filter_map(|v| v.parse().ok()).collect()
}
