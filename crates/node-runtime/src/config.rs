//! # Runtime Configuration
//!
//! Builds the gateway configuration from defaults plus `EC_*` environment
//! overrides.
//!
//! | Variable | Field |
//! |----------|-------|
//! | `EC_HTTP_HOST` | `http.host` |
//! | `EC_HTTP_PORT` | `http.port` |
//! | `EC_TOKEN_SECRET` | `auth.token_secret` (64 hex chars, required) |
//! | `EC_ADMIN_WALLETS` | `auth.admin_wallets` (comma-separated) |
//! | `EC_NONCE_TTL_SECS` | `auth.nonce_ttl_secs` |
//! | `EC_TOKEN_TTL_SECS` | `auth.token_ttl_secs` |
//! | `EC_SESSION_TTL_SECS` | `sessions.session_ttl_secs` |
//! | `EC_SWEEP_INTERVAL_SECS` | `sessions.sweep_interval_secs` |
//! | `EC_RATE_LIMIT_RPS` | `rate_limit.requests_per_second` |
//! | `EC_TRUSTED_PROXIES` | `rate_limit.trusted_proxies` (comma-separated IPs) |
//! | `EC_CORS_ORIGINS` | `cors.allowed_origins` (comma-separated) |
//! | `EC_LEDGER_SEED` | path to a JSON array of credential accounts |
//!
//! A variable that is set but unparseable is an error, not a fallback.

use ec_03_api_gateway::GatewayConfig;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

/// Errors raised while reading the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvConfigError {
    #[error("{var} has invalid value {value:?}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything the node needs to start.
#[derive(Debug, Clone, Default)]
pub struct NodeConfig {
    /// HTTP surface, auth and session settings
    pub gateway: GatewayConfig,
    /// Credential accounts to preload into the ledger
    pub ledger_seed: Option<PathBuf>,
}

impl NodeConfig {
    /// Node with no ledger seed.
    pub fn new(gateway: GatewayConfig) -> Self {
        Self {
            gateway,
            ledger_seed: None,
        }
    }
}

/// Load configuration from the process environment.
pub fn load_config() -> Result<NodeConfig, EnvConfigError> {
    load_config_from(|var| std::env::var(var).ok())
}

/// Load configuration through `lookup`, then validate it.
pub fn load_config_from<F>(lookup: F) -> Result<NodeConfig, EnvConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = GatewayConfig::default();

    if let Some(host) = parsed(&lookup, "EC_HTTP_HOST")? {
        config.http.host = host;
    }
    if let Some(port) = parsed(&lookup, "EC_HTTP_PORT")? {
        config.http.port = port;
    }

    config.auth.token_secret = non_empty(&lookup, "EC_TOKEN_SECRET")
        .ok_or(EnvConfigError::Missing("EC_TOKEN_SECRET"))?;
    info!("Loaded token secret from environment");

    if let Some(wallets) = non_empty(&lookup, "EC_ADMIN_WALLETS") {
        config.auth.admin_wallets = split_list(&wallets);
    }
    if let Some(ttl) = parsed(&lookup, "EC_NONCE_TTL_SECS")? {
        config.auth.nonce_ttl_secs = ttl;
    }
    if let Some(ttl) = parsed(&lookup, "EC_TOKEN_TTL_SECS")? {
        config.auth.token_ttl_secs = ttl;
    }
    if let Some(ttl) = parsed(&lookup, "EC_SESSION_TTL_SECS")? {
        config.sessions.session_ttl_secs = ttl;
    }
    if let Some(interval) = parsed(&lookup, "EC_SWEEP_INTERVAL_SECS")? {
        config.sessions.sweep_interval_secs = interval;
    }
    if let Some(rps) = parsed(&lookup, "EC_RATE_LIMIT_RPS")? {
        config.rate_limit.requests_per_second = rps;
    }
    if let Some(proxies) = non_empty(&lookup, "EC_TRUSTED_PROXIES") {
        config.rate_limit.trusted_proxies = split_list(&proxies)
            .into_iter()
            .map(|entry| {
                entry
                    .parse::<IpAddr>()
                    .map_err(|e| EnvConfigError::InvalidValue {
                        var: "EC_TRUSTED_PROXIES",
                        value: entry.clone(),
                        reason: e.to_string(),
                    })
            })
            .collect::<Result<_, _>>()?;
    }
    if let Some(origins) = non_empty(&lookup, "EC_CORS_ORIGINS") {
        config.cors.allowed_origins = split_list(&origins);
    }

    config
        .validate()
        .map_err(|e| EnvConfigError::Invalid(e.to_string()))?;

    let ledger_seed = non_empty(&lookup, "EC_LEDGER_SEED").map(PathBuf::from);
    if let Some(path) = &ledger_seed {
        info!(path = %path.display(), "Ledger seed configured");
    }

    Ok(NodeConfig {
        gateway: config,
        ledger_seed,
    })
}

fn non_empty<F>(lookup: &F, var: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parsed<F, T>(lookup: &F, var: &'static str) -> Result<Option<T>, EnvConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    non_empty(lookup, var)
        .map(|value| {
            value.parse().map_err(|e: T::Err| EnvConfigError::InvalidValue {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
