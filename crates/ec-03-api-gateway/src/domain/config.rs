//! Gateway configuration with validation.
//!
//! Every section is `#[serde(default)]`, so a partial config (or none at
//! all) yields working defaults. The one value with no usable default is the
//! token secret, which `validate` insists on.

use ec_01_wallet_auth::{WalletAuthConfig, DEFAULT_NONCE_TTL_SECS, DEFAULT_TOKEN_TTL_SECS};
use ec_02_kyc_sessions::DEFAULT_SESSION_TTL_SECS;
use serde::{Deserialize, Serialize};
use shared_types::{WalletAddress, MAX_TTL_SECS};
use std::collections::HashSet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Main gateway configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// HTTP server configuration
    pub http: HttpConfig,
    /// Wallet authentication settings
    pub auth: AuthConfig,
    /// KYC session lifetime and sweeping
    pub sessions: SessionConfig,
    /// Rate limiting configuration
    pub rate_limit: RateLimitConfig,
    /// Request size limits
    pub limits: LimitsConfig,
    /// Timeout configuration
    pub timeouts: TimeoutConfig,
    /// CORS configuration
    pub cors: CorsConfig,
}

impl GatewayConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Validate rate limits
        if self.rate_limit.requests_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "requests_per_second cannot be 0".into(),
            ));
        }
        if self.rate_limit.writes_per_second == 0 {
            return Err(ConfigError::InvalidRateLimit(
                "writes_per_second cannot be 0".into(),
            ));
        }

        // Validate limits
        if self.limits.max_request_size == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_request_size cannot be 0".into(),
            ));
        }

        // Validate timeouts and lifetimes
        let durations = [
            ("request timeout", self.timeouts.request_secs),
            ("nonce lifetime", self.auth.nonce_ttl_secs),
            ("token lifetime", self.auth.token_ttl_secs),
            ("session lifetime", self.sessions.session_ttl_secs),
            ("sweep interval", self.sessions.sweep_interval_secs),
            ("bucket idle time", self.rate_limit.bucket_idle_secs),
        ];
        for (name, secs) in durations {
            if secs == 0 || secs > MAX_TTL_SECS {
                return Err(ConfigError::InvalidTimeout(format!(
                    "{name} of {secs}s is outside 1..={MAX_TTL_SECS}s"
                )));
            }
        }

        // Validate secrets and admin list
        self.auth.token_secret_bytes()?;
        self.auth.admin_wallet_set()?;

        Ok(())
    }

    /// Get HTTP server bind address
    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }

    /// Build the wallet authentication settings.
    pub fn wallet_auth_config(&self) -> Result<WalletAuthConfig, ConfigError> {
        Ok(WalletAuthConfig {
            nonce_ttl: Duration::from_secs(self.auth.nonce_ttl_secs),
            token_ttl: Duration::from_secs(self.auth.token_ttl_secs),
            token_secret: self.auth.token_secret_bytes()?,
            admin_wallets: self.auth.admin_wallet_set()?,
        })
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Bind address
    pub host: IpAddr,
    /// Port (default: 8080)
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)),
            port: 8080,
        }
    }
}

/// Wallet authentication configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HMAC key for session tokens, 64 hex characters
    #[serde(skip_serializing)]
    pub token_secret: String,
    /// Wallets granted `isAdmin` (base58)
    pub admin_wallets: Vec<String>,
    /// Challenge lifetime in seconds
    pub nonce_ttl_secs: u64,
    /// Session token lifetime in seconds
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: String::new(),
            admin_wallets: Vec::new(),
            nonce_ttl_secs: DEFAULT_NONCE_TTL_SECS,
            token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
        }
    }
}

impl AuthConfig {
    /// Decode the token secret.
    pub fn token_secret_bytes(&self) -> Result<[u8; 32], ConfigError> {
        let text = self.token_secret.trim();
        if text.is_empty() {
            return Err(ConfigError::MissingTokenSecret);
        }

        let bytes =
            hex::decode(text).map_err(|e| ConfigError::InvalidTokenSecret(e.to_string()))?;
        let secret: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            ConfigError::InvalidTokenSecret(format!("expected 32 bytes, got {}", b.len()))
        })?;

        if secret == [0u8; 32] {
            return Err(ConfigError::InvalidTokenSecret(
                "secret must not be all zeroes".into(),
            ));
        }
        Ok(secret)
    }

    /// Parse the admin wallet list.
    pub fn admin_wallet_set(&self) -> Result<HashSet<WalletAddress>, ConfigError> {
        self.admin_wallets
            .iter()
            .map(|text| {
                WalletAddress::parse(text)
                    .map_err(|e| ConfigError::InvalidAdminWallet(format!("{text}: {}", e.reason)))
            })
            .collect()
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("admin_wallets", &self.admin_wallets)
            .field("nonce_ttl_secs", &self.nonce_ttl_secs)
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

/// KYC session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Session lifetime in seconds
    pub session_ttl_secs: u64,
    /// Interval between expiry sweeps in seconds
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            sweep_interval_secs: 300,
        }
    }
}

impl SessionConfig {
    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests per second per IP (reads)
    pub requests_per_second: u32,
    /// Write requests per second per IP (POST, PUT, DELETE)
    pub writes_per_second: u32,
    /// Burst allowance (token bucket)
    pub burst_size: u32,
    /// Enable rate limiting
    pub enabled: bool,
    /// IPs to whitelist from rate limiting
    pub whitelist: Vec<IpAddr>,
    /// Reverse proxies whose `X-Forwarded-For` / `X-Real-IP` are believed.
    /// Requests from any other peer are keyed by the socket address.
    pub trusted_proxies: Vec<IpAddr>,
    /// Buckets idle for longer than this are dropped (seconds)
    pub bucket_idle_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 50,
            writes_per_second: 10,
            burst_size: 100,
            enabled: true,
            whitelist: vec![IpAddr::V4(Ipv4Addr::LOCALHOST)],
            trusted_proxies: Vec::new(),
            bucket_idle_secs: 300,
        }
    }
}

/// Request limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Max request body size in bytes (default: 64KB)
    pub max_request_size: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_request_size: 64 * 1024,
        }
    }
}

/// Timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-request timeout in seconds
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 10 }
    }
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Enable CORS
    pub enabled: bool,
    /// Allowed origins ("*" for all)
    pub allowed_origins: Vec<String>,
    /// Allowed methods
    pub allowed_methods: Vec<String>,
    /// Allowed headers
    pub allowed_headers: Vec<String>,
    /// Expose headers
    pub expose_headers: Vec<String>,
    /// Max age for preflight cache
    pub max_age: u64,
    /// Allow credentials
    pub allow_credentials: bool,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            allowed_methods: vec![
                "GET".to_string(),
                "POST".to_string(),
                "PUT".to_string(),
                "DELETE".to_string(),
                "OPTIONS".to_string(),
            ],
            allowed_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
            expose_headers: vec!["Retry-After".to_string()],
            max_age: 86400, // 24 hours
            allow_credentials: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Invalid rate limiting configuration
    #[error("invalid rate limit: {0}")]
    InvalidRateLimit(String),
    /// Invalid size or count limit
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    /// Invalid timeout or lifetime value
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    /// No token secret configured
    #[error("token secret is not set")]
    MissingTokenSecret,
    /// Token secret is not 32 hex-encoded bytes
    #[error("invalid token secret: {0}")]
    InvalidTokenSecret(String),
    /// An admin wallet entry is not a valid address
    #[error("invalid admin wallet: {0}")]
    InvalidAdminWallet(String),
}
