//! API Gateway error types.
//!
//! Every failure leaves the gateway as
//! `{"error": {"code", "message", "field"}}` with a matching HTTP status.
//! Domain errors from the wallet-auth and KYC crates are mapped here, at the
//! request boundary, and nowhere else.

use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use ec_01_wallet_auth::{AuthError, NonceError, TokenError};
use ec_02_kyc_sessions::{KycError, SessionError};
use serde::Serialize;
use shared_types::ValidationError;
use tracing::error;

/// Stable error codes carried in the response body
pub mod codes {
    // Request shape (400)
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const MALFORMED_BODY: &str = "MALFORMED_BODY";

    // Challenge state (400)
    pub const NONCE_NOT_FOUND: &str = "NONCE_NOT_FOUND";
    pub const NONCE_MISMATCH: &str = "NONCE_MISMATCH";
    pub const NONCE_EXPIRED: &str = "NONCE_EXPIRED";

    // Authentication (401 / 403)
    pub const INVALID_SIGNATURE: &str = "INVALID_SIGNATURE";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const TOKEN_EXPIRED: &str = "TOKEN_EXPIRED";
    pub const FORBIDDEN: &str = "FORBIDDEN";

    // Lookups (404)
    pub const SESSION_NOT_FOUND: &str = "SESSION_NOT_FOUND";
    pub const CREDENTIAL_NOT_FOUND: &str = "CREDENTIAL_NOT_FOUND";
    pub const NOT_FOUND: &str = "NOT_FOUND";

    // State conflicts (409)
    pub const SESSION_COMPLETED: &str = "SESSION_COMPLETED";

    // Limits (429)
    pub const RATE_LIMITED: &str = "RATE_LIMITED";

    // Server (500)
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// API Gateway error with HTTP status and stable code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// HTTP status
    pub status: StatusCode,
    /// Machine-readable code (see [`codes`])
    pub code: &'static str,
    /// Error message
    pub message: String,
    /// Offending request field, for validation errors
    pub field: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<&'a str>,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            field: None,
        }
    }

    /// Attach the offending field name
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Invalid input for `field`
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, codes::VALIDATION_ERROR, message).with_field(field)
    }

    /// Body could not be parsed
    pub fn malformed_body(details: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            codes::MALFORMED_BODY,
            format!("Malformed request body: {}", details.into()),
        )
    }

    /// Unauthorized - missing or invalid bearer token
    pub fn unauthorized(details: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, codes::UNAUTHORIZED, details)
    }

    /// Authenticated but not allowed
    pub fn forbidden(details: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, codes::FORBIDDEN, details)
    }

    /// Rate limited
    pub fn rate_limited(retry_after_ms: u64) -> Self {
        Self::new(
            StatusCode::TOO_MANY_REQUESTS,
            codes::RATE_LIMITED,
            format!("Rate limit exceeded, retry in {retry_after_ms}ms"),
        )
    }

    /// Internal error. Details are logged, never returned.
    pub fn internal(details: impl std::fmt::Display) -> Self {
        error!(error = %details, "Internal error");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            codes::INTERNAL_ERROR,
            "Internal server error",
        )
    }

    /// JSON body for this error
    pub fn to_body(&self) -> serde_json::Value {
        serde_json::to_value(ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
                field: self.field.as_deref(),
            },
        })
        .unwrap_or_else(|_| serde_json::json!({ "error": { "code": self.code } }))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (self.status, Json(self.to_body())).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Result type for handlers
pub type ApiResult<T> = Result<T, ApiError>;

// =============================================================================
// Domain error conversions
// =============================================================================

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::validation(e.field, e.to_string())
    }
}

impl From<NonceError> for ApiError {
    fn from(e: NonceError) -> Self {
        let code = match e {
            NonceError::NoPendingChallenge => codes::NONCE_NOT_FOUND,
            NonceError::NonceMismatch => codes::NONCE_MISMATCH,
            NonceError::NonceExpired => codes::NONCE_EXPIRED,
        };
        ApiError::new(StatusCode::BAD_REQUEST, code, e.to_string()).with_field("nonce")
    }
}

impl From<TokenError> for ApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => {
                ApiError::new(StatusCode::UNAUTHORIZED, codes::TOKEN_EXPIRED, e.to_string())
            }
            TokenError::Malformed | TokenError::BadSignature => {
                ApiError::unauthorized("Invalid session token")
            }
            TokenError::KeyRejected => ApiError::internal(e),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::Validation(v) => v.into(),
            AuthError::Nonce(n) => n.into(),
            AuthError::InvalidSignature => ApiError::new(
                StatusCode::UNAUTHORIZED,
                codes::INVALID_SIGNATURE,
                "Invalid wallet signature",
            )
            .with_field("signature"),
            AuthError::Token(t) => t.into(),
        }
    }
}

impl From<KycError> for ApiError {
    fn from(e: KycError) -> Self {
        match e {
            KycError::Validation(v) => v.into(),
            KycError::Session(SessionError::NotFound(id)) => ApiError::new(
                StatusCode::NOT_FOUND,
                codes::SESSION_NOT_FOUND,
                format!("Session {id} not found"),
            ),
            KycError::Session(SessionError::AlreadyCompleted(id)) => ApiError::new(
                StatusCode::CONFLICT,
                codes::SESSION_COMPLETED,
                format!("Session {id} is already completed"),
            ),
            KycError::CredentialNotFound(holder) => ApiError::new(
                StatusCode::NOT_FOUND,
                codes::CREDENTIAL_NOT_FOUND,
                format!("No credential found for {holder}"),
            ),
            KycError::Ledger(l) => ApiError::internal(l),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::malformed_body(rejection.body_text())
    }
}

/// Gateway lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Server socket bind error
    #[error("server bind error: {0}")]
    Bind(String),

    /// Start called twice
    #[error("gateway already running")]
    AlreadyRunning,

    /// Internal server error
    #[error("internal error: {0}")]
    Internal(String),
}
