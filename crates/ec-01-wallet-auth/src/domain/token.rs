//! # Session Tokens
//!
//! Bearer tokens handed out after a successful wallet verification.
//!
//! ## Format
//!
//! ```text
//! {wallet}.{issued_at}.{expires_at}.{admin}.{hmac}
//! ```
//!
//! Timestamps are unix seconds, `admin` is `0` or `1`, and `hmac` is the
//! hex HMAC-SHA256 of everything before the last dot. Base58 wallet text
//! never contains a dot.

use super::entities::{SessionToken, TokenClaims};
use super::errors::TokenError;
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shared_types::{checked_ttl, Clock, TtlError, WalletAddress};
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// Token lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 86_400;

/// Issues and validates HMAC-signed session tokens.
pub struct TokenIssuer {
    secret: [u8; 32],
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    /// Create an issuer keyed by `secret`.
    ///
    /// # Errors
    /// * `TtlError` - `ttl` is zero or longer than `MAX_TTL_SECS`
    pub fn new(
        secret: [u8; 32],
        ttl: std::time::Duration,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, TtlError> {
        Ok(Self {
            secret,
            ttl: checked_ttl(ttl)?,
            clock,
        })
    }

    /// Issue a token for `wallet`.
    pub fn issue(&self, wallet: &WalletAddress, is_admin: bool) -> Result<SessionToken, TokenError> {
        let issued_at = truncate_to_seconds(self.clock.now());
        let expires_at = issued_at + self.ttl;

        let payload = format!(
            "{}.{}.{}.{}",
            wallet,
            issued_at.timestamp(),
            expires_at.timestamp(),
            u8::from(is_admin)
        );
        let tag = hex::encode(self.mac(&payload)?.finalize().into_bytes());

        Ok(SessionToken {
            token: format!("{payload}.{tag}"),
            claims: TokenClaims {
                wallet: wallet.clone(),
                issued_at,
                expires_at,
                is_admin,
            },
        })
    }

    /// Check the MAC and expiry of `token` and return its claims.
    pub fn validate(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let (payload, tag_hex) = token.rsplit_once('.').ok_or(TokenError::Malformed)?;
        let tag = hex::decode(tag_hex).map_err(|_| TokenError::Malformed)?;

        // verify_slice compares in constant time
        self.mac(payload)?
            .verify_slice(&tag)
            .map_err(|_| TokenError::BadSignature)?;

        let claims = parse_payload(payload)?;
        if self.clock.now() >= claims.expires_at {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    fn mac(&self, payload: &str) -> Result<HmacSha256, TokenError> {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret).map_err(|_| TokenError::KeyRejected)?;
        mac.update(payload.as_bytes());
        Ok(mac)
    }
}

fn parse_payload(payload: &str) -> Result<TokenClaims, TokenError> {
    let mut parts = payload.split('.');
    let (Some(wallet), Some(issued), Some(expires), Some(admin), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let wallet = WalletAddress::parse(wallet).map_err(|_| TokenError::Malformed)?;
    let issued_at = parse_timestamp(issued)?;
    let expires_at = parse_timestamp(expires)?;
    let is_admin = match admin {
        "0" => false,
        "1" => true,
        _ => return Err(TokenError::Malformed),
    };

    Ok(TokenClaims {
        wallet,
        issued_at,
        expires_at,
        is_admin,
    })
}

fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, TokenError> {
    text.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .ok_or(TokenError::Malformed)
}

fn truncate_to_seconds(time: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(time.timestamp(), 0).unwrap_or(time)
}
