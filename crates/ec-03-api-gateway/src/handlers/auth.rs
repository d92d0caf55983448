//! `/auth` routes: challenge issue and wallet verification.

use crate::domain::error::ApiResult;
use crate::domain::types::{NonceRequest, VerifyRequest};
use crate::router::AppState;
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use ec_01_wallet_auth::{AuthGrant, IssuedNonce};
use tracing::debug;

/// `POST /auth/nonce`
pub async fn request_nonce(
    State(state): State<AppState>,
    payload: Result<Json<NonceRequest>, JsonRejection>,
) -> ApiResult<Json<IssuedNonce>> {
    let Json(body) = payload?;

    let issued = state.auth.request_nonce(&body.wallet_address)?;
    state.metrics.record_nonce_issued();

    debug!(wallet = %body.wallet_address, expires_at = %issued.expires_at, "Challenge issued");
    Ok(Json(issued))
}

/// `POST /auth/verify`
pub async fn verify(
    State(state): State<AppState>,
    payload: Result<Json<VerifyRequest>, JsonRejection>,
) -> ApiResult<Json<AuthGrant>> {
    let Json(body) = payload?;

    let grant = state
        .auth
        .verify(&body.wallet_address, &body.signature, &body.nonce)?;
    state.metrics.record_wallet_verified();

    Ok(Json(grant))
}
