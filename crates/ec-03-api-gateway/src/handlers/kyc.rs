//! `/kyc` routes: session lifecycle.

use crate::domain::error::ApiResult;
use crate::domain::types::{CreateSessionRequest, DeleteResponse, SessionList};
use crate::router::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Extension, Json,
};
use ec_01_wallet_auth::TokenClaims;
use ec_02_kyc_sessions::{KycSession, PersonalData};
use tracing::info;

/// `POST /kyc/session`
pub async fn create_session(
    State(state): State<AppState>,
    payload: Result<Json<CreateSessionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<KycSession>)> {
    let Json(body) = payload?;

    let session = state
        .kyc
        .create_session(&body.wallet_address, &body.credential_type)?;
    state.metrics.record_session_created();

    Ok((StatusCode::CREATED, Json(session)))
}

/// `GET /kyc/session/{id}`
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<KycSession>> {
    Ok(Json(state.kyc.get_session(&id)?))
}

/// `PUT /kyc/session/{id}`
///
/// The body is a partial personal-data record; present fields overwrite
/// the stored ones.
pub async fn update_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<PersonalData>, JsonRejection>,
) -> ApiResult<Json<KycSession>> {
    let Json(patch) = payload?;
    Ok(Json(state.kyc.update_session(&id, patch)?))
}

/// `POST /kyc/session/{id}/submit`
///
/// Answers 200 with the evaluated session whether it passed or failed; the
/// verdict is in `status` and `verificationResult`.
pub async fn submit_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<KycSession>> {
    let session = state.kyc.submit_session(&id)?;
    state.metrics.record_submission(session.status);

    info!(
        session_id = %session.session_id,
        status = session.status.as_str(),
        "Session submitted"
    );
    Ok(Json(session))
}

/// `DELETE /kyc/session/{id}`
pub async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    let deleted = state.kyc.delete_session(&id)?;
    Ok(Json(DeleteResponse { deleted }))
}

/// `GET /kyc/sessions` (bearer token)
///
/// Sessions opened by the wallet the token was issued to.
pub async fn list_my_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<TokenClaims>,
) -> Json<SessionList> {
    Json(SessionList::from(state.kyc.sessions_for_wallet(&claims.wallet)))
}
