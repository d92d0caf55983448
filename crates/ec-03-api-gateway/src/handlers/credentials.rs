//! `/credentials` routes: ledger-backed credential status.

use crate::domain::error::ApiResult;
use crate::router::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use ec_02_kyc_sessions::CredentialView;

/// `GET /credentials/{holder}`
pub async fn credential_status(
    State(state): State<AppState>,
    Path(holder): Path<String>,
) -> ApiResult<Json<CredentialView>> {
    Ok(Json(state.kyc.credential_status(&holder).await?))
}
