//! Operational routes.

use crate::domain::error::{codes, ApiError};
use crate::domain::types::HealthResponse;
use crate::middleware::StoreGauges;
use crate::router::AppState;
use axum::{extract::State, http::StatusCode, Json};

/// `GET /health`
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// `GET /metrics` (admin token)
pub async fn metrics(State(state): State<AppState>) -> Json<serde_json::Value> {
    let gauges = StoreGauges {
        pending_nonces: state.auth.pending_nonces(),
        live_sessions: state.kyc.session_count(),
        tracked_ips: state.rate_limit.bucket_count(),
    };
    Json(state.metrics.to_json(gauges))
}

/// Unknown routes answer with the standard error body.
pub async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, "No such route")
}
