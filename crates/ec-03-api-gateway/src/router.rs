//! Route table and middleware wiring.

use crate::domain::config::GatewayConfig;
use crate::handlers::{admin, auth, credentials, kyc};
use crate::middleware::{
    create_cors_layer, AuthLayer, GatewayMetrics, RateLimitLayer, RateLimitState, TracingLayer,
};
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use ec_01_wallet_auth::WalletAuthApi;
use ec_02_kyc_sessions::KycApi;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn WalletAuthApi>,
    pub kyc: Arc<dyn KycApi>,
    pub metrics: Arc<GatewayMetrics>,
    pub rate_limit: Arc<RateLimitState>,
}

impl AppState {
    pub fn new(
        auth: Arc<dyn WalletAuthApi>,
        kyc: Arc<dyn KycApi>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            auth,
            kyc,
            metrics: Arc::new(GatewayMetrics::new()),
            rate_limit: Arc::new(RateLimitState::new(config.rate_limit.clone())),
        }
    }
}

/// Build the HTTP router.
///
/// | Route | Access |
/// |-------|--------|
/// | `GET /health` | public |
/// | `POST /auth/nonce`, `POST /auth/verify` | public |
/// | `POST /kyc/session`, `GET/PUT/DELETE /kyc/session/:id`, `POST /kyc/session/:id/submit` | public |
/// | `GET /credentials/:holder` | public |
/// | `GET /kyc/sessions` | bearer token |
/// | `GET /metrics` | admin bearer token |
pub fn build_router(state: AppState, config: &GatewayConfig) -> Router {
    let public = Router::new()
        .route("/health", get(admin::health))
        .route("/auth/nonce", post(auth::request_nonce))
        .route("/auth/verify", post(auth::verify))
        .route("/kyc/session", post(kyc::create_session))
        .route(
            "/kyc/session/:id",
            get(kyc::get_session)
                .put(kyc::update_session)
                .delete(kyc::delete_session),
        )
        .route("/kyc/session/:id/submit", post(kyc::submit_session))
        .route("/credentials/:holder", get(credentials::credential_status));

    let wallet = Router::new()
        .route("/kyc/sessions", get(kyc::list_my_sessions))
        .route_layer(AuthLayer::new(
            Arc::clone(&state.auth),
            Arc::clone(&state.metrics),
        ));

    let operator = Router::new()
        .route("/metrics", get(admin::metrics))
        .route_layer(
            AuthLayer::new(Arc::clone(&state.auth), Arc::clone(&state.metrics)).admin_only(),
        );

    let middleware = ServiceBuilder::new()
        .layer(create_cors_layer(&config.cors))
        .layer(TracingLayer::new(Arc::clone(&state.metrics)))
        .layer(RateLimitLayer::new(
            Arc::clone(&state.rate_limit),
            Arc::clone(&state.metrics),
        ))
        .layer(TimeoutLayer::new(config.timeouts.request()));

    public
        .merge(wallet)
        .merge(operator)
        .fallback(admin::not_found)
        .layer(middleware)
        .layer(DefaultBodyLimit::max(config.limits.max_request_size))
        .with_state(state)
}
