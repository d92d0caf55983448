//! Bearer-token authentication middleware.
//!
//! Validates the session token issued by `POST /auth/verify` and hands the
//! decoded `TokenClaims` to the handler through request extensions.
//! Applied with `route_layer` to the protected routes only.

use super::metrics::GatewayMetrics;
use crate::domain::error::ApiError;
use axum::{
    body::Body,
    http::{header, Request},
    response::{IntoResponse, Response},
};
use ec_01_wallet_auth::WalletAuthApi;
use std::sync::Arc;
use tower::{Layer, Service};
use tracing::{debug, warn};

/// Authentication layer
#[derive(Clone)]
pub struct AuthLayer {
    auth: Arc<dyn WalletAuthApi>,
    metrics: Arc<GatewayMetrics>,
    require_admin: bool,
}

impl AuthLayer {
    /// Accept any valid session token.
    pub fn new(auth: Arc<dyn WalletAuthApi>, metrics: Arc<GatewayMetrics>) -> Self {
        Self {
            auth,
            metrics,
            require_admin: false,
        }
    }

    /// Additionally require the token to carry `isAdmin`.
    pub fn admin_only(mut self) -> Self {
        self.require_admin = true;
        self
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            auth: Arc::clone(&self.auth),
            metrics: Arc::clone(&self.metrics),
            require_admin: self.require_admin,
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    auth: Arc<dyn WalletAuthApi>,
    metrics: Arc<GatewayMetrics>,
    require_admin: bool,
}

impl<S> Service<Request<Body>> for AuthService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<Body>) -> Self::Future {
        let auth = Arc::clone(&self.auth);
        let metrics = Arc::clone(&self.metrics);
        let require_admin = self.require_admin;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let token = match extract_bearer_token(&req) {
                Some(token) => token,
                None => {
                    metrics.record_auth_rejection();
                    debug!(path = %req.uri().path(), "Missing bearer token");
                    return Ok(ApiError::unauthorized("Missing bearer token").into_response());
                }
            };

            let claims = match auth.authenticate(token) {
                Ok(claims) => claims,
                Err(e) => {
                    metrics.record_auth_rejection();
                    warn!(error = %e, "Session token rejected");
                    return Ok(ApiError::from(e).into_response());
                }
            };

            if require_admin && !claims.is_admin {
                metrics.record_auth_rejection();
                warn!(wallet = %claims.wallet, "Admin route denied");
                return Ok(ApiError::forbidden("Administrator token required").into_response());
            }

            debug!(wallet = %claims.wallet, is_admin = claims.is_admin, "Token accepted");
            req.extensions_mut().insert(claims);

            inner.call(req).await
        })
    }
}

/// Token from an `Authorization: Bearer <token>` header.
fn extract_bearer_token<B>(req: &Request<B>) -> Option<&str> {
    let value = req.headers().get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(value: &str) -> Request<Body> {
        Request::builder()
            .header("Authorization", value)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_bearer_extraction() {
        let req = request_with("Bearer abc.def");
        assert_eq!(extract_bearer_token(&req), Some("abc.def"));

        let req = request_with("bearer   abc.def ");
        assert_eq!(extract_bearer_token(&req), Some("abc.def"));
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert_eq!(extract_bearer_token(&request_with("Basic dXNlcg==")), None);
        assert_eq!(extract_bearer_token(&request_with("Bearer")), None);
        assert_eq!(extract_bearer_token(&request_with("Bearer   ")), None);
    }

    #[test]
    fn test_missing_header() {
        let req = Request::builder().body(Body::empty()).unwrap();
        assert_eq!(extract_bearer_token(&req), None);
    }
}
