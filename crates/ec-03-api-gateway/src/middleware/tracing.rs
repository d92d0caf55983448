//! Request tracing middleware.
//!
//! Opens one span per request, logs the outcome, and feeds
//! `GatewayMetrics` with the status and latency.

use super::metrics::{GatewayMetrics, RequestTimer};
use crate::domain::methods::is_write_method;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::Request,
    response::Response,
};
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::{debug, info_span, warn, Instrument, Span};

/// Tracing layer that creates spans for each request
#[derive(Clone)]
pub struct TracingLayer {
    metrics: Arc<GatewayMetrics>,
}

impl TracingLayer {
    pub fn new(metrics: Arc<GatewayMetrics>) -> Self {
        Self { metrics }
    }
}

impl<S> Layer<S> for TracingLayer {
    type Service = TracingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TracingService {
            inner,
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Tracing service
#[derive(Clone)]
pub struct TracingService<S> {
    inner: S,
    metrics: Arc<GatewayMetrics>,
}

impl<S> Service<Request<Body>> for TracingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let mut inner = self.inner.clone();

        let method = req.method().clone();
        // Route template, so wallet addresses and session ids stay out of span names
        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|p| p.as_str().to_string())
            .unwrap_or_else(|| req.uri().path().to_string());

        let span = info_span!(
            "http_request",
            http.method = %method,
            http.route = %route,
            http.status = tracing::field::Empty,
            trace.parent = tracing::field::Empty,
        );

        if let Some(parent) = extract_trace_id(&req) {
            span.record("trace.parent", parent.as_str());
        }

        let timer = RequestTimer::new(Arc::clone(&self.metrics), is_write_method(&method));

        Box::pin(
            async move {
                let result = inner.call(req).await;

                match &result {
                    Ok(response) => {
                        let status = response.status();
                        let success = !(status.is_client_error() || status.is_server_error());
                        let latency_ms = timer.finish(success);
                        Span::current().record("http.status", status.as_u16());

                        if status.is_server_error() {
                            warn!(status = status.as_u16(), latency_ms, "Request failed");
                        } else {
                            debug!(status = status.as_u16(), latency_ms, "Request finished");
                        }
                    }
                    Err(_) => {
                        timer.finish(false);
                    }
                }

                result
            }
            .instrument(span),
        )
    }
}

/// Trace id from a W3C `traceparent` header
/// (`version-trace_id-parent_id-trace_flags`).
fn extract_trace_id<B>(req: &Request<B>) -> Option<String> {
    let traceparent = req.headers().get("traceparent")?.to_str().ok()?;

    let parts: Vec<&str> = traceparent.split('-').collect();
    if parts.len() != 4 || parts[1].len() != 32 {
        return None;
    }

    Some(parts[1].to_string())
}
