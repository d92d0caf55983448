//! Rate limiting middleware using the token bucket algorithm.
//!
//! Per-IP limits with a tighter budget for writes (`POST /auth/nonce`,
//! `POST /kyc/session`, ...) than for reads, so a single client cannot churn
//! challenges or flood the session store.
//!
//! Buckets are keyed by the socket peer. `X-Forwarded-For` and `X-Real-IP`
//! are only read when that peer is a configured trusted proxy; from anyone
//! else they are client-controlled and ignored.

use super::metrics::GatewayMetrics;
use crate::domain::config::RateLimitConfig;
use crate::domain::error::ApiError;
use crate::domain::methods::is_write_method;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    clock::{Clock, DefaultClock},
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::{Layer, Service};
use tracing::{debug, warn};

type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Token buckets for one IP address
struct TokenBucket {
    read_limiter: DirectLimiter,
    write_limiter: DirectLimiter,
    /// Last access time (for cleanup)
    last_access: Instant,
}

impl TokenBucket {
    fn new(config: &RateLimitConfig) -> Self {
        let read_quota = Quota::per_second(non_zero(config.requests_per_second))
            .allow_burst(non_zero(config.burst_size.max(config.requests_per_second)));

        let write_burst = (config.burst_size / 10).max(config.writes_per_second);
        let write_quota =
            Quota::per_second(non_zero(config.writes_per_second)).allow_burst(non_zero(write_burst));

        Self {
            read_limiter: RateLimiter::direct(read_quota),
            write_limiter: RateLimiter::direct(write_quota),
            last_access: Instant::now(),
        }
    }

    /// Take one token, or report how long until one is available.
    fn check(&mut self, is_write: bool) -> Result<(), Duration> {
        self.last_access = Instant::now();
        let limiter = if is_write {
            &self.write_limiter
        } else {
            &self.read_limiter
        };

        limiter
            .check()
            .map_err(|not_until| not_until.wait_time_from(DefaultClock::default().now()))
    }
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Rate limiter state shared across requests
pub struct RateLimitState {
    /// Per-IP token buckets
    buckets: DashMap<IpAddr, TokenBucket>,
    config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
        }
    }

    /// Check if a request from `ip` should be allowed
    pub fn check(&self, ip: IpAddr, is_write: bool) -> Result<(), Duration> {
        if !self.config.enabled || self.config.whitelist.contains(&ip) {
            return Ok(());
        }

        let mut bucket = self.buckets.entry(ip).or_insert_with(|| {
            debug!(ip = %ip, "Creating new rate limit bucket");
            TokenBucket::new(&self.config)
        });

        bucket.check(is_write)
    }

    /// Drop buckets idle for longer than `max_age`
    pub fn cleanup(&self, max_age: Duration) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_access) <= max_age);
        let removed = before.saturating_sub(self.buckets.len());
        if removed > 0 {
            debug!(removed, "Removed idle rate limit buckets");
        }
        removed
    }

    /// Number of tracked IPs
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    /// The address a request is charged to.
    pub fn client_ip<B>(&self, req: &Request<B>) -> IpAddr {
        resolve_client_ip(req, &self.config.trusted_proxies)
    }

    /// How long a bucket may sit idle before cleanup drops it
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.config.bucket_idle_secs)
    }
}

/// Rate limit layer
#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimitState>,
    metrics: Arc<GatewayMetrics>,
}

impl RateLimitLayer {
    pub fn new(state: Arc<RateLimitState>, metrics: Arc<GatewayMetrics>) -> Self {
        Self { state, metrics }
    }

    pub fn state(&self) -> Arc<RateLimitState> {
        Arc::clone(&self.state)
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: Arc::clone(&self.state),
            metrics: Arc::clone(&self.metrics),
        }
    }
}

/// Rate limit service
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<RateLimitState>,
    metrics: Arc<GatewayMetrics>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
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

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let metrics = Arc::clone(&self.metrics);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ip = state.client_ip(&req);
            let is_write = is_write_method(req.method());

            match state.check(ip, is_write) {
                Ok(()) => inner.call(req).await,
                Err(retry_after) => {
                    let retry_ms = retry_after.as_millis() as u64;
                    metrics.record_rate_limit_rejection();
                    warn!(
                        ip = %ip,
                        retry_after_ms = retry_ms,
                        is_write = is_write,
                        "Rate limit exceeded"
                    );

                    Ok(rate_limit_response(retry_ms))
                }
            }
        })
    }
}

/// Resolve the client address for `req`.
///
/// The socket peer wins unless it is in `trusted_proxies`. Behind a trusted
/// proxy the rightmost `X-Forwarded-For` entry that is not itself a trusted
/// proxy is the client, falling back to `X-Real-IP`, then the peer.
fn resolve_client_ip<B>(req: &Request<B>, trusted_proxies: &[IpAddr]) -> IpAddr {
    // In-process callers (tests, internal routing) count as localhost
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|connect_info| connect_info.0.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));

    let forwarded = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok());

    if !trusted_proxies.contains(&peer) {
        if forwarded.is_some() || req.headers().contains_key("x-real-ip") {
            debug!(peer = %peer, "Ignoring forwarding headers from untrusted peer");
        }
        return peer;
    }

    if let Some(ip) = forwarded.and_then(|value| {
        value
            .rsplit(',')
            .filter_map(|entry| entry.trim().parse::<IpAddr>().ok())
            .find(|ip| !trusted_proxies.contains(ip))
    }) {
        return ip;
    }

    req.headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<IpAddr>().ok())
        .unwrap_or(peer)
}

/// Create rate limit exceeded response
fn rate_limit_response(retry_after_ms: u64) -> Response {
    let mut response = ApiError::rate_limited(retry_after_ms).into_response();
    let retry_secs = retry_after_ms.div_ceil(1000).max(1);
    if let Ok(value) = HeaderValue::from_str(&retry_secs.to_string()) {
        response.headers_mut().insert(header::RETRY_AFTER, value);
    }
    response
}

/// Background task to clean up stale rate limit buckets
pub async fn cleanup_task(state: Arc<RateLimitState>, interval: Duration) {
    let mut cleanup_interval = tokio::time::interval(interval);
    cleanup_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        cleanup_interval.tick().await;
        state.cleanup(state.idle_timeout());
    }
}
