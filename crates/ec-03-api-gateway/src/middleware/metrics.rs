//! Gateway metrics.
//!
//! Plain atomic counters, exported as JSON on `GET /metrics`.

use ec_02_kyc_sessions::SessionStatus;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// API Gateway metrics
#[derive(Debug, Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_error: AtomicU64,
    pub write_requests_total: AtomicU64,

    // Rejections before the handler ran
    pub rate_limit_rejected: AtomicU64,
    pub auth_rejected: AtomicU64,

    // Wallet authentication
    pub nonces_issued: AtomicU64,
    pub wallets_verified: AtomicU64,

    // KYC sessions
    pub sessions_created: AtomicU64,
    pub sessions_completed: AtomicU64,
    pub sessions_failed: AtomicU64,

    // Background sweeps
    pub sweeps_run: AtomicU64,
    pub sessions_swept: AtomicU64,
    pub nonces_swept: AtomicU64,

    // Latency tracking (simplified - in production use histograms)
    pub total_latency_ms: AtomicU64,
    pub request_count_for_latency: AtomicU64,
}

/// Point-in-time sizes read from the stores when exporting.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreGauges {
    pub pending_nonces: usize,
    pub live_sessions: usize,
    pub tracked_ips: usize,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request
    pub fn record_request(&self, success: bool, is_write: bool, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);

        if success {
            self.requests_success.fetch_add(1, Ordering::Relaxed);
        } else {
            self.requests_error.fetch_add(1, Ordering::Relaxed);
        }

        if is_write {
            self.write_requests_total.fetch_add(1, Ordering::Relaxed);
        }

        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
        self.request_count_for_latency
            .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rate_limit_rejection(&self) {
        self.rate_limit_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_auth_rejection(&self) {
        self.auth_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_nonce_issued(&self) {
        self.nonces_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_wallet_verified(&self) {
        self.wallets_verified.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session_created(&self) {
        self.sessions_created.fetch_add(1, Ordering::Relaxed);
    }

    /// Record the verdict of a submission
    pub fn record_submission(&self, status: SessionStatus) {
        match status {
            SessionStatus::Completed => {
                self.sessions_completed.fetch_add(1, Ordering::Relaxed);
            }
            SessionStatus::Failed => {
                self.sessions_failed.fetch_add(1, Ordering::Relaxed);
            }
            SessionStatus::Pending | SessionStatus::InProgress => {}
        }
    }

    /// Record one sweeper pass
    pub fn record_sweep(&self, sessions: usize, nonces: usize) {
        self.sweeps_run.fetch_add(1, Ordering::Relaxed);
        self.sessions_swept
            .fetch_add(sessions as u64, Ordering::Relaxed);
        self.nonces_swept.fetch_add(nonces as u64, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.request_count_for_latency.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self, gauges: StoreGauges) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
                "error": self.requests_error.load(Ordering::Relaxed),
                "writes": self.write_requests_total.load(Ordering::Relaxed),
            },
            "rejections": {
                "rate_limited": self.rate_limit_rejected.load(Ordering::Relaxed),
                "unauthorized": self.auth_rejected.load(Ordering::Relaxed),
            },
            "auth": {
                "nonces_issued": self.nonces_issued.load(Ordering::Relaxed),
                "wallets_verified": self.wallets_verified.load(Ordering::Relaxed),
                "pending_nonces": gauges.pending_nonces,
            },
            "kyc": {
                "sessions_created": self.sessions_created.load(Ordering::Relaxed),
                "sessions_completed": self.sessions_completed.load(Ordering::Relaxed),
                "sessions_failed": self.sessions_failed.load(Ordering::Relaxed),
                "live_sessions": gauges.live_sessions,
            },
            "sweeper": {
                "runs": self.sweeps_run.load(Ordering::Relaxed),
                "sessions_removed": self.sessions_swept.load(Ordering::Relaxed),
                "nonces_removed": self.nonces_swept.load(Ordering::Relaxed),
            },
            "rate_limiting": {
                "tracked_ips": gauges.tracked_ips,
            },
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

/// Request timing helper
pub struct RequestTimer {
    start: Instant,
    metrics: Arc<GatewayMetrics>,
    is_write: bool,
}

impl RequestTimer {
    pub fn new(metrics: Arc<GatewayMetrics>, is_write: bool) -> Self {
        Self {
            start: Instant::now(),
            metrics,
            is_write,
        }
    }

    /// Record the request and return its latency in ms
    pub fn finish(self, success: bool) -> u64 {
        let latency_ms = self.start.elapsed().as_millis() as u64;
        self.metrics
            .record_request(success, self.is_write, latency_ms);
        latency_ms
    }
}
