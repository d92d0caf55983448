//! API Gateway service - main entry point.
//!
//! Owns the HTTP server and the background tasks that keep the in-memory
//! stores bounded: the expiry sweeper for sessions and nonces, and the rate
//! limiter's idle-bucket cleanup.

use crate::domain::config::GatewayConfig;
use crate::domain::error::GatewayError;
use crate::middleware::{rate_limit, GatewayMetrics};
use crate::router::{build_router, AppState};
use axum::Router;
use ec_01_wallet_auth::WalletAuthApi;
use ec_02_kyc_sessions::KycApi;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    state: AppState,
    shutdown_tx: Option<oneshot::Sender<()>>,
    server: Option<JoinHandle<std::io::Result<()>>>,
    background: Vec<JoinHandle<()>>,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(
        config: GatewayConfig,
        auth: Arc<dyn WalletAuthApi>,
        kyc: Arc<dyn KycApi>,
    ) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let state = AppState::new(auth, kyc, &config);

        Ok(Self {
            config,
            state,
            shutdown_tx: None,
            server: None,
            background: Vec::new(),
        })
    }

    /// Bind the HTTP listener, then serve and sweep in background tasks.
    ///
    /// Returns the bound address (useful when the configured port is 0).
    pub async fn start(&mut self) -> Result<SocketAddr, GatewayError> {
        if self.server.is_some() {
            return Err(GatewayError::AlreadyRunning);
        }

        info!("Starting API Gateway...");

        let listener = tokio::net::TcpListener::bind(self.config.http_addr())
            .await
            .map_err(|e| GatewayError::Bind(format!("{}: {e}", self.config.http_addr())))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        self.shutdown_tx = Some(shutdown_tx);

        self.start_background_tasks();

        let router = self.router();
        self.server = Some(tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.await;
            })
            .await
        }));

        info!(addr = %local_addr, "API Gateway started successfully");
        Ok(local_addr)
    }

    /// Trigger graceful shutdown and wait for in-flight requests to drain.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        for task in self.background.drain(..) {
            task.abort();
        }

        if let Some(server) = self.server.take() {
            match server.await {
                Ok(Ok(())) => info!("API Gateway stopped"),
                Ok(Err(e)) => error!(error = %e, "HTTP server error"),
                Err(e) => error!(error = %e, "HTTP server task failed"),
            }
        }
    }

    /// Whether the HTTP server task is still running.
    pub fn is_running(&self) -> bool {
        self.server
            .as_ref()
            .is_some_and(|server| !server.is_finished())
    }

    /// Get metrics
    pub fn metrics(&self) -> Arc<GatewayMetrics> {
        Arc::clone(&self.state.metrics)
    }

    /// The fully layered router, without a listener.
    pub fn router(&self) -> Router {
        build_router(self.state.clone(), &self.config)
    }

    fn start_background_tasks(&mut self) {
        let auth = Arc::clone(&self.state.auth);
        let kyc = Arc::clone(&self.state.kyc);
        let metrics = Arc::clone(&self.state.metrics);
        let interval = self.config.sessions.sweep_interval();
        self.background.push(tokio::spawn(async move {
            sweeper_task(auth, kyc, metrics, interval).await;
        }));

        let buckets = Arc::clone(&self.state.rate_limit);
        let interval = buckets.idle_timeout().max(Duration::from_secs(1));
        self.background.push(tokio::spawn(async move {
            rate_limit::cleanup_task(buckets, interval).await;
        }));
    }
}

/// Counts removed by one sweeper pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub sessions: usize,
    pub nonces: usize,
}

/// Remove expired sessions and abandoned challenges once.
pub fn run_sweep(
    auth: &dyn WalletAuthApi,
    kyc: &dyn KycApi,
    metrics: &GatewayMetrics,
) -> SweepReport {
    let report = SweepReport {
        sessions: kyc.sweep_expired_sessions(),
        nonces: auth.sweep_expired_nonces(),
    };
    metrics.record_sweep(report.sessions, report.nonces);

    if report.sessions > 0 || report.nonces > 0 {
        info!(
            sessions = report.sessions,
            nonces = report.nonces,
            "Swept expired entries"
        );
    } else {
        debug!("Sweep found nothing to remove");
    }
    report
}

/// Background sweeper. Runs until the task is aborted.
pub async fn sweeper_task(
    auth: Arc<dyn WalletAuthApi>,
    kyc: Arc<dyn KycApi>,
    metrics: Arc<GatewayMetrics>,
    interval: Duration,
) {
    let mut sweep_interval = tokio::time::interval(interval);
    sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep_interval.tick().await;
        run_sweep(auth.as_ref(), kyc.as_ref(), &metrics);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration as ChronoDuration;
    use ec_01_wallet_auth::{InMemoryNonceRepository, WalletAuthConfig, WalletAuthService};
    use ec_02_kyc_sessions::{InMemoryLedger, InMemorySessionRepository, KycService};
    use shared_types::{Clock, ManualClock, WalletAddress};
    use std::net::{IpAddr, Ipv4Addr};
    use std::sync::atomic::Ordering;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn config() -> GatewayConfig {
        let mut config = GatewayConfig::default();
        config.auth.token_secret = "5a".repeat(32);
        config.http.host = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.http.port = 0;
        config
    }

    fn services(clock: Arc<ManualClock>) -> (Arc<dyn WalletAuthApi>, Arc<dyn KycApi>) {
        let clock: Arc<dyn Clock> = clock;
        let auth = WalletAuthService::new(
            InMemoryNonceRepository::new(),
            Arc::clone(&clock),
            WalletAuthConfig::with_secret([0x5A; 32]),
        )
        .unwrap();
        let kyc = KycService::new(
            InMemorySessionRepository::new(),
            InMemoryLedger::new(),
            clock,
            Duration::from_secs(1_800),
        )
        .unwrap();
        (Arc::new(auth), Arc::new(kyc))
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let (auth, kyc) = services(Arc::new(ManualClock::default()));

        let result = ApiGatewayService::new(GatewayConfig::default(), auth, kyc);

        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_run_sweep_removes_expired_entries() {
        let clock = Arc::new(ManualClock::default());
        let (auth, kyc) = services(Arc::clone(&clock));
        let metrics = GatewayMetrics::new();
        let wallet = WalletAddress::from_public_key([7; 32]);

        auth.request_nonce(wallet.as_str()).unwrap();
        kyc.create_session(wallet.as_str(), "kycBasic").unwrap();

        assert_eq!(
            run_sweep(auth.as_ref(), kyc.as_ref(), &metrics),
            SweepReport::default()
        );

        clock.advance(ChronoDuration::hours(1));

        assert_eq!(
            run_sweep(auth.as_ref(), kyc.as_ref(), &metrics),
            SweepReport {
                sessions: 1,
                nonces: 1
            }
        );
        assert_eq!(kyc.session_count(), 0);
        assert_eq!(auth.pending_nonces(), 0);
        assert_eq!(metrics.sweeps_run.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn test_start_serves_and_shuts_down() {
        let (auth, kyc) = services(Arc::new(ManualClock::default()));
        let mut gateway = ApiGatewayService::new(config(), auth, kyc).unwrap();

        let addr = gateway.start().await.unwrap();
        assert!(gateway.is_running());
        assert!(matches!(
            gateway.start().await,
            Err(GatewayError::AlreadyRunning)
        ));

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();

        assert!(raw.starts_with("HTTP/1.1 200"));
        assert!(raw.contains(r#""status":"ok""#));

        gateway.shutdown().await;
        assert!(!gateway.is_running());
    }
}
