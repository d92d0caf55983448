//! # Node Runtime
//!
//! Wires the in-memory stores, the wallet-auth and KYC services, and the
//! HTTP gateway together.
//!
//! ## Startup Sequence
//!
//! 1. Validate configuration (token secret, admin wallets, limits)
//! 2. Build the nonce store and wallet-auth service
//! 3. Build the session store, seed the ledger, and build the KYC service
//! 4. Bind the gateway and start the sweeper

use crate::config::NodeConfig;
use anyhow::{Context, Result};
use ec_01_wallet_auth::{InMemoryNonceRepository, WalletAuthService};
use ec_02_kyc_sessions::{InMemoryLedger, InMemorySessionRepository, KycService};
use ec_03_api_gateway::ApiGatewayService;
use shared_types::{Clock, SystemClock};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// The running node: one gateway over one set of services.
pub struct NodeRuntime {
    gateway: ApiGatewayService,
}

impl NodeRuntime {
    /// Build the node on the wall clock.
    pub fn new(config: NodeConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the node on an explicit time source.
    pub fn with_clock(config: NodeConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        info!("Creating Estate-Chain node runtime");
        let NodeConfig {
            gateway: config,
            ledger_seed,
        } = config;

        let auth_config = config
            .wallet_auth_config()
            .context("invalid wallet-auth configuration")?;
        info!(
            admins = auth_config.admin_wallets.len(),
            nonce_ttl_secs = auth_config.nonce_ttl.as_secs(),
            "Wallet auth configured"
        );

        let auth = WalletAuthService::new(
            InMemoryNonceRepository::new(),
            Arc::clone(&clock),
            auth_config,
        )
        .context("invalid wallet-auth lifetimes")?;
        let ledger = match ledger_seed {
            Some(path) => load_ledger(&path)?,
            None => InMemoryLedger::new(),
        };
        let kyc = KycService::new(
            InMemorySessionRepository::new(),
            ledger,
            clock,
            config.sessions.session_ttl(),
        )
        .context("invalid session lifetime")?;

        let gateway = ApiGatewayService::new(config, Arc::new(auth), Arc::new(kyc))
            .context("failed to create API gateway")?;

        Ok(Self { gateway })
    }

    /// Bind the HTTP listener and start background tasks.
    pub async fn start(&mut self) -> Result<SocketAddr> {
        info!("===========================================");
        info!("  Estate-Chain Node Runtime v{}", crate::VERSION);
        info!("===========================================");

        let addr = self
            .gateway
            .start()
            .await
            .context("failed to start API gateway")?;
        info!(%addr, "Node is ready");
        Ok(addr)
    }

    /// Stop accepting requests and drain in-flight ones.
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");
        self.gateway.shutdown().await;
        info!("Shutdown complete");
    }

    pub fn is_running(&self) -> bool {
        self.gateway.is_running()
    }
}

fn load_ledger(path: &Path) -> Result<InMemoryLedger> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read ledger seed {}", path.display()))?;
    InMemoryLedger::from_json(&json)
        .with_context(|| format!("invalid ledger seed {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ec_03_api_gateway::GatewayConfig;
    use shared_types::{
        Credential, CredentialStatus, CredentialType, ManualClock, WalletAddress,
    };
    use std::io::Write;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn config() -> NodeConfig {
        let mut config = GatewayConfig::default();
        config.auth.token_secret = "7e".repeat(32);
        config.http.host = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.http.port = 0;
        NodeConfig::new(config)
    }

    async fn http_get(addr: SocketAddr, path: &str) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        let request =
            format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        raw
    }

    #[test]
    fn test_rejects_missing_secret() {
        let mut config = config();
        config.gateway.auth.token_secret.clear();

        assert!(NodeRuntime::new(config).is_err());
    }

    #[test]
    fn test_rejects_unreadable_ledger_seed() {
        let dir = tempfile::tempdir().unwrap();

        let mut missing = config();
        missing.ledger_seed = Some(dir.path().join("absent.json"));
        assert!(NodeRuntime::new(missing).is_err());

        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        let mut malformed = config();
        malformed.ledger_seed = Some(garbage);
        assert!(NodeRuntime::new(malformed).is_err());
    }

    #[tokio::test]
    async fn test_seeded_holder_resolves() {
        let clock = Arc::new(ManualClock::default());
        let now = clock.now().timestamp();
        let holder = WalletAddress::from_public_key([0x42; 32]);
        let seed = vec![Credential {
            holder: holder.clone(),
            issuer: WalletAddress::from_public_key([0xAA; 32]),
            credential_type: CredentialType::AccreditedInvestor,
            status: CredentialStatus::Active,
            issued_at: now - 86_400,
            expires_at: now + 86_400,
            metadata_uri: "ipfs://seeded".into(),
            revocation_reason: None,
        }];

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&seed).unwrap().as_bytes())
            .unwrap();

        let mut config = config();
        config.ledger_seed = Some(file.path().to_path_buf());
        let mut node = NodeRuntime::with_clock(config, clock).unwrap();
        let addr = node.start().await.unwrap();

        let seeded = http_get(addr, &format!("/credentials/{holder}")).await;
        assert!(seeded.starts_with("HTTP/1.1 200"), "unexpected response: {seeded}");
        assert!(seeded.contains("\"isValid\":true"), "unexpected body: {seeded}");

        let unknown = WalletAddress::from_public_key([0x43; 32]);
        let missing = http_get(addr, &format!("/credentials/{unknown}")).await;
        assert!(missing.starts_with("HTTP/1.1 404"), "unexpected response: {missing}");

        node.shutdown().await;
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let mut node =
            NodeRuntime::with_clock(config(), Arc::new(ManualClock::default())).unwrap();
        assert!(!node.is_running());

        let addr = node.start().await.unwrap();
        assert!(node.is_running());

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(
                b"POST /auth/nonce HTTP/1.1\r\nHost: localhost\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n{}",
            )
            .await
            .unwrap();
        let mut raw = String::new();
        stream.read_to_string(&mut raw).await.unwrap();
        assert!(raw.starts_with("HTTP/1.1 4"), "unexpected response: {raw}");

        node.shutdown().await;
        assert!(!node.is_running());
    }
}
