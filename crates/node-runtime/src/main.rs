//! # Estate-Chain Node Runtime
//!
//! Entry point for the Estate-Chain identity node: wallet sign-in, KYC
//! sessions, and credential status over HTTP.
//!
//! ## Startup Sequence
//!
//! 1. Initialize logging (`RUST_LOG`, default `info`)
//! 2. Load configuration from `EC_*` environment variables
//! 3. Validate the token secret and admin wallets; abort if invalid
//! 4. Start the gateway and the expiry sweeper
//! 5. Run until Ctrl+C, then drain and exit

use anyhow::{Context, Result};
use node_runtime::{load_config, NodeRuntime};
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = load_config().context("failed to load configuration")?;

    let mut runtime = NodeRuntime::new(config)?;
    runtime.start().await?;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;

    runtime.shutdown().await;

    Ok(())
}
