//! Alert Bridge - Main Entry Point

use anyhow::Context;
use bridge::{init_logging, run, BridgeConfig};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};

/// Forward firing alerts to a Telegram chat
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, env = "ALERT_BRIDGE_CONFIG", default_value = "config/config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = BridgeConfig::load(&cli.config)
        .with_context(|| format!("error loading config {}", cli.config.display()))?;
    let _guard = init_logging(&config.logging, config.environment)?;

    info!("=== Alert Bridge v{} ===", env!("CARGO_PKG_VERSION"));

    run(config, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
    })
    .await
}
