//! Community Pulse contact service.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request                ┌──────────────────────────────────────────────┐
//!     ─────────────────────────────▶│  http::server (request id, timeout, trace)   │
//!                                   └──────────────────────┬───────────────────────┘
//!                                                          ▼
//!                                   ┌──────────────────────────────────────────────┐
//!                                   │  http::handlers                              │
//!                                   │    security::rate_limit (fixed window)       │
//!                                   │    contact::form (validation)                │
//!                                   │    contact::store   ◀── resilience::retries  │
//!                                   │    contact::webhook ◀── resilience::retries  │
//!                                   └──────────────────────┬───────────────────────┘
//!                                                          ▼
//!     Client Response               ┌──────────────────────────────────────────────┐
//!     ◀─────────────────────────────│  errors::response (classify, log, status)    │
//!                                   └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use community_pulse::config::{self, AppConfig};
use community_pulse::lifecycle;
use community_pulse::observability::logging;

#[derive(Parser)]
#[command(name = "community-pulse")]
#[command(about = "Contact endpoint service for Community Pulse", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => AppConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
        config::validate_config(&config).map_err(config::ConfigError::Validation)?;
    }

    logging::init_logging(&config.observability)?;

    tracing::info!("community-pulse v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        environment = config.environment.as_str(),
        rate_limit = config.rate_limit.limit,
        window_ms = config.rate_limit.window_ms,
        webhook = config.webhook.url.is_some(),
        "Configuration loaded"
    );

    lifecycle::start(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
