//! Content router
//!
//! A reverse proxy that routes each request by URL path to a backend
//! application, a redirect, or a synthetic response.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ Router::serve ──▶ route table lookup
//!                                                           │
//!                          ┌────────────────┬───────────────┼──────────────┐
//!                          ▼                ▼               ▼              ▼
//!                       backend         redirect        410 / 503         404
//!                      (forward)       (301 / 302)
//!
//!     Reload triggers (admin POST /reload, SIGHUP, store file change)
//!     ──────────────▶ Router::reload ──▶ store scan ──▶ compile ──▶ publish
//! ```

use std::path::PathBuf;

use clap::Parser;

use content_router::config::{load_config, RouterConfig};
use content_router::lifecycle::startup;
use content_router::observability::logging;

#[derive(Parser)]
#[command(name = "content-router")]
#[command(about = "Path-based reverse proxy with hot-reloadable routes", long_about = None)]
struct Cli {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RouterConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        admin_enabled = config.admin.enabled,
        admin_address = %config.admin.bind_address,
        store = %config.store.path,
        "content-router starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
