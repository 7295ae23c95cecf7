//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Perform the initial route load
//! - Start reload triggers and listeners
//!
//! # Design Decisions
//! - Bind failures are fatal; a failed initial reload is not
//! - Subsystems initialize in order, not concurrently

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::admin::run_admin_server;
use crate::config::watcher::StoreWatcher;
use crate::config::RouterConfig;
use crate::http::{Forwarder, HttpServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::routing::Router;
use crate::store::FileStore;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("failed to install signal handler: {0}")]
    Signal(std::io::Error),

    #[error("failed to watch route store: {0}")]
    Watch(#[from] notify::Error),

    #[error("server error: {0}")]
    Serve(std::io::Error),
}

/// Build the router described by `config`, without starting anything.
pub fn build_router(config: &RouterConfig) -> Arc<Router> {
    tracing::info!(
        backend_connect_timeout = ?config.timeouts.backend_connect(),
        backend_header_timeout = ?config.timeouts.backend_header(),
        store = %config.store.path,
        "Building router"
    );

    let store = Arc::new(FileStore::new(&config.store.path));
    let forwarder = Forwarder::new(
        config.timeouts.backend_connect(),
        config.timeouts.backend_header(),
    );
    Arc::new(Router::new(store, forwarder, tracing::info_span!("router")))
}

/// Run the router process until shutdown.
pub async fn run(config: RouterConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let router = build_router(&config);
    let _ = router.reload().await;

    let shutdown = Shutdown::new();
    signals::spawn_ctrl_c(shutdown.clone());

    let (reload_tx, reload_rx) = mpsc::unbounded_channel();
    signals::spawn_sighup(reload_tx.clone()).map_err(StartupError::Signal)?;

    // Held until shutdown; dropping it stops the watch.
    let _watcher = if config.store.watch {
        let (watcher, mut changes) = StoreWatcher::new(Path::new(&config.store.path));
        let forward = reload_tx.clone();
        tokio::spawn(async move {
            while changes.recv().await.is_some() {
                if forward.send(()).is_err() {
                    break;
                }
            }
        });
        Some(watcher.run()?)
    } else {
        None
    };

    tokio::spawn(signals::run_reload_loop(
        router.clone(),
        reload_rx,
        shutdown.subscribe(),
    ));

    if config.admin.enabled {
        let listener = bind(&config.admin.bind_address).await?;
        let admin_router = router.clone();
        let admin_shutdown = shutdown.subscribe();
        tokio::spawn(async move {
            if let Err(e) = run_admin_server(admin_router, listener, admin_shutdown).await {
                tracing::error!(error = %e, "Admin server failed");
            }
        });
    }

    let listener = bind(&config.listener.bind_address).await?;
    HttpServer::new(router)
        .run(listener, shutdown.subscribe())
        .await
        .map_err(StartupError::Serve)
}

async fn bind(address: &str) -> Result<TcpListener, StartupError> {
    TcpListener::bind(address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.to_string(),
            source,
        })
}
