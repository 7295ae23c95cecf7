//! OS signal handling.
//!
//! # Responsibilities
//! - SIGINT (Ctrl-C) → graceful shutdown
//! - SIGHUP → route reload, not shutdown
//! - Drive reloads from the trigger channel, one at a time

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};

use crate::lifecycle::Shutdown;
use crate::routing::Router;

/// Trigger `shutdown` on Ctrl-C.
pub fn spawn_ctrl_c(shutdown: Shutdown) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => tracing::info!("Shutdown signal received"),
            Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C, shutting down"),
        }
        shutdown.trigger();
    });
}

/// Send a reload trigger on every SIGHUP.
#[cfg(unix)]
pub fn spawn_sighup(reload_tx: mpsc::UnboundedSender<()>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut hangup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while hangup.recv().await.is_some() {
            tracing::info!("SIGHUP received, triggering reload");
            if reload_tx.send(()).is_err() {
                break;
            }
        }
    });
    Ok(())
}

#[cfg(not(unix))]
pub fn spawn_sighup(_reload_tx: mpsc::UnboundedSender<()>) -> std::io::Result<()> {
    Ok(())
}

/// Run a reload for every trigger until shutdown or the channel closes.
///
/// Failures are logged by the router and otherwise ignored; retrying is up to
/// whoever sends the next trigger.
pub async fn run_reload_loop(
    router: Arc<Router>,
    mut triggers: mpsc::UnboundedReceiver<()>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            trigger = triggers.recv() => {
                if trigger.is_none() {
                    break;
                }
                let _ = router.reload().await;
            }
            _ = shutdown.recv() => {
                tracing::debug!("Reload loop received shutdown signal, exiting");
                break;
            }
        }
    }
}
