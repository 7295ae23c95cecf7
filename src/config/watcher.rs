//! Route store file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Watches the route store file and emits a reload trigger on change.
pub struct StoreWatcher {
    path: PathBuf,
    trigger_tx: mpsc::UnboundedSender<()>,
}

impl StoreWatcher {
    /// Create a new StoreWatcher.
    ///
    /// Returns the watcher and a receiver of reload triggers.
    pub fn new(path: &Path) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (trigger_tx, trigger_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                trigger_tx,
            },
            trigger_rx,
        )
    }

    /// Start watching. The returned watcher must be kept alive.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.trigger_tx.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Route store change detected, triggering reload");
                        let _ = tx.send(());
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Route store watcher started");
        Ok(watcher)
    }
}
