//! Diagnostics and control endpoints.
//!
//! # Endpoints
//! - `GET /healthcheck`: liveness
//! - `GET /stats`: count and checksum of the published route table
//! - `POST /reload`: rebuild the route table from the store now
//!
//! # Design Decisions
//! - Served on a separate listener, never on the public one
//! - `POST /reload` waits for the reload and reports its outcome

pub mod handlers;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::routing::Router as ContentRouter;

use self::handlers::{get_stats, healthcheck, post_reload};

pub fn setup_admin_router(router: Arc<ContentRouter>) -> Router {
    Router::new()
        .route("/healthcheck", get(healthcheck))
        .route("/stats", get(get_stats))
        .route("/reload", post(post_reload))
        .with_state(router)
}

/// Serve the admin endpoints until `shutdown` fires.
pub async fn run_admin_server(
    router: Arc<ContentRouter>,
    listener: TcpListener,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<(), std::io::Error> {
    tracing::info!(address = %listener.local_addr()?, "Admin server starting");
    axum::serve(listener, setup_admin_router(router))
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
        })
        .await
}
