//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the axum app that hands every request to the routing core
//! - Wire up middleware (request ID, tracing)
//! - Bind server to listener with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::request::{MakeRequestUuid, X_REQUEST_ID};
use crate::routing::Router as ContentRouter;

/// HTTP server for proxied traffic.
pub struct HttpServer {
    app: Router,
}

impl HttpServer {
    /// Create a server dispatching through `router`.
    pub fn new(router: Arc<ContentRouter>) -> Self {
        Self {
            app: Self::build_app(router),
        }
    }

    /// Build the axum app with all middleware layers.
    pub fn build_app(router: Arc<ContentRouter>) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(router)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::new(X_REQUEST_ID)),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.app.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Every request, whatever its method or path, goes to the routing core.
async fn proxy_handler(
    State(router): State<Arc<ContentRouter>>,
    request: Request<Body>,
) -> Response<Body> {
    router.serve(request).await
}
