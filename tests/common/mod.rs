//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, extract::Request, http::Response};
use content_router::http::{Forwarder, HttpServer};
use content_router::lifecycle::Shutdown;
use content_router::routing::Router;
use content_router::store::{BackendRecord, ContentItem, RouteRecord, RouteStore};
use tokio::net::TcpListener;

/// Start a backend that answers every request with `"<name> <path>"`.
pub async fn start_mock_backend(name: &'static str) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let app = axum::Router::new().fallback(move |request: Request| async move {
        let body = format!("{} {}", name, request.uri().path());
        Response::builder()
            .header("x-backend", name)
            .body(Body::from(body))
            .unwrap()
    });
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    addr
}

/// A router over `store`, not yet reloaded.
pub fn router(store: Arc<dyn RouteStore>) -> Arc<Router> {
    Arc::new(Router::new(
        store,
        Forwarder::new(Duration::from_millis(500), Duration::from_secs(2)),
        tracing::Span::none(),
    ))
}

/// Serve `router` on an ephemeral port.
pub async fn start_proxy(router: Arc<Router>) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    let server = HttpServer::new(router);
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// A client that reports redirects instead of following them.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .no_proxy()
        .build()
        .unwrap()
}

pub fn backend(id: &str, addr: SocketAddr) -> BackendRecord {
    BackendRecord {
        backend_id: id.into(),
        backend_url: format!("http://{}/", addr),
    }
}

pub fn route(path: &str, route_type: &str) -> RouteRecord {
    RouteRecord {
        path: path.into(),
        route_type: route_type.into(),
        ..Default::default()
    }
}

pub fn item(rendering_app: &str, document_type: &str, routes: Vec<RouteRecord>) -> ContentItem {
    ContentItem {
        rendering_app: rendering_app.into(),
        document_type: document_type.into(),
        routes,
        redirects: vec![],
    }
}
