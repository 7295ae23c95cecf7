//! Route table publication and request dispatch.
//!
//! # Responsibilities
//! - Own the currently published route table
//! - Serve requests against a snapshot of that table
//! - Rebuild the table from the store and publish it atomically
//! - Contain panics in both paths
//!
//! # Design Decisions
//! - `ArcSwap` holds the published table; readers take one `Arc` and never block
//! - A table is fully built before it becomes reachable and is never mutated after
//! - Reloads are serialized: a reload waits for the one in flight, then runs its
//!   own pass, so publication order always equals execution order
//! - A failed reload leaves the previous table serving

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use futures_util::FutureExt;
use percent_encoding::percent_decode_str;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::http::forward::Forwarder;
use crate::http::request::request_id;
use crate::http::response;
use crate::observability::metrics;
use crate::routing::compiler;
use crate::routing::handler::Handler;
use crate::routing::table::RouteTable;
use crate::store::{RouteStore, StoreError};

/// Summary of the published table, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteStats {
    pub count: usize,
    pub checksum: String,
}

impl RouteStats {
    fn of(table: &RouteTable) -> Self {
        Self {
            count: table.count(),
            checksum: table.checksum_hex(),
        }
    }
}

/// Why a reload attempt was abandoned.
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("panic during reload: {0}")]
    Panicked(String),
}

/// The request-routing core.
pub struct Router {
    table: ArcSwap<RouteTable>,
    store: Arc<dyn RouteStore>,
    forwarder: Forwarder,
    reload_lock: Mutex<()>,
    span: tracing::Span,
}

impl Router {
    /// Create a router serving an empty table. Call [`Router::reload`] to load routes.
    ///
    /// Every event the router and compiler emit is recorded inside `span`.
    pub fn new(store: Arc<dyn RouteStore>, forwarder: Forwarder, span: tracing::Span) -> Self {
        Self {
            table: ArcSwap::from_pointee(RouteTable::new()),
            store,
            forwarder,
            reload_lock: Mutex::new(()),
            span,
        }
    }

    /// The currently published table.
    pub fn table(&self) -> Arc<RouteTable> {
        self.table.load_full()
    }

    /// Count and checksum of the currently published table.
    pub fn stats(&self) -> RouteStats {
        RouteStats::of(&self.table.load())
    }

    /// Serve one request. Always produces a response.
    pub async fn serve(&self, request: Request<Body>) -> Response<Body> {
        let start = Instant::now();
        let table = self.table.load_full();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request_id(&request);

        let outcome = AssertUnwindSafe(self.dispatch(table, request))
            .catch_unwind()
            .instrument(self.span.clone())
            .await;

        let response = match outcome {
            Ok(response) => response,
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(
                    parent: &self.span,
                    request_id = %request_id,
                    method = %method,
                    path = %path,
                    error = %format!("panic: {}", message),
                    status = 500u16,
                    "Recovered from panic while serving request"
                );
                metrics::record_request_panic();
                response::internal_error()
            }
        };

        metrics::record_request(method.as_str(), response.status().as_u16(), start);
        response
    }

    async fn dispatch(&self, table: Arc<RouteTable>, request: Request<Body>) -> Response<Body> {
        if request.method() == Method::CONNECT {
            return response::not_implemented();
        }

        let path = percent_decode_str(request.uri().path())
            .decode_utf8_lossy()
            .into_owned();

        let handler = match table.lookup(&path) {
            Some(handler) => handler.clone(),
            None => {
                tracing::debug!(path = %path, "No route matched");
                return response::not_found();
            }
        };

        match handler {
            Handler::Gone => response::gone(),
            Handler::Unavailable => response::unavailable(),
            Handler::Redirect(redirect) => {
                response::redirect(&redirect, &path, request.uri().query())
            }
            Handler::Boom => panic!("Boom!!!"),
            Handler::Backend(target) => match self.forwarder.forward(&target, request).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::warn!(
                        backend_id = %target.id,
                        path = %path,
                        error = %e,
                        "Backend request failed"
                    );
                    e.to_response()
                }
            },
        }
    }

    /// Rebuild the table from the store and publish it.
    ///
    /// On failure the previously published table keeps serving, unchanged.
    pub async fn reload(&self) -> Result<RouteStats, ReloadError> {
        let _guard = self.reload_lock.lock().await;

        async {
            let outcome = AssertUnwindSafe(self.build()).catch_unwind().await;
            let built = match outcome {
                Ok(result) => result,
                Err(panic) => Err(ReloadError::Panicked(panic_message(panic.as_ref()))),
            };

            match built {
                Ok(table) => {
                    let stats = RouteStats::of(&table);
                    self.table.store(Arc::new(table));
                    tracing::info!(
                        count = stats.count,
                        checksum = %stats.checksum,
                        "Reloaded routes"
                    );
                    metrics::record_reload(true, stats.count);
                    Ok(stats)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Route reload failed, original routes have not been modified");
                    metrics::record_reload(false, self.stats().count);
                    Err(e)
                }
            }
        }
        .instrument(self.span.clone())
        .await
    }

    async fn build(&self) -> Result<RouteTable, ReloadError> {
        tracing::debug!(store = %self.store.location(), "Connecting to route store");
        let mut session = self.store.connect().await?;

        tracing::info!("Reloading routes");
        let table = compiler::compile(session.as_mut()).await?;
        Ok(table)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
