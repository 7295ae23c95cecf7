//! External route store boundary.
//!
//! # Data Flow
//! ```text
//! Router::reload
//!     → RouteStore::connect (open one read session)
//!     → StoreSession::backends (stream of BackendRecord)
//!     → StoreSession::content_items (stream of ContentItem)
//!     → session dropped (disconnect)
//! ```
//!
//! # Design Decisions
//! - Records are read-only snapshots, fetched fresh on every reload
//! - Streams yield `Result` so a cursor fault can surface mid-scan
//! - A scan fault aborts the whole reload; nothing partial is published

pub mod file;
pub mod memory;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

/// A named upstream application.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendRecord {
    pub backend_id: String,
    pub backend_url: String,
}

/// One path binding as persisted in the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteRecord {
    /// Percent-encoded URL path.
    pub path: String,
    /// `"exact"` or `"prefix"`.
    #[serde(rename = "type")]
    pub route_type: String,
    /// Redirect target; only meaningful for redirects.
    pub destination: String,
    /// `"preserve"`, `"ignore"` or empty.
    pub segments_mode: String,
    /// `"temporary"` or `"permanent"`.
    pub redirect_type: String,
    pub disabled: bool,
}

/// Source grouping of routes and redirects for one rendering application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ContentItem {
    pub rendering_app: String,
    pub document_type: String,
    pub routes: Vec<RouteRecord>,
    pub redirects: Vec<RouteRecord>,
}

/// Errors raised by a store while connecting or scanning.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to route store: {0}")]
    Connect(String),

    #[error("route store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode route store records: {0}")]
    Decode(String),

    #[error("route store cursor error: {0}")]
    Cursor(String),
}

/// A source of backend and content records.
#[async_trait]
pub trait RouteStore: Send + Sync {
    /// Open a read session for one reload pass.
    async fn connect(&self) -> Result<Box<dyn StoreSession>, StoreError>;

    /// Human-readable location, for logging.
    fn location(&self) -> String;
}

/// An open read session. Dropping it disconnects.
pub trait StoreSession: Send {
    /// All backend records.
    fn backends(&mut self) -> BoxStream<'_, Result<BackendRecord, StoreError>>;

    /// All content records, in store order.
    fn content_items(&mut self) -> BoxStream<'_, Result<ContentItem, StoreError>>;
}

/// A complete set of records, as held by the in-process and file stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreSnapshot {
    pub backends: Vec<BackendRecord>,
    pub content_items: Vec<ContentItem>,
}

/// Session over an owned snapshot.
#[derive(Debug)]
pub(crate) struct SnapshotSession {
    snapshot: StoreSnapshot,
}

impl SnapshotSession {
    pub(crate) fn new(snapshot: StoreSnapshot) -> Self {
        Self { snapshot }
    }
}

impl StoreSession for SnapshotSession {
    fn backends(&mut self) -> BoxStream<'_, Result<BackendRecord, StoreError>> {
        Box::pin(futures_util::stream::iter(
            self.snapshot.backends.iter().cloned().map(Ok),
        ))
    }

    fn content_items(&mut self) -> BoxStream<'_, Result<ContentItem, StoreError>> {
        Box::pin(futures_util::stream::iter(
            self.snapshot.content_items.iter().cloned().map(Ok),
        ))
    }
}
