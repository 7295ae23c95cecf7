//! Reload failures must leave the published table serving.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::stream::{self, BoxStream};

use content_router::routing::ReloadError;
use content_router::store::{
    BackendRecord, ContentItem, MemoryStore, RouteStore, StoreError, StoreSession, StoreSnapshot,
};

mod common;

/// Delegates to a memory store until `failing` is set, then fails as configured.
struct FlakyStore {
    inner: MemoryStore,
    failing: AtomicBool,
    fault: Fault,
}

#[derive(Clone, Copy)]
enum Fault {
    Connect,
    MidScan,
    Panic,
}

struct FaultySession {
    items: Vec<ContentItem>,
}

impl StoreSession for FaultySession {
    fn backends(&mut self) -> BoxStream<'_, Result<BackendRecord, StoreError>> {
        Box::pin(stream::empty())
    }

    fn content_items(&mut self) -> BoxStream<'_, Result<ContentItem, StoreError>> {
        let mut results: Vec<Result<ContentItem, StoreError>> =
            self.items.iter().cloned().map(Ok).collect();
        results.push(Err(StoreError::Cursor("connection reset mid-scan".into())));
        Box::pin(stream::iter(results))
    }
}

#[async_trait]
impl RouteStore for FlakyStore {
    async fn connect(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        if !self.failing.load(Ordering::SeqCst) {
            return self.inner.connect().await;
        }
        match self.fault {
            Fault::Connect => Err(StoreError::Connect("no reachable servers".into())),
            Fault::MidScan => Ok(Box::new(FaultySession {
                items: vec![common::item("", "gone", vec![common::route("/partial", "exact")])],
            })),
            Fault::Panic => panic!("store driver bug"),
        }
    }

    fn location(&self) -> String {
        "flaky".to_string()
    }
}

fn flaky(fault: Fault) -> Arc<FlakyStore> {
    Arc::new(FlakyStore {
        inner: MemoryStore::new(StoreSnapshot {
            backends: vec![],
            content_items: vec![
                common::item("", "gone", vec![common::route("/dead", "exact")]),
                common::item("", "gone", vec![common::route("/archive", "prefix")]),
            ],
        }),
        failing: AtomicBool::new(false),
        fault,
    })
}

async fn assert_failed_reload_keeps_table(fault: Fault) -> ReloadError {
    let store = flaky(fault);
    let router = common::router(store.clone());

    let before = router.reload().await.unwrap();
    assert_eq!(before.count, 2);
    let published = router.table();

    store.failing.store(true, Ordering::SeqCst);
    let err = router.reload().await.unwrap_err();

    assert_eq!(router.stats(), before);
    assert!(Arc::ptr_eq(&published, &router.table()));

    let (addr, shutdown) = common::start_proxy(router).await;
    let client = common::client();
    let res = client.get(format!("http://{}/archive/2001", addr)).send().await.unwrap();
    assert_eq!(res.status(), 410);
    let res = client.get(format!("http://{}/partial", addr)).send().await.unwrap();
    assert_eq!(res.status(), 404);
    shutdown.trigger();

    err
}

#[tokio::test]
async fn connect_failure_keeps_previous_table() {
    let err = assert_failed_reload_keeps_table(Fault::Connect).await;
    assert!(matches!(err, ReloadError::Store(StoreError::Connect(_))));
}

#[tokio::test]
async fn cursor_failure_mid_scan_publishes_nothing() {
    let err = assert_failed_reload_keeps_table(Fault::MidScan).await;
    assert!(matches!(err, ReloadError::Store(StoreError::Cursor(_))));
}

#[tokio::test]
async fn panic_during_reload_is_contained() {
    let err = assert_failed_reload_keeps_table(Fault::Panic).await;
    match err {
        ReloadError::Panicked(message) => assert_eq!(message, "store driver bug"),
        other => panic!("expected a contained panic, got {other}"),
    }
}

#[tokio::test]
async fn recovers_once_the_store_does() {
    let store = flaky(Fault::Connect);
    let router = common::router(store.clone());

    store.failing.store(true, Ordering::SeqCst);
    assert!(router.reload().await.is_err());
    assert_eq!(router.stats().count, 0);

    store.failing.store(false, Ordering::SeqCst);
    assert_eq!(router.reload().await.unwrap().count, 2);
}
