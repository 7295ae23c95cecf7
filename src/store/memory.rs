//! In-process route store.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::store::{
    BackendRecord, ContentItem, RouteStore, SnapshotSession, StoreError, StoreSession,
    StoreSnapshot,
};

/// A store holding its records in memory. Clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<StoreSnapshot>>,
}

impl MemoryStore {
    pub fn new(snapshot: StoreSnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(snapshot)),
        }
    }

    /// Replace all records. Takes effect on the next reload.
    pub fn replace(&self, snapshot: StoreSnapshot) {
        match self.inner.write() {
            Ok(mut guard) => *guard = snapshot,
            Err(poisoned) => *poisoned.into_inner() = snapshot,
        }
    }

    pub fn push_backend(&self, backend: BackendRecord) {
        self.update(|s| s.backends.push(backend));
    }

    pub fn push_content_item(&self, item: ContentItem) {
        self.update(|s| s.content_items.push(item));
    }

    fn update(&self, f: impl FnOnce(&mut StoreSnapshot)) {
        match self.inner.write() {
            Ok(mut guard) => f(&mut guard),
            Err(poisoned) => f(&mut poisoned.into_inner()),
        }
    }

    fn snapshot(&self) -> StoreSnapshot {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl RouteStore for MemoryStore {
    async fn connect(&self) -> Result<Box<dyn StoreSession>, StoreError> {
        Ok(Box::new(SnapshotSession::new(self.snapshot())))
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::TryStreamExt;

    #[tokio::test]
    async fn sessions_see_records_at_connect_time() {
        let store = MemoryStore::default();
        store.push_backend(BackendRecord {
            backend_id: "a".into(),
            backend_url: "http://a".into(),
        });

        let mut first = store.connect().await.unwrap();

        store.push_backend(BackendRecord {
            backend_id: "b".into(),
            backend_url: "http://b".into(),
        });

        let seen: Vec<_> = first.backends().try_collect().await.unwrap();
        assert_eq!(seen.len(), 1);

        let mut second = store.connect().await.unwrap();
        let seen: Vec<_> = second.backends().try_collect().await.unwrap();
        assert_eq!(seen.len(), 2);
    }
}
