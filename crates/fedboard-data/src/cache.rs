use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, trace};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// In-memory map whose entries stop being served `ttl` after they were stored.
#[derive(Debug, Clone)]
pub struct TtlCache<V> {
    store: Arc<RwLock<HashMap<String, Entry<V>>>>,
    ttl: Duration,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(ttl: Duration) -> Self {
        TtlCache {
            store: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let store = self.store.read().await;
        match store.get(key) {
            Some(entry) if entry.stored_at.elapsed() < self.ttl => {
                trace!("cache hit: {key}");
                Some(entry.value.clone())
            }
            Some(_) => {
                trace!("cache expired: {key}");
                None
            }
            None => {
                trace!("cache miss: {key}");
                None
            }
        }
    }

    pub async fn insert(&self, key: impl Into<String>, value: V) {
        let mut store = self.store.write().await;
        store.insert(
            key.into(),
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
        // expired entries are only ever misses; drop them while the lock is held
        let ttl = self.ttl;
        store.retain(|_, entry| entry.stored_at.elapsed() < ttl);
    }

    pub async fn clear(&self) {
        let mut store = self.store.write().await;
        debug!("clearing {} cached entries", store.len());
        store.clear();
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
