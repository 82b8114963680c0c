//! Response Cache Module
//!
//! Thread-safe front for [`CacheStore`], shared between request tasks.

use std::time::Duration;

use axum::body::Bytes;
use tokio::sync::Mutex;

use crate::cache::{is_compressible, CacheEntry, CacheStats, CacheStore};

// == Response Cache ==
/// Response cache guarded by a single store-wide lock.
///
/// Two tasks missing the same key concurrently may both store it; the last
/// write wins.
#[derive(Debug)]
pub struct ResponseCache {
    store: Mutex<CacheStore>,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a cache of at most `max_entries` responses living `ttl` each.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            store: Mutex::new(CacheStore::new(max_entries, ttl)),
        }
    }

    /// Returns the unexpired entry for `key`, purging it if expired.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        self.store.lock().await.get(key)
    }

    /// Stores a response payload. `etag` defaults to a content hash.
    pub async fn set(
        &self,
        key: impl Into<String>,
        content: Bytes,
        content_type: impl Into<String>,
        etag: Option<String>,
    ) {
        self.store
            .lock()
            .await
            .set(key.into(), content, content_type.into(), etag);
    }

    /// Returns true if `content_type` names a compressible text type.
    pub fn is_compressible(content_type: &str) -> bool {
        is_compressible(content_type)
    }

    /// Snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        self.store.lock().await.stats()
    }

    /// Number of entries currently held.
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
