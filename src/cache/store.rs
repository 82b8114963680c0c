//! Cache Store Module
//!
//! Single-threaded cache engine: HashMap storage, insertion-order tracking
//! and lazy TTL expiry.

use std::collections::HashMap;
use std::time::Duration;

use axum::body::Bytes;
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder};

// == Cache Store ==
/// Bounded response store. Callers provide synchronization.
#[derive(Debug)]
pub struct CacheStore {
    /// Cached payloads by key
    entries: HashMap<String, CacheEntry>,
    /// Keys ordered by creation time
    order: InsertionOrder,
    /// Counters
    stats: CacheStats,
    /// Maximum number of entries
    max_entries: usize,
    /// Lifetime of an entry
    ttl: Duration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` entries for `ttl` each.
    pub fn new(max_entries: usize, ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            stats: CacheStats::default(),
            max_entries,
            ttl,
        }
    }

    // == Get ==
    /// Returns the entry for `key` if present and unexpired.
    ///
    /// Expired entries are removed as a side effect. Reads never extend an
    /// entry's lifetime.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let expired = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                self.stats.hits += 1;
                return Some(entry.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            self.remove(key);
            self.stats.expirations += 1;
            debug!(key, "cache entry expired");
        }
        self.stats.misses += 1;
        None
    }

    // == Set ==
    /// Stores a payload under `key`, replacing any previous entry and
    /// restarting its lifetime.
    ///
    /// At capacity the oldest entry by creation time is evicted first, even
    /// when `key` is already held. That entry may be `key` itself.
    pub fn set(&mut self, key: String, content: Bytes, content_type: String, etag: Option<String>) {
        if self.max_entries == 0 {
            return;
        }

        if self.entries.len() >= self.max_entries {
            if let Some(evicted) = self.order.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.evictions += 1;
                debug!(key = %evicted, "cache entry evicted");
            }
        }

        let entry = CacheEntry::new(content, content_type, etag);
        self.entries.insert(key.clone(), entry);
        self.order.record(&key);
    }

    // == Stats ==
    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            ..self.stats
        }
    }

    // == Length ==
    /// Current number of entries, expired ones included until looked up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `key` is held, without touching counters or expiry.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
        self.order.remove(key);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn bytes(text: &'static str) -> Bytes {
        Bytes::from_static(text.as_bytes())
    }

    fn store_with(store: &mut CacheStore, key: &str, text: &'static str) {
        store.set(key.to_string(), bytes(text), "text/plain".to_string(), None);
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new(10, Duration::from_secs(60));
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_set_and_get() {
        let mut store = CacheStore::new(10, Duration::from_secs(60));
        store_with(&mut store, "1.2.3.4:/a.css", "body {}");

        let entry = store.get("1.2.3.4:/a.css").unwrap();
        assert_eq!(entry.content, bytes("body {}"));
        assert_eq!(entry.content_type, "text/plain");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let mut store = CacheStore::new(10, Duration::from_secs(60));
        assert!(store.get("missing").is_none());
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_store_overwrite_refreshes() {
        let mut store = CacheStore::new(10, Duration::from_millis(300));
        store_with(&mut store, "k", "v1");
        sleep(Duration::from_millis(200));
        store_with(&mut store, "k", "v2");
        sleep(Duration::from_millis(200));

        // Older than the TTL since the first set, younger since the second
        let entry = store.get("k").unwrap();
        assert_eq!(entry.content, bytes("v2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let mut store = CacheStore::new(10, Duration::from_millis(100));
        store_with(&mut store, "k", "v");
        assert!(store.get("k").is_some());

        sleep(Duration::from_millis(150));

        assert!(store.get("k").is_none());
        assert!(!store.contains("k"));
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_evicts_oldest() {
        let mut store = CacheStore::new(3, Duration::from_secs(60));
        store_with(&mut store, "k1", "1");
        store_with(&mut store, "k2", "2");
        store_with(&mut store, "k3", "3");
        store_with(&mut store, "k4", "4");

        assert_eq!(store.len(), 3);
        assert!(!store.contains("k1"));
        assert!(store.contains("k2"));
        assert!(store.contains("k4"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_reads_do_not_protect_from_eviction() {
        let mut store = CacheStore::new(3, Duration::from_secs(60));
        store_with(&mut store, "k1", "1");
        store_with(&mut store, "k2", "2");
        store_with(&mut store, "k3", "3");

        // Reading k1 does not make it younger
        assert!(store.get("k1").is_some());
        store_with(&mut store, "k4", "4");

        assert!(!store.contains("k1"));
        assert!(store.contains("k2"));
    }

    #[test]
    fn test_store_overwrite_at_capacity_evicts_oldest() {
        let mut store = CacheStore::new(2, Duration::from_secs(60));
        store_with(&mut store, "k1", "1");
        store_with(&mut store, "k2", "2");
        store_with(&mut store, "k2", "2b");

        assert_eq!(store.len(), 1);
        assert!(!store.contains("k1"));
        assert_eq!(store.get("k2").unwrap().content, bytes("2b"));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_overwrite_of_oldest_at_capacity() {
        let mut store = CacheStore::new(2, Duration::from_secs(60));
        store_with(&mut store, "k1", "1");
        store_with(&mut store, "k2", "2");

        // k1 is itself the oldest, so it is evicted and stored again
        store_with(&mut store, "k1", "1b");

        assert_eq!(store.len(), 2);
        assert!(store.contains("k2"));
        assert_eq!(store.get("k1").unwrap().content, bytes("1b"));

        // k2 is now the oldest
        store_with(&mut store, "k3", "3");
        assert!(!store.contains("k2"));
        assert!(store.contains("k1"));
    }

    #[test]
    fn test_store_zero_capacity_stores_nothing() {
        let mut store = CacheStore::new(0, Duration::from_secs(60));
        store_with(&mut store, "k", "v");
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new(10, Duration::from_secs(60));
        store_with(&mut store, "k", "v");
        store.get("k");
        store.get("nope");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entries, 1);
    }
}
