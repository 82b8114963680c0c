//! Cache Statistics Module
//!
//! Counters describing how well the response cache is doing.

// == Cache Stats ==
/// Snapshot of response cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that found nothing usable (absent or expired)
    pub misses: u64,
    /// Entries dropped on lookup because they outlived the TTL
    pub expirations: u64,
    /// Entries dropped to make room for a new key
    pub evictions: u64,
    /// Entries currently held
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache, 0.0 before any lookup.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
