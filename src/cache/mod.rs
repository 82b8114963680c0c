//! Cache Module
//!
//! In-memory response cache with creation-time expiry and oldest-first
//! eviction.

mod entry;
mod order;
mod response_cache;
mod stats;
mod store;


// Re-export public types
pub use entry::{generate_etag, is_compressible, CacheEntry, COMPRESSIBLE_TYPES};
pub use order::InsertionOrder;
pub use response_cache::ResponseCache;
pub use stats::CacheStats;
pub use store::CacheStore;

// == Public Constants ==
/// Default maximum number of cached responses
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default lifetime of a cached response in seconds
pub const DEFAULT_TTL_SECS: u64 = 3600;
