//! Cache Entry Module
//!
//! Defines a cached response payload and the helpers that describe it.

use std::time::{Duration, Instant};

use axum::body::Bytes;
use sha2::{Digest, Sha256};

/// MIME type fragments treated as compressible text.
pub const COMPRESSIBLE_TYPES: [&str; 7] = [
    "text/html",
    "text/css",
    "text/javascript",
    "application/javascript",
    "application/json",
    "text/xml",
    "application/xml",
];

// == Cache Entry ==
/// A prepared response payload. Immutable once created.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Raw (uncompressed) file content
    pub content: Bytes,
    /// MIME type of the content
    pub content_type: String,
    /// Quoted entity tag
    pub etag: String,
    /// Creation time, used for expiry and eviction order
    pub created_at: Instant,
    /// Whether the content type qualifies for gzip
    pub compressible: bool,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the current time.
    ///
    /// The ETag defaults to a hash of `content` when not supplied.
    pub fn new(content: Bytes, content_type: String, etag: Option<String>) -> Self {
        let etag = etag.unwrap_or_else(|| generate_etag(&content));
        let compressible = is_compressible(&content_type);

        Self {
            content,
            content_type,
            etag,
            created_at: Instant::now(),
            compressible,
        }
    }

    // == Is Expired ==
    /// An entry is valid only while its age is strictly below `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.created_at.elapsed() >= ttl
    }
}

// == Utility Functions ==
/// Computes a quoted entity tag over `content`.
///
/// The hash only identifies content for cache validation.
pub fn generate_etag(content: &[u8]) -> String {
    format!("\"{:x}\"", Sha256::digest(content))
}

/// Returns true if `content_type` names a text-like type worth compressing.
///
/// Substring match, so parameters such as `; charset=utf-8` are ignored.
pub fn is_compressible(content_type: &str) -> bool {
    let content_type = content_type.to_ascii_lowercase();
    COMPRESSIBLE_TYPES
        .iter()
        .any(|candidate| content_type.contains(candidate))
}
