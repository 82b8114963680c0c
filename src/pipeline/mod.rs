//! Delivery Pipeline Module
//!
//! Runs every request through rate limiting, path validation, the response
//! cache and finally the filesystem:
//!
//! ```text
//! RateCheck ─▶ PathCheck ─▶ CacheLookup ─┬─ hit ─▶ ServeCached
//!   │ 429        │ 403                   └─ miss ─▶ Resolve ─▶ Load ─▶ StoreCache ─▶ ServeFresh
//!                                                   │ 403/404/413
//! ```
//!
//! Any failure becomes a [`ServeError`] response; nothing escapes to the
//! transport.

mod resolve;
mod response;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::Bytes,
    response::{IntoResponse, Response},
};
use tracing::{error, info, warn};

use crate::cache::{generate_etag, CacheEntry, ResponseCache};
use crate::config::Config;
use crate::error::{Result, ServeError};
use crate::security::{PathValidator, RateLimiter};

pub use resolve::{resolve, ResolvedResource};
pub use response::{build_response, encode_body};

// == Pipeline Settings ==
/// Static settings of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Canonical serving root
    pub root: PathBuf,
    /// File served for `/`, relative to the root
    pub index_file: String,
    /// Largest file served, in bytes
    pub max_file_size: u64,
    /// Smallest body considered for gzip
    pub compression_threshold: usize,
}

// == Delivery Pipeline ==
/// Per-request orchestration over injected limiter, validator and cache.
#[derive(Debug)]
pub struct DeliveryPipeline {
    settings: PipelineSettings,
    validator: PathValidator,
    limiter: Arc<RateLimiter>,
    cache: Arc<ResponseCache>,
}

impl DeliveryPipeline {
    // == Constructor ==
    pub fn new(
        settings: PipelineSettings,
        validator: PathValidator,
        limiter: Arc<RateLimiter>,
        cache: Arc<ResponseCache>,
    ) -> Self {
        Self {
            settings,
            validator,
            limiter,
            cache,
        }
    }

    /// Builds a pipeline with fresh limiter and cache from `config`.
    ///
    /// `root` is the canonical serving root from [`Config::serving_root`].
    pub fn from_config(config: &Config, root: PathBuf) -> Self {
        let settings = PipelineSettings {
            root,
            index_file: config.index_file.clone(),
            max_file_size: config.max_file_size,
            compression_threshold: config.compression_threshold,
        };
        let limiter = RateLimiter::new(config.rate_limit_requests, config.rate_limit_window());
        let cache = ResponseCache::new(config.cache_max_entries, config.cache_ttl());

        Self::new(
            settings,
            config.path_validator(),
            Arc::new(limiter),
            Arc::new(cache),
        )
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    // == Handle ==
    /// Serves `raw_path` (the undecoded request path) to `client`.
    ///
    /// Always produces a response; failures are logged here and mapped to
    /// their status code.
    pub async fn handle(&self, client: &str, raw_path: &str) -> Response {
        let outcome = self.deliver(client, raw_path).await;
        self.respond(client, raw_path, outcome)
    }

    /// Logs a failed outcome by category and turns it into its response.
    fn respond(&self, client: &str, raw_path: &str, outcome: Result<Response>) -> Response {
        match outcome {
            Ok(response) => response,
            Err(err) => {
                match &err {
                    ServeError::RateLimited | ServeError::UnsafePath | ServeError::TooLarge { .. } => {
                        warn!(client, path = raw_path, category = err.category(), "Request rejected: {}", err)
                    }
                    ServeError::NotFound => {
                        info!(client, path = raw_path, category = err.category(), "Request rejected: {}", err)
                    }
                    ServeError::Internal(_) => {
                        error!(client, path = raw_path, category = err.category(), "Error handling request: {}", err)
                    }
                }
                err.into_response()
            }
        }
    }

    async fn deliver(&self, client: &str, raw_path: &str) -> Result<Response> {
        // RateCheck
        if !self.limiter.allow(client).await {
            return Err(ServeError::RateLimited);
        }

        // PathCheck
        let relative = self
            .validator
            .sanitize(raw_path)
            .ok_or(ServeError::UnsafePath)?;

        // CacheLookup
        let key = cache_key(client, raw_path);
        if let Some(entry) = self.cache.get(&key).await {
            let response = build_response(&entry, self.settings.compression_threshold)?;
            info!(client, path = raw_path, "Served from cache");
            return Ok(response);
        }

        // Resolve
        let relative = if relative.is_empty() {
            self.settings.index_file.as_str()
        } else {
            relative.as_str()
        };
        let resource = resolve(&self.settings.root, relative, self.settings.max_file_size).await?;

        let response = self.load(key, &resource).await?;
        info!(client, path = raw_path, bytes = resource.size, "Served");
        Ok(response)
    }

    /// Reads `resource`, stores it under `key` and builds the fresh response.
    ///
    /// Nothing is cached unless the read succeeds in full.
    async fn load(&self, key: String, resource: &ResolvedResource) -> Result<Response> {
        // Load
        let content = Bytes::from(resource.read(self.settings.max_file_size).await?);
        let etag = generate_etag(&content);

        // StoreCache
        self.cache
            .set(
                key,
                content.clone(),
                resource.content_type.clone(),
                Some(etag.clone()),
            )
            .await;

        // ServeFresh
        let entry = CacheEntry::new(content, resource.content_type.clone(), Some(etag));
        build_response(&entry, self.settings.compression_threshold)
    }
}

/// Cache key partitioning responses by client and raw request path.
pub fn cache_key(client: &str, raw_path: &str) -> String {
    format!("{client}:{raw_path}")
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, StatusCode};
    use std::time::Duration;

    struct Fixture {
        _dir: tempfile::TempDir,
        pipeline: DeliveryPipeline,
    }

    fn fixture(max_requests: usize, max_file_size: u64) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(root.join("logo.png"), [0x89, b'P', b'N', b'G']).unwrap();

        let settings = PipelineSettings {
            root,
            index_file: "index.html".to_string(),
            max_file_size,
            compression_threshold: 1024,
        };
        let pipeline = DeliveryPipeline::new(
            settings,
            PathValidator::default(),
            Arc::new(RateLimiter::new(max_requests, Duration::from_secs(60))),
            Arc::new(ResponseCache::new(10, Duration::from_secs(60))),
        );
        Fixture {
            _dir: dir,
            pipeline,
        }
    }

    #[test]
    fn test_cache_key() {
        assert_eq!(cache_key("127.0.0.1", "/a.css"), "127.0.0.1:/a.css");
    }

    #[tokio::test]
    async fn test_root_serves_index() {
        let f = fixture(100, 1024);
        let response = f.pipeline.handle("127.0.0.1", "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert!(response.headers().get(header::CONTENT_ENCODING).is_none());
        assert_eq!(f.pipeline.cache().len().await, 1);
    }

    #[tokio::test]
    async fn test_second_request_hits_cache() {
        let f = fixture(100, 1024);
        f.pipeline.handle("127.0.0.1", "/logo.png").await;
        let response = f.pipeline.handle("127.0.0.1", "/logo.png").await;

        assert_eq!(response.status(), StatusCode::OK);
        let stats = f.pipeline.cache().stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_cache_is_partitioned_by_client() {
        let f = fixture(100, 1024);
        f.pipeline.handle("10.0.0.1", "/logo.png").await;
        f.pipeline.handle("10.0.0.2", "/logo.png").await;

        assert_eq!(f.pipeline.cache().len().await, 2);
        assert_eq!(f.pipeline.cache().stats().await.hits, 0);
    }

    #[tokio::test]
    async fn test_rate_limit_precedes_validation() {
        let f = fixture(1, 1024);
        assert_eq!(
            f.pipeline.handle("127.0.0.1", "/../etc/passwd").await.status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            f.pipeline.handle("127.0.0.1", "/").await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[tokio::test]
    async fn test_unsafe_path_is_forbidden_and_not_cached() {
        let f = fixture(100, 1024);
        let response = f.pipeline.handle("127.0.0.1", "/%2e%2e/%2e%2e/etc/passwd").await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert!(f.pipeline.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_missing_and_oversized_files() {
        let f = fixture(100, 8);
        std::fs::write(f.pipeline.settings().root.join("big.css"), "a".repeat(64)).unwrap();

        assert_eq!(
            f.pipeline.handle("127.0.0.1", "/missing.html").await.status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            f.pipeline.handle("127.0.0.1", "/big.css").await.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert!(f.pipeline.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_read_failure_is_internal_error() {
        let f = fixture(100, 1024);
        let root = f.pipeline.settings().root.clone();
        std::fs::create_dir(root.join("assets")).unwrap();

        // Reading a directory fails with an I/O error other than NotFound
        let resource = ResolvedResource {
            path: root.join("assets"),
            size: 0,
            content_type: "text/html".to_string(),
        };
        let key = cache_key("127.0.0.1", "/assets");
        let outcome = f.pipeline.load(key.clone(), &resource).await;
        assert!(matches!(outcome, Err(ServeError::Internal(_))));

        let response = f.pipeline.respond("127.0.0.1", "/assets", outcome);
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()["x-frame-options"], "DENY");
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal Server Error");
        assert!(!String::from_utf8_lossy(&body).contains("assets"));

        assert!(f.pipeline.cache().get(&key).await.is_none());
        assert!(f.pipeline.cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_from_config_uses_limits() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            directory: dir.path().to_path_buf(),
            rate_limit_requests: 7,
            cache_max_entries: 3,
            ..Config::default()
        };
        let root = config.serving_root().unwrap();
        let pipeline = DeliveryPipeline::from_config(&config, root.clone());

        assert_eq!(pipeline.settings().root, root);
        assert_eq!(pipeline.limiter().max_requests(), 7);
        assert_eq!(pipeline.limiter().window(), Duration::from_secs(60));
    }
}
