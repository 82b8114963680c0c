//! Configuration Module
//!
//! Loads server configuration from command line flags, falling back to
//! environment variables and then to defaults. Immutable once loaded.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL_SECS};
use crate::security::{PathValidator, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_BLOCKED_PATHS};

/// Default maximum size of a served file (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Default minimum body size before gzip is attempted
pub const DEFAULT_COMPRESSION_THRESHOLD: usize = 1024;

/// Server configuration parameters.
#[derive(Debug, Clone, Parser)]
#[command(name = "hardened_server", version, about = "Hardened static file server")]
pub struct Config {
    /// Host to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to bind to
    #[arg(long, env = "SERVER_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Directory to serve
    #[arg(long, env = "SERVE_DIR", default_value = ".")]
    pub directory: PathBuf,

    /// File served for `/`
    #[arg(long = "index", env = "INDEX_FILE", default_value = "index.html")]
    pub index_file: String,

    /// Serve over TLS
    #[arg(long = "tls", env = "TLS_ENABLED")]
    pub tls_enabled: bool,

    /// PEM certificate chain used when TLS is enabled
    #[arg(long, env = "TLS_CERT", default_value = "server.crt")]
    pub tls_cert: PathBuf,

    /// PEM private key used when TLS is enabled
    #[arg(long, env = "TLS_KEY", default_value = "server.key")]
    pub tls_key: PathBuf,

    /// Requests admitted per client per window
    #[arg(long, env = "RATE_LIMIT_REQUESTS", default_value_t = 100)]
    pub rate_limit_requests: usize,

    /// Rate limit window in seconds
    #[arg(long = "rate-limit-window", env = "RATE_LIMIT_WINDOW", default_value_t = 60)]
    pub rate_limit_window_secs: u64,

    /// Maximum number of cached responses
    #[arg(long, env = "CACHE_MAX_ENTRIES", default_value_t = DEFAULT_MAX_ENTRIES)]
    pub cache_max_entries: usize,

    /// Cached response lifetime in seconds
    #[arg(long = "cache-ttl", env = "CACHE_TTL", default_value_t = DEFAULT_TTL_SECS)]
    pub cache_ttl_secs: u64,

    /// Largest file served, in bytes
    #[arg(long, env = "MAX_FILE_SIZE", default_value_t = DEFAULT_MAX_FILE_SIZE)]
    pub max_file_size: u64,

    /// Smallest body, in bytes, considered for gzip
    #[arg(long, env = "COMPRESSION_THRESHOLD", default_value_t = DEFAULT_COMPRESSION_THRESHOLD)]
    pub compression_threshold: usize,

    /// Comma separated list of servable extensions
    #[arg(
        long,
        env = "ALLOWED_EXTENSIONS",
        value_delimiter = ',',
        default_values_t = DEFAULT_ALLOWED_EXTENSIONS.map(String::from)
    )]
    pub allowed_extensions: Vec<String>,

    /// Comma separated list of substrings that block a path
    #[arg(
        long,
        env = "BLOCKED_PATHS",
        value_delimiter = ',',
        default_values_t = DEFAULT_BLOCKED_PATHS.map(String::from)
    )]
    pub blocked_paths: Vec<String>,
}

impl Config {
    /// Address the listener binds to.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    /// Canonical serving root. Fails unless the directory exists.
    pub fn serving_root(&self) -> anyhow::Result<PathBuf> {
        let root = self
            .directory
            .canonicalize()
            .with_context(|| format!("invalid directory: {}", self.directory.display()))?;
        if !root.is_dir() {
            bail!("invalid directory: {} is not a directory", root.display());
        }
        Ok(root)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Path validator built from the configured allow and block lists.
    pub fn path_validator(&self) -> PathValidator {
        PathValidator::new(&self.allowed_extensions, &self.blocked_paths)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            directory: PathBuf::from("."),
            index_file: "index.html".to_string(),
            tls_enabled: false,
            tls_cert: PathBuf::from("server.crt"),
            tls_key: PathBuf::from("server.key"),
            rate_limit_requests: 100,
            rate_limit_window_secs: 60,
            cache_max_entries: DEFAULT_MAX_ENTRIES,
            cache_ttl_secs: DEFAULT_TTL_SECS,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            compression_threshold: DEFAULT_COMPRESSION_THRESHOLD,
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS.map(String::from).to_vec(),
            blocked_paths: DEFAULT_BLOCKED_PATHS.map(String::from).to_vec(),
        }
    }
}
