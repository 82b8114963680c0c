//! Hardened Server - A small static file server
//!
//! Serves files from a single directory through a pipeline of per-client
//! rate limiting, path validation and an in-memory response cache with
//! gzip compression.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod security;

pub use api::AppState;
pub use config::Config;
pub use error::ServeError;
pub use pipeline::DeliveryPipeline;
