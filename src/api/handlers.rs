//! API Handlers
//!
//! Bridges axum requests into the delivery pipeline.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, State},
    http::Uri,
    response::Response,
};

use crate::config::Config;
use crate::pipeline::DeliveryPipeline;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Pipeline owning the limiter and cache for this server
    pub pipeline: Arc<DeliveryPipeline>,
}

impl AppState {
    /// Creates a new AppState around an existing pipeline.
    pub fn new(pipeline: DeliveryPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Creates a new AppState from configuration and the canonical root.
    pub fn from_config(config: &Config, root: PathBuf) -> Self {
        Self::new(DeliveryPipeline::from_config(config, root))
    }
}

/// Handler for GET/HEAD on every path.
///
/// The client identity is the peer IP address; the path is passed on
/// undecoded so validation sees exactly what the client sent.
pub async fn serve_handler(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    uri: Uri,
) -> Response {
    let client = peer.ip().to_string();
    state.pipeline.handle(&client, uri.path()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_serve_handler_uses_peer_ip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
        let config = Config {
            directory: dir.path().to_path_buf(),
            ..Config::default()
        };
        let state = AppState::from_config(&config, config.serving_root().unwrap());

        let peer: SocketAddr = "192.0.2.7:51000".parse().unwrap();
        let response = serve_handler(
            State(state.clone()),
            ConnectInfo(peer),
            Uri::from_static("/"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(state.pipeline.cache().get("192.0.2.7:/").await.is_some());
    }
}
