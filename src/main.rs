//! Hardened Server - A small static file server
//!
//! # Startup Sequence
//! 1. Initialize tracing subscriber for logging
//! 2. Load configuration from flags and environment variables
//! 3. Validate the serving root
//! 4. Build the delivery pipeline and router
//! 5. Serve over plain TCP or TLS
//! 6. Handle graceful shutdown on SIGINT/SIGTERM

use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::time::Duration;

use anyhow::Context;
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hardened_server::{api::create_router, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hardened_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Hardened Server");

    let config = Config::parse();
    let root = config.serving_root()?;
    let addr = config.bind_addr()?;

    let state = AppState::from_config(&config, root.clone());
    log_server_info(&config, addr);

    let app = create_router(state.clone())
        .into_make_service_with_connect_info::<SocketAddr>();

    if config.tls_enabled {
        let tls = RustlsConfig::from_pem_file(&config.tls_cert, &config.tls_key)
            .await
            .with_context(|| {
                format!(
                    "failed to load TLS material from {} and {}",
                    config.tls_cert.display(),
                    config.tls_key.display()
                )
            })?;

        let handle = axum_server::Handle::new();
        tokio::spawn({
            let handle = handle.clone();
            async move {
                shutdown_signal().await;
                handle.graceful_shutdown(Some(Duration::from_secs(10)));
            }
        });

        info!("Server listening on https://{}", addr);
        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await
            .with_context(|| format!("failed to serve on {addr}"))?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind {addr}"))?;
        info!("Server listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("server error")?;
    }

    let stats = state.pipeline.cache().stats().await;
    info!(
        hits = stats.hits,
        misses = stats.misses,
        evictions = stats.evictions,
        hit_rate = stats.hit_rate(),
        "Server shutdown complete"
    );
    Ok(())
}

/// Logs where the server can be reached and which protections are active.
fn log_server_info(config: &Config, addr: SocketAddr) {
    let scheme = if config.tls_enabled { "https" } else { "http" };

    info!(directory = %config.directory.display(), "Serving directory");
    info!(
        requests = config.rate_limit_requests,
        window_secs = config.rate_limit_window_secs,
        "Rate limiting enabled"
    );
    info!(
        max_entries = config.cache_max_entries,
        ttl_secs = config.cache_ttl_secs,
        max_file_size = config.max_file_size,
        "Response cache enabled"
    );
    info!("TLS {}", if config.tls_enabled { "enabled" } else { "disabled" });
    info!("Local: {}://localhost:{}", scheme, addr.port());
    match local_ip() {
        Some(ip) => info!("Network: {}://{}:{}", scheme, ip, addr.port()),
        None => warn!("Could not determine network address"),
    }
}

/// Address of the interface used for outbound traffic. No packets are sent.
fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
