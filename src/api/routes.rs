//! API Routes
//!
//! Configures the Axum router for static delivery.

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use super::handlers::{serve_handler, AppState};

/// Creates the main router.
///
/// `get` also answers HEAD; the body is dropped and headers kept. The
/// router must be served with `into_make_service_with_connect_info::<SocketAddr>()`
/// so handlers can see the peer address.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_handler))
        .route("/*path", get(serve_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
