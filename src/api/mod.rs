//! API Module
//!
//! HTTP surface of the file server.
//!
//! # Endpoints
//! - `GET /` - Serve the index file
//! - `GET /<path>` - Serve a static file
//!
//! HEAD is accepted wherever GET is; other methods get 405.

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
