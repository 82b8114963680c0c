//! Error types for the file server
//!
//! Every request-scoped failure maps 1:1 onto an HTTP status. Only a generic
//! reason phrase is reflected to the client.

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::security::SECURITY_HEADERS;

// == Serve Error Enum ==
/// Unified error type for the delivery pipeline.
#[derive(Error, Debug)]
pub enum ServeError {
    /// Client exceeded its request quota for the current window
    #[error("rate limit exceeded")]
    RateLimited,

    /// Requested path failed validation or escaped the serving root
    #[error("unsafe path")]
    UnsafePath,

    /// Target missing or not a regular file
    #[error("not found")]
    NotFound,

    /// Target larger than the configured maximum file size
    #[error("file too large: {size} bytes (limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    /// Anything unexpected (I/O, encoding, compression)
    #[error("internal error: {0}")]
    Internal(String),
}

impl ServeError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ServeError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServeError::UnsafePath => StatusCode::FORBIDDEN,
            ServeError::NotFound => StatusCode::NOT_FOUND,
            ServeError::TooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ServeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short category name used in log lines.
    pub fn category(&self) -> &'static str {
        match self {
            ServeError::RateLimited => "rate_limited",
            ServeError::UnsafePath => "unsafe_path",
            ServeError::NotFound => "not_found",
            ServeError::TooLarge { .. } => "too_large",
            ServeError::Internal(_) => "internal",
        }
    }

    /// Client-facing reason phrase. Never carries paths or error details.
    pub fn reason(&self) -> &'static str {
        match self {
            ServeError::RateLimited => "Rate limit exceeded",
            ServeError::UnsafePath => "Forbidden",
            ServeError::NotFound => "File not found",
            ServeError::TooLarge { .. } => "File too large",
            ServeError::Internal(_) => "Internal Server Error",
        }
    }
}

impl From<std::io::Error> for ServeError {
    fn from(err: std::io::Error) -> Self {
        ServeError::Internal(err.to_string())
    }
}

impl From<axum::http::Error> for ServeError {
    fn from(err: axum::http::Error) -> Self {
        ServeError::Internal(err.to_string())
    }
}

// == Error Body ==
/// JSON body sent with every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
}

// == IntoResponse Implementation ==
impl IntoResponse for ServeError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.reason(),
        });

        let mut response = (self.status(), body).into_response();
        let headers = response.headers_mut();
        for (name, value) in SECURITY_HEADERS {
            headers.insert(
                HeaderName::from_static(name),
                HeaderValue::from_static(value),
            );
        }
        response
    }
}

// == Result Type Alias ==
/// Convenience Result type for the file server.
pub type Result<T> = std::result::Result<T, ServeError>;
