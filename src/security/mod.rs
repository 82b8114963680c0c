//! Security Module
//!
//! Request throttling, path hardening and the fixed response header set.

mod headers;
mod path;
mod rate_limit;


pub use headers::{CACHE_CONTROL_VALUE, CONTENT_SECURITY_POLICY, SECURITY_HEADERS};
pub use path::{PathValidator, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_BLOCKED_PATHS};
pub use rate_limit::{RateLimiter, DEFAULT_PRUNE_THRESHOLD};
