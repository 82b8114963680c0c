//! Security Headers Module
//!
//! Fixed response headers attached to every response.

/// Content Security Policy sent with every response.
pub const CONTENT_SECURITY_POLICY: &str = "default-src 'self'; \
script-src 'self' 'unsafe-inline'; \
style-src 'self' 'unsafe-inline' https://fonts.googleapis.com; \
font-src 'self' https://fonts.gstatic.com; \
connect-src 'self'; \
img-src 'self' data:; \
frame-ancestors 'none'; \
base-uri 'self'; \
form-action 'self';";

/// `Cache-Control` directive for successful responses.
pub const CACHE_CONTROL_VALUE: &str = "public, max-age=3600";

/// Security header table as `(name, value)` pairs. Names are lowercase so
/// they can be turned into `HeaderName`s with `from_static`.
pub const SECURITY_HEADERS: [(&str, &str); 7] = [
    ("x-content-type-options", "nosniff"),
    ("x-frame-options", "DENY"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "strict-origin-when-cross-origin"),
    ("permissions-policy", "geolocation=(), microphone=(), camera=()"),
    ("strict-transport-security", "max-age=31536000; includeSubDomains"),
    ("content-security-policy", CONTENT_SECURITY_POLICY),
];
