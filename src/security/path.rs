//! Path Validation Module
//!
//! Decides whether a raw request path is safe to resolve under the serving
//! root. Purely lexical: nothing here touches the filesystem.

use std::collections::HashSet;
use std::path::Path;

use percent_encoding::percent_decode_str;

// == Default Sets ==
/// File extensions served by default.
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 14] = [
    "html", "css", "js", "json", "png", "jpg", "jpeg", "gif", "svg", "ico", "woff", "woff2", "ttf",
    "eot",
];

/// Substrings that make a path unservable wherever they appear.
pub const DEFAULT_BLOCKED_PATHS: [&str; 11] = [
    "..",
    ".htaccess",
    ".env",
    "server.log",
    "server.crt",
    "server.key",
    ".git",
    ".svn",
    ".hg",
    ".DS_Store",
    "Thumbs.db",
];

// == Path Validator ==
/// Allowlist/blocklist validator for request paths.
#[derive(Debug, Clone)]
pub struct PathValidator {
    /// Lowercase extensions without the leading dot
    allowed_extensions: HashSet<String>,
    /// Substrings rejected anywhere in the path
    blocked_paths: Vec<String>,
}

impl PathValidator {
    // == Constructor ==
    /// Creates a validator from an extension allowlist and a substring blocklist.
    ///
    /// Extensions may be given with or without a leading dot and compare
    /// case-insensitively.
    pub fn new<E, B>(allowed_extensions: E, blocked_paths: B) -> Self
    where
        E: IntoIterator,
        E::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        Self {
            allowed_extensions: allowed_extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim_start_matches('.').to_ascii_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
            blocked_paths: blocked_paths
                .into_iter()
                .map(|blocked| blocked.as_ref().to_string())
                .filter(|blocked| !blocked.is_empty())
                .collect(),
        }
    }

    // == Is Safe ==
    /// Returns true if `raw_path` may be resolved and served.
    pub fn is_safe(&self, raw_path: &str) -> bool {
        self.sanitize(raw_path).is_some()
    }

    // == Sanitize ==
    /// Validates `raw_path` and returns its normalized form relative to the
    /// serving root. The root path `/` yields an empty string.
    ///
    /// Checks run in order and the first failure rejects:
    /// 1. percent-decode (invalid UTF-8 rejects)
    /// 2. lexical normalization of `.` and `..` segments
    /// 3. blocklisted substrings, in the decoded and the normalized path
    /// 4. leftover parent segments or a second leading separator
    /// 5. extension allowlist, unless the path is exactly `/`
    pub fn sanitize(&self, raw_path: &str) -> Option<String> {
        let decoded = decode(raw_path)?;
        if decoded.contains('\0') || decoded.contains('\\') {
            return None;
        }

        let relative = decoded.strip_prefix('/').unwrap_or(&decoded);
        let normalized = normalize(relative);

        if self
            .blocked_paths
            .iter()
            .any(|blocked| decoded.contains(blocked.as_str()) || normalized.contains(blocked.as_str()))
        {
            return None;
        }

        if relative.starts_with('/') || normalized.split('/').any(|segment| segment == "..") {
            return None;
        }

        if decoded != "/" && !self.extension_allowed(&normalized) {
            return None;
        }

        Some(normalized)
    }

    // == Extension Check ==
    fn extension_allowed(&self, path: &str) -> bool {
        Path::new(path)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.allowed_extensions.contains(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }
}

impl Default for PathValidator {
    fn default() -> Self {
        Self::new(DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_BLOCKED_PATHS)
    }
}

// == Utility Functions ==
/// Percent-decodes a request path. Returns None if the result is not UTF-8.
fn decode(raw_path: &str) -> Option<String> {
    percent_decode_str(raw_path)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

/// Lexically resolves `.` and `..` segments and collapses repeated separators.
///
/// Parent segments that would climb above the start are kept, so callers can
/// still see the escape attempt.
fn normalize(relative: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(last) if *last != ".." => {
                    segments.pop();
                }
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    segments.join("/")
}
