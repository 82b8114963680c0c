//! Resource Resolution Module
//!
//! Filesystem resolution of validated request paths.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::io::AsyncReadExt;
use tracing::debug;

use crate::error::{Result, ServeError};

// == Resolved Resource ==
/// An existing regular file inside the serving root.
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    /// Canonical path, always a descendant of the serving root
    pub path: PathBuf,
    /// Size in bytes at resolution time
    pub size: u64,
    /// MIME type guessed from the requested file name
    pub content_type: String,
}

impl ResolvedResource {
    /// Reads the file, failing with `TooLarge` if it grew past `limit` since
    /// it was resolved.
    pub async fn read(&self, limit: u64) -> Result<Vec<u8>> {
        let file = tokio::fs::File::open(&self.path).await.map_err(not_found_or_internal)?;

        let mut content = Vec::with_capacity(self.size as usize);
        file.take(limit.saturating_add(1))
            .read_to_end(&mut content)
            .await?;

        let size = content.len() as u64;
        if size > limit {
            return Err(ServeError::TooLarge { size, limit });
        }
        Ok(content)
    }
}

// == Resolve ==
/// Maps `relative` onto the filesystem under `root`.
///
/// `root` must be canonical. The candidate is canonicalized so symlinks are
/// followed before the containment check runs.
pub async fn resolve(root: &Path, relative: &str, max_file_size: u64) -> Result<ResolvedResource> {
    let candidate = root.join(relative);

    let path = tokio::fs::canonicalize(&candidate).await.map_err(|err| {
        debug!(path = %candidate.display(), error = %err, "resolution failed");
        ServeError::NotFound
    })?;

    if !path.starts_with(root) {
        return Err(ServeError::UnsafePath);
    }

    let metadata = tokio::fs::metadata(&path)
        .await
        .map_err(not_found_or_internal)?;
    if !metadata.is_file() {
        return Err(ServeError::NotFound);
    }

    let size = metadata.len();
    if size > max_file_size {
        return Err(ServeError::TooLarge {
            size,
            limit: max_file_size,
        });
    }

    let content_type = mime_guess::from_path(&candidate)
        .first_or_octet_stream()
        .to_string();

    Ok(ResolvedResource {
        path,
        size,
        content_type,
    })
}

fn not_found_or_internal(err: std::io::Error) -> ServeError {
    match err.kind() {
        ErrorKind::NotFound => ServeError::NotFound,
        _ => ServeError::Internal(err.to_string()),
    }
}
