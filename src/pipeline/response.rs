//! Response Assembly Module
//!
//! Headers, the security set and optional gzip.

use std::io::Write;

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CACHE_CONTROL, CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, ETAG},
        StatusCode,
    },
    response::Response,
};
use flate2::{write::GzEncoder, Compression};

use crate::cache::CacheEntry;
use crate::error::Result;
use crate::security::{CACHE_CONTROL_VALUE, SECURITY_HEADERS};

// == Build Response ==
/// Builds a 200 response for `entry`.
///
/// Fresh and cached payloads share this path, so both carry identical
/// headers for identical content.
pub fn build_response(entry: &CacheEntry, compression_threshold: usize) -> Result<Response> {
    let (body, gzipped) = encode_body(&entry.content, entry.compressible, compression_threshold)?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, entry.content_type.as_str())
        .header(ETAG, entry.etag.as_str())
        .header(CACHE_CONTROL, CACHE_CONTROL_VALUE)
        .header(CONTENT_LENGTH, body.len());

    for (name, value) in SECURITY_HEADERS {
        builder = builder.header(name, value);
    }
    if gzipped {
        builder = builder.header(CONTENT_ENCODING, "gzip");
    }

    Ok(builder.body(Body::from(body))?)
}

// == Encode Body ==
/// Returns the body to send and whether it is gzip encoded.
///
/// Only compressible content at or above `threshold` bytes is compressed,
/// and the result is used only when it saves at least 10%.
pub fn encode_body(content: &Bytes, compressible: bool, threshold: usize) -> Result<(Bytes, bool)> {
    if !compressible || content.len() < threshold {
        return Ok((content.clone(), false));
    }

    let compressed = gzip(content)?;
    if compressed.len() * 10 < content.len() * 9 {
        Ok((Bytes::from(compressed), true))
    } else {
        Ok((content.clone(), false))
    }
}

fn gzip(content: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(content.len() / 2), Compression::default());
    encoder.write_all(content)?;
    encoder.finish()
}
