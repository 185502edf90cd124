//! Blob storage for resource thumbnails and downloadable files.
//!
//! A [`BlobStore`] takes content (raw bytes or a base64 data URI), stores it
//! under a path and hands back a public URL. Stores only ever delete or
//! fetch URLs they issued themselves; anything else (for example an
//! externally hosted download link) is left alone.

pub mod local;
pub mod memory;

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use thiserror::Error;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("invalid data uri: {0}")]
    InvalidDataUri(String),
    #[error("invalid blob path: {0}")]
    InvalidPath(String),
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("blob io failed: {0}")]
    Io(String),
    #[error("blob store unavailable: {0}")]
    Unavailable(String),
}

impl BlobError {
    /// Caller-side mistakes as opposed to backend failures.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidDataUri(_) | Self::InvalidPath(_))
    }
}

/// Content handed to [`BlobStore::upload`].
#[derive(Debug, Clone)]
pub enum BlobContent {
    Bytes { data: Vec<u8>, content_type: String },
    /// `data:<mime>;base64,<payload>`
    DataUri(String),
}

impl BlobContent {
    pub fn bytes(data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self::Bytes { data, content_type: content_type.into() }
    }

    /// Resolve to raw bytes and a content type.
    pub fn into_parts(self) -> Result<(Vec<u8>, String), BlobError> {
        match self {
            Self::Bytes { data, content_type } => Ok((data, content_type)),
            Self::DataUri(uri) => decode_data_uri(&uri),
        }
    }
}

/// A stored object as returned by [`BlobStore::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredBlob {
    pub data: Vec<u8>,
    pub content_type: String,
    /// Name offered to browsers via `Content-Disposition: attachment`.
    pub file_name: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `content` at `path` and return its public URL.
    async fn upload(&self, content: BlobContent, path: &str, file_name: &str) -> Result<String, BlobError>;
    /// Delete the object behind a URL this store issued.
    async fn delete(&self, url: &str) -> Result<(), BlobError>;
    /// Read an object back by path.
    async fn fetch(&self, path: &str) -> Result<StoredBlob, BlobError>;
    /// Whether `url` was issued by this store.
    fn owns(&self, url: &str) -> bool;
}

pub fn is_data_uri(value: &str) -> bool {
    value.starts_with("data:")
}

pub fn decode_data_uri(uri: &str) -> Result<(Vec<u8>, String), BlobError> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| BlobError::InvalidDataUri("missing data: prefix".into()))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| BlobError::InvalidDataUri("missing payload separator".into()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| BlobError::InvalidDataUri("only base64 data uris are supported".into()))?;
    let data = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| BlobError::InvalidDataUri(e.to_string()))?;
    let content_type = if mime.is_empty() { "application/octet-stream".to_string() } else { mime.to_string() };
    Ok((data, content_type))
}

/// `thumbnails/{ms}_{slug}`, always a single path segment.
pub fn thumbnail_path(title: &str, timestamp_ms: i64) -> String {
    format!("thumbnails/{}_{}", timestamp_ms, title_slug(title))
}

/// Whitespace, path separators and dots become `_`; runs collapse to one.
fn title_slug(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    for c in title.chars() {
        if c.is_whitespace() || matches!(c, '/' | '\\' | '.' | '_') {
            if !slug.is_empty() && !slug.ends_with('_') {
                slug.push('_');
            }
        } else {
            slug.push(c);
        }
    }
    while slug.ends_with('_') {
        slug.pop();
    }
    slug
}

/// `files/{ms}/{file_name}`
pub fn file_path(timestamp_ms: i64, file_name: &str) -> String {
    format!("files/{}/{}", timestamp_ms, file_name.trim())
}

/// Relative object paths only: no absolute paths, no `..` or empty segments.
pub(crate) fn validate_path(path: &str) -> Result<(), BlobError> {
    if path.is_empty() || path.starts_with('/') || path.contains('\\') {
        return Err(BlobError::InvalidPath(path.to_string()));
    }
    if path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
        return Err(BlobError::InvalidPath(path.to_string()));
    }
    Ok(())
}

pub(crate) fn join_url(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path)
}

/// Inverse of [`join_url`]; `None` when the URL lives elsewhere.
pub(crate) fn path_from_url<'a>(base_url: &str, url: &'a str) -> Option<&'a str> {
    url.strip_prefix(base_url.trim_end_matches('/'))?.strip_prefix('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_decodes() {
        let (data, ct) = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(data, b"hello");
        assert_eq!(ct, "image/png");
    }

    #[test]
    fn data_uri_rejects_other_shapes() {
        assert!(decode_data_uri("https://example.com/a.png").is_err());
        assert!(decode_data_uri("data:text/plain,hello").is_err());
        assert!(decode_data_uri("data:image/png;base64").is_err());
        assert!(decode_data_uri("data:image/png;base64,%%%").is_err());
    }

    #[test]
    fn paths_follow_layout() {
        assert_eq!(thumbnail_path("Budget  Sheet 2024", 1700), "thumbnails/1700_Budget_Sheet_2024");
        assert_eq!(file_path(1700, "budget.xlsx"), "files/1700/budget.xlsx");
    }

    #[test]
    fn thumbnail_paths_stay_one_segment() {
        assert_eq!(thumbnail_path("Budget Plan /", 1700), "thumbnails/1700_Budget_Plan");
        assert_eq!(thumbnail_path("Debt // Savings", 1700), "thumbnails/1700_Debt_Savings");
        assert_eq!(thumbnail_path("50/30/20 Rule", 1700), "thumbnails/1700_50_30_20_Rule");
        assert_eq!(thumbnail_path("..\\etc..", 1700), "thumbnails/1700_etc");
        for title in ["Budget Plan /", "Debt // Savings", "../..", "a\\b"] {
            assert!(validate_path(&thumbnail_path(title, 1700)).is_ok(), "{title}");
        }
    }

    #[test]
    fn path_validation() {
        assert!(validate_path("files/1/a.pdf").is_ok());
        assert!(validate_path("/etc/passwd").is_err());
        assert!(validate_path("files/../x").is_err());
        assert!(validate_path("files//x").is_err());
    }

    #[test]
    fn url_mapping() {
        assert_eq!(join_url("/blobs/", "files/1/a.pdf"), "/blobs/files/1/a.pdf");
        assert_eq!(path_from_url("/blobs", "/blobs/files/1/a.pdf"), Some("files/1/a.pdf"));
        assert_eq!(path_from_url("/blobs", "https://drive.example.com/x"), None);
        assert_eq!(path_from_url("/blobs", "/blobsy/x"), None);
    }
}
