use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;

use super::{join_url, path_from_url, validate_path, BlobContent, BlobError, BlobStore, StoredBlob};

const META_DIR: &str = ".meta";

#[derive(Serialize, Deserialize)]
struct BlobMeta {
    content_type: String,
    file_name: String,
}

/// Local filesystem blob store.
///
/// Objects live under `root`; each one has a small JSON sidecar under
/// `root/.meta/` holding its content type and download name. URLs are
/// `{base_url}/{path}`.
#[derive(Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    /// # Arguments
    /// * `root` - directory objects are written under (e.g. "data/blobs")
    /// * `base_url` - prefix of the URLs handed out (e.g. "/blobs")
    pub async fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self, BlobError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| BlobError::Io(format!("failed to create blob root {}: {}", root.display(), e)))?;
        Ok(Self { root, base_url: base_url.into() })
    }

    fn object_path(&self, path: &str) -> Result<PathBuf, BlobError> {
        validate_path(path)?;
        if path == META_DIR || path.starts_with(&format!("{META_DIR}/")) {
            return Err(BlobError::InvalidPath(path.to_string()));
        }
        Ok(self.root.join(path))
    }

    fn meta_path(&self, path: &str) -> PathBuf {
        self.root.join(META_DIR).join(format!("{path}.json"))
    }

    async fn ensure_parent_dir(path: &Path) -> Result<(), BlobError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| BlobError::Io(e.to_string()))?;
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, content: BlobContent, path: &str, file_name: &str) -> Result<String, BlobError> {
        let target = self.object_path(path)?;
        let (data, content_type) = content.into_parts()?;
        let size = data.len();
        let start = std::time::Instant::now();

        Self::ensure_parent_dir(&target).await?;
        let mut file = fs::File::create(&target)
            .await
            .map_err(|e| BlobError::Io(format!("failed to create {}: {}", target.display(), e)))?;
        file.write_all(&data)
            .await
            .map_err(|e| BlobError::Io(format!("failed to write {}: {}", target.display(), e)))?;
        file.sync_all()
            .await
            .map_err(|e| BlobError::Io(format!("failed to sync {}: {}", target.display(), e)))?;

        let meta_path = self.meta_path(path);
        Self::ensure_parent_dir(&meta_path).await?;
        let meta = serde_json::to_vec(&BlobMeta { content_type, file_name: file_name.to_string() })
            .map_err(|e| BlobError::Io(e.to_string()))?;
        fs::write(&meta_path, meta).await.map_err(|e| BlobError::Io(e.to_string()))?;

        info!(
            key = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "blob stored"
        );
        Ok(join_url(&self.base_url, path))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        let path = path_from_url(&self.base_url, url).ok_or_else(|| BlobError::InvalidPath(url.to_string()))?;
        let target = self.object_path(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(BlobError::NotFound(path.to_string())),
            Err(e) => return Err(BlobError::Io(e.to_string())),
        }
        let _ = fs::remove_file(self.meta_path(path)).await;
        info!(key = %path, "blob deleted");
        Ok(())
    }

    async fn fetch(&self, path: &str) -> Result<StoredBlob, BlobError> {
        let target = self.object_path(path)?;
        let data = match fs::read(&target).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(BlobError::NotFound(path.to_string())),
            Err(e) => return Err(BlobError::Io(e.to_string())),
        };
        let meta = match fs::read(self.meta_path(path)).await {
            Ok(raw) => serde_json::from_slice::<BlobMeta>(&raw).ok(),
            Err(_) => None,
        };
        let fallback_name = path.rsplit('/').next().unwrap_or(path).to_string();
        let (content_type, file_name) = match meta {
            Some(m) => (m.content_type, m.file_name),
            None => ("application/octet-stream".to_string(), fallback_name),
        };
        Ok(StoredBlob { data, content_type, file_name })
    }

    fn owns(&self, url: &str) -> bool {
        path_from_url(&self.base_url, url).is_some()
    }
}
