use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{join_url, path_from_url, validate_path, BlobContent, BlobError, BlobStore, StoredBlob};

/// In-memory blob store for tests and throwaway runs.
///
/// `fail_uploads` / `fail_deletes` make the corresponding calls return
/// [`BlobError::Unavailable`].
pub struct MemoryBlobStore {
    base_url: String,
    objects: RwLock<HashMap<String, StoredBlob>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
}

impl MemoryBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            objects: RwLock::new(HashMap::new()),
            fail_uploads: AtomicBool::new(false),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn fail_uploads(&self, on: bool) {
        self.fail_uploads.store(on, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, on: bool) {
        self.fail_deletes.store(on, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn contains_url(&self, url: &str) -> bool {
        match path_from_url(&self.base_url, url) {
            Some(path) => self.objects.read().await.contains_key(path),
            None => false,
        }
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("/blobs")
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, content: BlobContent, path: &str, file_name: &str) -> Result<String, BlobError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("uploads disabled".into()));
        }
        validate_path(path)?;
        let (data, content_type) = content.into_parts()?;
        let blob = StoredBlob { data, content_type, file_name: file_name.to_string() };
        self.objects.write().await.insert(path.to_string(), blob);
        Ok(join_url(&self.base_url, path))
    }

    async fn delete(&self, url: &str) -> Result<(), BlobError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable("deletes disabled".into()));
        }
        let path = path_from_url(&self.base_url, url).ok_or_else(|| BlobError::InvalidPath(url.to_string()))?;
        match self.objects.write().await.remove(path) {
            Some(_) => Ok(()),
            None => Err(BlobError::NotFound(path.to_string())),
        }
    }

    async fn fetch(&self, path: &str) -> Result<StoredBlob, BlobError> {
        self.objects
            .read()
            .await
            .get(path)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(path.to_string()))
    }

    fn owns(&self, url: &str) -> bool {
        path_from_url(&self.base_url, url).is_some()
    }
}
