use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::domain::{Resource, ResourcePatch};
use crate::errors::ServiceError;
use crate::storage::json_map_store::JsonMapStore;

/// Persistence boundary for catalog records.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Resource>, ServiceError>;
    async fn get(&self, id: &str) -> Result<Option<Resource>, ServiceError>;
    async fn insert(&self, resource: Resource) -> Result<Resource, ServiceError>;
    /// Apply `patch` only if the stored revision still equals
    /// `expected_revision`; bumps the revision and `updated_at`.
    /// Never writes `download_count`.
    async fn update(&self, id: &str, expected_revision: u64, patch: &ResourcePatch) -> Result<Resource, ServiceError>;
    async fn remove(&self, id: &str) -> Result<Option<Resource>, ServiceError>;
    /// Atomically add one to the counter; returns the new value.
    async fn increment_download_count(&self, id: &str) -> Result<u64, ServiceError>;
}

/// Catalog kept in a JSON document file (`resources.json`).
pub struct JsonCatalogRepository {
    store: Arc<JsonMapStore<String, Resource>>,
}

impl JsonCatalogRepository {
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, ServiceError> {
        let store = JsonMapStore::new(data_dir.into().join("resources.json")).await?;
        Ok(Self { store })
    }
}

#[async_trait]
impl CatalogRepository for JsonCatalogRepository {
    async fn list(&self) -> Result<Vec<Resource>, ServiceError> {
        Ok(self.store.values().await)
    }

    async fn get(&self, id: &str) -> Result<Option<Resource>, ServiceError> {
        Ok(self.store.get(&id.to_string()).await)
    }

    async fn insert(&self, resource: Resource) -> Result<Resource, ServiceError> {
        self.store
            .update_map(|m| {
                if m.contains_key(&resource.id) {
                    return Err(ServiceError::Conflict(format!("resource {} already exists", resource.id)));
                }
                m.insert(resource.id.clone(), resource.clone());
                Ok(resource)
            })
            .await
    }

    async fn update(&self, id: &str, expected_revision: u64, patch: &ResourcePatch) -> Result<Resource, ServiceError> {
        self.store
            .update_map(|m| {
                let current = m.get_mut(id).ok_or_else(|| ServiceError::not_found("resource"))?;
                if current.revision != expected_revision {
                    return Err(ServiceError::stale_revision(expected_revision, current.revision));
                }
                patch.apply(current);
                current.revision += 1;
                current.updated_at = Utc::now();
                Ok(current.clone())
            })
            .await
    }

    async fn remove(&self, id: &str) -> Result<Option<Resource>, ServiceError> {
        self.store.remove(&id.to_string()).await
    }

    async fn increment_download_count(&self, id: &str) -> Result<u64, ServiceError> {
        self.store
            .update_map(|m| {
                let current = m.get_mut(id).ok_or_else(|| ServiceError::not_found("resource"))?;
                current.download_count += 1;
                Ok(current.download_count)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_resource, temp_data_dir};

    #[tokio::test]
    async fn concurrent_increments_are_not_lost() -> Result<(), anyhow::Error> {
        let dir = temp_data_dir();
        let repo = Arc::new(JsonCatalogRepository::open(&dir).await?);
        let r = repo.insert(sample_resource("Budget Sheet")).await?;

        let mut handles = Vec::new();
        for _ in 0..50 {
            let repo = repo.clone();
            let id = r.id.clone();
            handles.push(tokio::spawn(async move { repo.increment_download_count(&id).await }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(repo.get(&r.id).await?.map(|r| r.download_count), Some(50));

        // persisted too
        let reopened = JsonCatalogRepository::open(&dir).await?;
        assert_eq!(reopened.get(&r.id).await?.map(|r| r.download_count), Some(50));

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn update_checks_revision_and_keeps_counter() -> Result<(), anyhow::Error> {
        let dir = temp_data_dir();
        let repo = JsonCatalogRepository::open(&dir).await?;
        let r = repo.insert(sample_resource("Budget Sheet")).await?;
        repo.increment_download_count(&r.id).await?;

        let patch = ResourcePatch { title: Some("Budget Sheet v2".into()), ..Default::default() };
        let updated = repo.update(&r.id, r.revision, &patch).await?;
        assert_eq!(updated.title, "Budget Sheet v2");
        assert_eq!(updated.revision, r.revision + 1);
        assert_eq!(updated.download_count, 1);

        let stale = repo.update(&r.id, r.revision, &patch).await;
        assert!(matches!(stale, Err(ServiceError::Conflict(_))));

        let missing = repo.update("nope", 1, &patch).await;
        assert!(matches!(missing, Err(ServiceError::NotFound(_))));
        assert!(repo.increment_download_count("nope").await.is_err());

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
