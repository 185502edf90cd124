use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::domain::{AdminResource, NewResource, Resource, ResourcePatch};
use super::repository::CatalogRepository;
use super::visibility::CatalogQuery;
use crate::blob::{file_path, is_data_uri, thumbnail_path, BlobContent, BlobStore};
use crate::errors::ServiceError;
use crate::metrics::{BLOB_CLEANUP_FAILURES_TOTAL, COUNTER_UPDATE_FAILURES_TOTAL, DOWNLOADS_COUNTED_TOTAL};

/// Catalog orchestration: record persistence plus the blob lifecycle.
///
/// Uploads always happen before the record write, so a failed upload leaves
/// no record behind. A record write that fails after an upload leaves the
/// uploaded blob unreferenced; that is logged, not cleaned up.
#[derive(Clone)]
pub struct CatalogService {
    repo: Arc<dyn CatalogRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl CatalogService {
    pub fn new(repo: Arc<dyn CatalogRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { repo, blobs }
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    pub async fn list(&self) -> Result<Vec<Resource>, ServiceError> {
        self.repo.list().await
    }

    pub async fn get(&self, id: &str) -> Result<Option<Resource>, ServiceError> {
        self.repo.get(id).await
    }

    /// Everything, newest first, with the publication status at `now`.
    pub async fn list_admin(&self, now: DateTime<Utc>) -> Result<Vec<AdminResource>, ServiceError> {
        let mut all = self.repo.list().await?;
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all
            .into_iter()
            .map(|resource| AdminResource { status: resource.status_at(now), resource })
            .collect())
    }

    /// Visitor listing: visible at `now`, filtered by `query`, public view.
    pub async fn list_public(&self, query: &CatalogQuery, now: DateTime<Utc>) -> Result<Vec<Resource>, ServiceError> {
        let all = self.repo.list().await?;
        Ok(query.apply(all, now).into_iter().map(Resource::into_public_view).collect())
    }

    /// A single resource if it is visible at `now`.
    pub async fn get_public(&self, id: &str, now: DateTime<Utc>) -> Result<Option<Resource>, ServiceError> {
        Ok(self
            .repo
            .get(id)
            .await?
            .filter(|r| r.is_publicly_visible(now))
            .map(Resource::into_public_view))
    }

    /// Create a resource, uploading inline or explicit image/file content first.
    ///
    /// An explicit `image`/`file` wins over inline data URIs in the input.
    /// Coming-soon resources never get a file stored.
    #[instrument(skip(self, input, image, file), fields(title = %input.title))]
    pub async fn create(
        &self,
        input: NewResource,
        image: Option<BlobContent>,
        file: Option<BlobContent>,
    ) -> Result<Resource, ServiceError> {
        models::resource::validate_title(&input.title)?;
        models::resource::validate_description(&input.description)?;
        let title = input.title.trim().to_string();
        let file_name = input.file_name.trim().to_string();
        let stamp = Utc::now().timestamp_millis();

        let image_url = match image {
            Some(content) => self.upload_thumbnail(content, &title, stamp).await?,
            None if is_data_uri(&input.image_url) => {
                self.upload_thumbnail(BlobContent::DataUri(input.image_url), &title, stamp).await?
            }
            None => input.image_url,
        };

        let file_url = if input.is_coming_soon {
            if file.is_some() {
                debug!("ignoring file upload for coming-soon resource");
            }
            if is_data_uri(&input.file_url) { String::new() } else { input.file_url }
        } else {
            match file {
                Some(content) => self.upload_file(content, &file_name, stamp).await?,
                None if is_data_uri(&input.file_url) => {
                    self.upload_file(BlobContent::DataUri(input.file_url), &file_name, stamp).await?
                }
                None => input.file_url,
            }
        };

        let now = Utc::now();
        let resource = Resource {
            id: Uuid::new_v4().to_string(),
            title,
            description: input.description,
            long_description: input.long_description,
            resource_type: input.resource_type,
            category: input.category,
            tags: input.tags,
            image_url,
            file_url,
            file_name,
            download_count: 0,
            is_coming_soon: input.is_coming_soon,
            is_hidden: input.is_hidden,
            live_date: input.live_date,
            revision: 1,
            created_at: now,
            updated_at: now,
        };

        let uploaded = [resource.image_url.clone(), resource.file_url.clone()];
        match self.repo.insert(resource).await {
            Ok(created) => {
                info!(resource_id = %created.id, title = %created.title, "resource_created");
                Ok(created)
            }
            Err(e) => {
                self.log_orphans(&uploaded, &e);
                Err(e)
            }
        }
    }

    /// Apply an admin edit based on `expected_revision`.
    ///
    /// The revision is checked before any upload and again atomically by the
    /// repository. Replaced blobs are left in place.
    #[instrument(skip(self, patch, image, file), fields(resource_id = %id))]
    pub async fn update(
        &self,
        id: &str,
        expected_revision: u64,
        mut patch: ResourcePatch,
        image: Option<BlobContent>,
        file: Option<BlobContent>,
    ) -> Result<Resource, ServiceError> {
        let current = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("resource"))?;
        if current.revision != expected_revision {
            return Err(ServiceError::stale_revision(expected_revision, current.revision));
        }
        if let Some(title) = &patch.title {
            models::resource::validate_title(title)?;
        }
        if let Some(description) = &patch.description {
            models::resource::validate_description(description)?;
        }

        let title = patch.title.as_deref().unwrap_or(&current.title).trim().to_string();
        let file_name = patch.file_name.as_deref().unwrap_or(&current.file_name).trim().to_string();
        let coming_soon = patch.is_coming_soon.unwrap_or(current.is_coming_soon);
        let stamp = Utc::now().timestamp_millis();
        let mut uploaded = Vec::new();

        let inline_image = patch.image_url.take_if_data_uri();
        let image = image.or(inline_image.map(BlobContent::DataUri));
        if let Some(content) = image {
            let url = self.upload_thumbnail(content, &title, stamp).await?;
            uploaded.push(url.clone());
            patch.image_url = Some(url);
        }

        let inline_file = patch.file_url.take_if_data_uri();
        if coming_soon {
            if inline_file.is_some() {
                patch.file_url = Some(String::new());
            }
        } else if let Some(content) = file.or(inline_file.map(BlobContent::DataUri)) {
            let url = self.upload_file(content, &file_name, stamp).await?;
            uploaded.push(url.clone());
            patch.file_url = Some(url);
        }

        match self.repo.update(id, expected_revision, &patch).await {
            Ok(updated) => {
                info!(resource_id = %updated.id, revision = updated.revision, "resource_updated");
                Ok(updated)
            }
            Err(e) => {
                self.log_orphans(&uploaded, &e);
                Err(e)
            }
        }
    }

    /// Replace only the downloadable file of a resource.
    pub async fn replace_file(
        &self,
        id: &str,
        expected_revision: u64,
        file_name: &str,
        content: BlobContent,
    ) -> Result<Resource, ServiceError> {
        let current = self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("resource"))?;
        if current.is_coming_soon {
            return Err(ServiceError::Validation("coming-soon resources cannot hold a file".into()));
        }
        let patch = ResourcePatch { file_name: Some(file_name.to_string()), ..Default::default() };
        self.update(id, expected_revision, patch, None, Some(content)).await
    }

    /// Remove the record, then best-effort delete the blobs it referenced.
    #[instrument(skip(self), fields(resource_id = %id))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let removed = self.repo.remove(id).await?.ok_or_else(|| ServiceError::not_found("resource"))?;
        info!(resource_id = %removed.id, "resource_deleted");

        for url in [&removed.image_url, &removed.file_url] {
            if url.is_empty() {
                continue;
            }
            if !self.blobs.owns(url) {
                debug!(%url, "blob not managed here, leaving it");
                continue;
            }
            if let Err(e) = self.blobs.delete(url).await {
                BLOB_CLEANUP_FAILURES_TOTAL.inc();
                warn!(resource_id = %removed.id, %url, error = %e, "blob_cleanup_failed");
            }
        }
        Ok(())
    }

    /// Bump the download counter. Failures are logged and dropped.
    #[instrument(skip(self), fields(resource_id = %id))]
    pub async fn increment_download_count(&self, id: &str) {
        match self.repo.increment_download_count(id).await {
            Ok(count) => {
                DOWNLOADS_COUNTED_TOTAL.inc();
                debug!(resource_id = %id, download_count = count, "download_counted");
            }
            Err(e) => {
                COUNTER_UPDATE_FAILURES_TOTAL.inc();
                let e = ServiceError::CounterUpdate(e.to_string());
                warn!(resource_id = %id, error = %e, "counter_update_dropped");
            }
        }
    }

    async fn upload_thumbnail(&self, content: BlobContent, title: &str, stamp: i64) -> Result<String, ServiceError> {
        let path = thumbnail_path(title, stamp);
        let name = path.rsplit('/').next().unwrap_or(&path).to_string();
        Ok(self.blobs.upload(content, &path, &name).await?)
    }

    async fn upload_file(&self, content: BlobContent, file_name: &str, stamp: i64) -> Result<String, ServiceError> {
        models::resource::validate_file_name(file_name)?;
        Ok(self.blobs.upload(content, &file_path(stamp, file_name), file_name).await?)
    }

    fn log_orphans(&self, urls: &[String], cause: &ServiceError) {
        for url in urls.iter().filter(|u| !u.is_empty() && self.blobs.owns(u)) {
            warn!(%url, error = %cause, "uploaded blob left unreferenced");
        }
    }
}

trait TakeDataUri {
    fn take_if_data_uri(&mut self) -> Option<String>;
}

impl TakeDataUri for Option<String> {
    /// Move an inline data URI out of the field, leaving `None` behind.
    fn take_if_data_uri(&mut self) -> Option<String> {
        match self {
            Some(v) if is_data_uri(v) => self.take(),
            _ => None,
        }
    }
}
