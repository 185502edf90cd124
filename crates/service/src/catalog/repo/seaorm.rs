use chrono::Utc;
use models::resource::{self, decode_tags, encode_tags};
use sea_orm::sea_query::Expr;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};

use crate::catalog::domain::{Resource, ResourcePatch};
use crate::catalog::repository::CatalogRepository;
use crate::errors::ServiceError;

pub struct SeaOrmCatalogRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCatalogRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }

    async fn find(&self, id: &str) -> Result<Option<resource::Model>, ServiceError> {
        resource::Entity::find_by_id(id.to_string()).one(&self.db).await.map_err(db_err)
    }
}

fn db_err(e: sea_orm::DbErr) -> ServiceError {
    ServiceError::Db(e.to_string())
}

fn to_domain(m: resource::Model) -> Result<Resource, ServiceError> {
    Ok(Resource {
        resource_type: m.resource_type.parse()?,
        category: m.category.parse()?,
        tags: decode_tags(&m.tags)?,
        id: m.id,
        title: m.title,
        description: m.description,
        long_description: m.long_description,
        image_url: m.image_url,
        file_url: m.file_url,
        file_name: m.file_name,
        download_count: u64::try_from(m.download_count).unwrap_or(0),
        is_coming_soon: m.is_coming_soon,
        is_hidden: m.is_hidden,
        live_date: m.live_date.map(|d| d.with_timezone(&Utc)),
        revision: u64::try_from(m.revision).unwrap_or(0),
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    })
}

/// Every editable column; id, counter and creation time stay `NotSet`.
fn editable_columns(r: &Resource) -> resource::ActiveModel {
    resource::ActiveModel {
        title: Set(r.title.clone()),
        description: Set(r.description.clone()),
        long_description: Set(r.long_description.clone()),
        resource_type: Set(r.resource_type.as_str().to_string()),
        category: Set(r.category.as_str().to_string()),
        tags: Set(encode_tags(&r.tags)),
        image_url: Set(r.image_url.clone()),
        file_url: Set(r.file_url.clone()),
        file_name: Set(r.file_name.clone()),
        is_coming_soon: Set(r.is_coming_soon),
        is_hidden: Set(r.is_hidden),
        live_date: Set(r.live_date.map(Into::into)),
        revision: Set(r.revision as i64),
        updated_at: Set(r.updated_at.into()),
        ..Default::default()
    }
}

#[async_trait::async_trait]
impl CatalogRepository for SeaOrmCatalogRepository {
    async fn list(&self) -> Result<Vec<Resource>, ServiceError> {
        let rows = resource::Entity::find().all(&self.db).await.map_err(db_err)?;
        rows.into_iter().map(to_domain).collect()
    }

    async fn get(&self, id: &str) -> Result<Option<Resource>, ServiceError> {
        self.find(id).await?.map(to_domain).transpose()
    }

    async fn insert(&self, r: Resource) -> Result<Resource, ServiceError> {
        let mut am = editable_columns(&r);
        am.id = Set(r.id.clone());
        am.download_count = Set(r.download_count as i64);
        am.created_at = Set(r.created_at.into());
        let created = am.insert(&self.db).await.map_err(db_err)?;
        to_domain(created)
    }

    async fn update(&self, id: &str, expected_revision: u64, patch: &ResourcePatch) -> Result<Resource, ServiceError> {
        let current = self.find(id).await?.ok_or_else(|| ServiceError::not_found("resource"))?;
        let mut next = to_domain(current)?;
        if next.revision != expected_revision {
            return Err(ServiceError::stale_revision(expected_revision, next.revision));
        }
        patch.apply(&mut next);
        next.revision = expected_revision + 1;
        next.updated_at = Utc::now();

        let res = resource::Entity::update_many()
            .set(editable_columns(&next))
            .filter(resource::Column::Id.eq(id))
            .filter(resource::Column::Revision.eq(expected_revision as i64))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            // lost the race: someone else edited or deleted it since the read
            return match self.find(id).await? {
                Some(m) => Err(ServiceError::stale_revision(expected_revision, u64::try_from(m.revision).unwrap_or(0))),
                None => Err(ServiceError::not_found("resource")),
            };
        }
        let fresh = self.find(id).await?.ok_or_else(|| ServiceError::not_found("resource"))?;
        to_domain(fresh)
    }

    async fn remove(&self, id: &str) -> Result<Option<Resource>, ServiceError> {
        let Some(existing) = self.find(id).await? else {
            return Ok(None);
        };
        let res = resource::Entity::delete_by_id(id.to_string()).exec(&self.db).await.map_err(db_err)?;
        if res.rows_affected == 0 {
            return Ok(None);
        }
        to_domain(existing).map(Some)
    }

    async fn increment_download_count(&self, id: &str) -> Result<u64, ServiceError> {
        let res = resource::Entity::update_many()
            .col_expr(resource::Column::DownloadCount, Expr::col(resource::Column::DownloadCount).add(1))
            .filter(resource::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if res.rows_affected == 0 {
            return Err(ServiceError::not_found("resource"));
        }
        let m = self.find(id).await?.ok_or_else(|| ServiceError::not_found("resource"))?;
        Ok(u64::try_from(m.download_count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, sample_resource, skip_db_tests};
    use std::sync::Arc;

    #[tokio::test]
    async fn seaorm_increment_and_conditional_update() -> Result<(), anyhow::Error> {
        if skip_db_tests() {
            return Ok(());
        }
        let repo = Arc::new(SeaOrmCatalogRepository::new(get_db().await?));
        let r = repo.insert(sample_resource("Budget Sheet")).await?;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let repo = repo.clone();
            let id = r.id.clone();
            handles.push(tokio::spawn(async move { repo.increment_download_count(&id).await }));
        }
        for h in handles {
            h.await??;
        }
        assert_eq!(repo.get(&r.id).await?.map(|r| r.download_count), Some(20));

        let patch = ResourcePatch { is_hidden: Some(true), ..Default::default() };
        let updated = repo.update(&r.id, r.revision, &patch).await?;
        assert!(updated.is_hidden);
        assert_eq!(updated.download_count, 20);
        assert!(matches!(repo.update(&r.id, r.revision, &patch).await, Err(ServiceError::Conflict(_))));

        assert!(repo.remove(&r.id).await?.is_some());
        assert!(repo.get(&r.id).await?.is_none());
        Ok(())
    }
}
