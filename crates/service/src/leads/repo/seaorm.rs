use chrono::Utc;
use models::lead;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};

use crate::errors::ServiceError;
use crate::leads::domain::Lead;
use crate::leads::repository::LeadRepository;

pub struct SeaOrmLeadRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmLeadRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

fn to_domain(m: lead::Model) -> Lead {
    Lead {
        id: m.id,
        first_name: m.first_name,
        email: m.email,
        resource_id: m.resource_id,
        resource_title: m.resource_title,
        timestamp: m.timestamp.with_timezone(&Utc),
        has_consented: m.has_consented,
    }
}

#[async_trait::async_trait]
impl LeadRepository for SeaOrmLeadRepository {
    async fn append(&self, l: Lead) -> Result<Lead, ServiceError> {
        let am = lead::ActiveModel {
            id: Set(l.id),
            first_name: Set(l.first_name),
            email: Set(l.email),
            resource_id: Set(l.resource_id),
            resource_title: Set(l.resource_title),
            timestamp: Set(l.timestamp.into()),
            has_consented: Set(l.has_consented),
        };
        let created = am.insert(&self.db).await.map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(to_domain(created))
    }

    async fn list(&self) -> Result<Vec<Lead>, ServiceError> {
        let rows = lead::Entity::find()
            .order_by_asc(lead::Column::Timestamp)
            .order_by_asc(lead::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows.into_iter().map(to_domain).collect())
    }

    async fn list_for_resource(&self, resource_id: &str) -> Result<Vec<Lead>, ServiceError> {
        let rows = lead::Entity::find()
            .filter(lead::Column::ResourceId.eq(resource_id))
            .order_by_asc(lead::Column::Timestamp)
            .order_by_asc(lead::Column::Id)
            .all(&self.db)
            .await
            .map_err(|e| ServiceError::Db(e.to_string()))?;
        Ok(rows.into_iter().map(to_domain).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{get_db, skip_db_tests};

    #[tokio::test]
    async fn seaorm_append_and_list_by_resource() -> Result<(), anyhow::Error> {
        if skip_db_tests() {
            return Ok(());
        }
        let repo = SeaOrmLeadRepository::new(get_db().await?);
        let resource_id = uuid::Uuid::new_v4().to_string();
        let lead = Lead {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: "Jo".into(),
            email: "jo@example.com".into(),
            resource_id: resource_id.clone(),
            resource_title: "Budget Sheet".into(),
            timestamp: Utc::now(),
            has_consented: true,
        };
        repo.append(lead.clone()).await?;
        let listed = repo.list_for_resource(&resource_id).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].email, lead.email);
        Ok(())
    }
}
