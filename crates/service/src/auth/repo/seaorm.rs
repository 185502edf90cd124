use chrono::Utc;
use sea_orm::{DatabaseConnection, EntityTrait};

use crate::auth::domain::AdminCredentials;
use crate::auth::errors::AuthError;
use crate::auth::repository::CredentialRepository;

pub struct SeaOrmCredentialRepository {
    pub db: DatabaseConnection,
}

fn to_domain(c: models::admin_credentials::Model) -> AdminCredentials {
    AdminCredentials {
        username: c.username,
        password_hash: c.password_hash,
        password_algorithm: c.password_algorithm,
        updated_at: c.updated_at.with_timezone(&Utc),
    }
}

#[async_trait::async_trait]
impl CredentialRepository for SeaOrmCredentialRepository {
    async fn get_credentials(&self, username: &str) -> Result<Option<AdminCredentials>, AuthError> {
        let res = models::admin_credentials::Entity::find_by_id(username.to_string())
            .one(&self.db)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(res.map(to_domain))
    }

    async fn upsert_password(&self, username: &str, password_hash: String, password_algorithm: String) -> Result<AdminCredentials, AuthError> {
        let c = models::admin_credentials::upsert_password(&self.db, username, password_hash, &password_algorithm)
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(to_domain(c))
    }
}
