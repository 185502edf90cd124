use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use super::domain::AdminCredentials;
use super::errors::AuthError;
use crate::storage::json_map_store::JsonMapStore;

/// Repository abstraction for admin credential persistence.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn get_credentials(&self, username: &str) -> Result<Option<AdminCredentials>, AuthError>;
    async fn upsert_password(&self, username: &str, password_hash: String, password_algorithm: String) -> Result<AdminCredentials, AuthError>;
}

/// Credentials kept in `credentials.json` next to the catalog documents.
pub struct JsonCredentialRepository {
    store: Arc<JsonMapStore<String, AdminCredentials>>,
}

impl JsonCredentialRepository {
    pub async fn open(data_dir: impl Into<PathBuf>) -> Result<Self, AuthError> {
        let store = JsonMapStore::new(data_dir.into().join("credentials.json"))
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(Self { store })
    }
}

#[async_trait]
impl CredentialRepository for JsonCredentialRepository {
    async fn get_credentials(&self, username: &str) -> Result<Option<AdminCredentials>, AuthError> {
        Ok(self.store.get(&username.to_string()).await)
    }

    async fn upsert_password(&self, username: &str, password_hash: String, password_algorithm: String) -> Result<AdminCredentials, AuthError> {
        let c = AdminCredentials {
            username: username.to_string(),
            password_hash,
            password_algorithm,
            updated_at: Utc::now(),
        };
        self.store
            .insert(username.to_string(), c.clone())
            .await
            .map_err(|e| AuthError::Repository(e.to_string()))?;
        Ok(c)
    }
}
