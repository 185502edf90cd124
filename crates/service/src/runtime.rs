//! Runtime environment helpers
//!
//! Opens the persistence backend chosen in the config and wires the
//! services on top of it, so binaries only deal with [`Services`].

use std::sync::Arc;

use chrono::Duration;
use configs::{AppConfig, StorageBackend};
use migration::MigratorTrait;
use tracing::info;

use crate::auth::repo::SeaOrmCredentialRepository;
use crate::auth::repository::{CredentialRepository, JsonCredentialRepository};
use crate::auth::{AuthConfig, AuthService};
use crate::blob::{BlobStore, LocalBlobStore};
use crate::catalog::repo::SeaOrmCatalogRepository;
use crate::catalog::{CatalogRepository, CatalogService, JsonCatalogRepository};
use crate::downloads::{DownloadService, SubscriberPassIssuer};
use crate::leads::repo::SeaOrmLeadRepository;
use crate::leads::{JsonLeadRepository, LeadRepository, LeadService};

/// Everything the HTTP layer needs.
#[derive(Clone)]
pub struct Services {
    pub catalog: CatalogService,
    pub leads: LeadService,
    pub downloads: DownloadService,
    pub auth: Arc<AuthService>,
}

pub struct Repositories {
    pub catalog: Arc<dyn CatalogRepository>,
    pub leads: Arc<dyn LeadRepository>,
    pub credentials: Arc<dyn CredentialRepository>,
}

impl Repositories {
    /// JSON document files under `data_dir`.
    pub async fn json(data_dir: &str) -> anyhow::Result<Self> {
        Ok(Self {
            catalog: Arc::new(JsonCatalogRepository::open(data_dir).await?),
            leads: Arc::new(JsonLeadRepository::open(data_dir).await?),
            credentials: Arc::new(JsonCredentialRepository::open(data_dir).await?),
        })
    }

    /// Postgres through SeaORM; pending migrations are applied first.
    pub async fn postgres(cfg: &configs::DatabaseConfig) -> anyhow::Result<Self> {
        let db = models::db::connect_with_config(cfg).await?;
        migration::Migrator::up(&db, None).await?;
        info!("database migrations applied");
        Ok(Self {
            catalog: Arc::new(SeaOrmCatalogRepository::new(db.clone())),
            leads: Arc::new(SeaOrmLeadRepository::new(db.clone())),
            credentials: Arc::new(SeaOrmCredentialRepository { db }),
        })
    }

    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        match cfg.storage.backend {
            StorageBackend::Json => {
                info!(data_dir = %cfg.storage.data_dir, "using json document storage");
                Self::json(&cfg.storage.data_dir).await
            }
            StorageBackend::Postgres => {
                info!("using postgres storage");
                Self::postgres(&cfg.database).await
            }
        }
    }
}

impl Services {
    pub fn assemble(repos: Repositories, blobs: Arc<dyn BlobStore>, auth: &configs::AuthSettings) -> Self {
        let catalog = CatalogService::new(repos.catalog, blobs);
        let leads = LeadService::new(repos.leads, catalog.clone());
        let passes = SubscriberPassIssuer::new(auth.jwt_secret.clone(), Duration::days(auth.subscriber_pass_days));
        let downloads = DownloadService::new(catalog.clone(), leads.clone(), passes);
        let auth = Arc::new(AuthService::new(
            repos.credentials,
            AuthConfig {
                jwt_secret: auth.jwt_secret.clone(),
                password_algorithm: "argon2".into(),
                session_ttl: Duration::hours(auth.session_ttl_hours),
            },
        ));
        Self { catalog, leads, downloads, auth }
    }

    /// Open storage, the local blob store and seed the admin account.
    pub async fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        common::env::ensure_env(&cfg.storage.data_dir, &cfg.blobs.root_dir).await?;
        let repos = Repositories::from_config(cfg).await?;
        let blobs = Arc::new(LocalBlobStore::new(&cfg.blobs.root_dir, cfg.blobs.public_base_url.clone()).await?);
        let services = Self::assemble(repos, blobs, &cfg.auth);
        if let Some(password) = &cfg.auth.admin_password {
            services.auth.bootstrap_admin(&cfg.auth.admin_username, password).await?;
        }
        Ok(services)
    }
}
