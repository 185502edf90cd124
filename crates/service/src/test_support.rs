#![cfg(test)]
use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::Utc;
use migration::MigratorTrait;
use models::db::connect_with_config;
use models::kinds::{Category, ResourceType};
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

use crate::catalog::{NewResource, Resource};

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Postgres-backed tests run only with `DATABASE_URL` set and `SKIP_DB_TESTS` unset.
pub fn skip_db_tests() -> bool {
    std::env::var("SKIP_DB_TESTS").is_ok() || std::env::var("DATABASE_URL").is_err()
}

fn db_config() -> configs::DatabaseConfig {
    let mut cfg = configs::DatabaseConfig::default();
    cfg.url = std::env::var("DATABASE_URL").unwrap_or_default();
    cfg.max_connections = cfg.max_connections.max(20);
    cfg.min_connections = cfg.min_connections.min(1);
    cfg.acquire_timeout_secs = 10;
    cfg
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect_with_config(&db_config()).await?;
            migration::Migrator::up(&db, None).await?;
            drop(db);
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    // Return a fresh connection for the current test's runtime
    connect_with_config(&db_config()).await
}

pub fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("resource_library_{}", uuid::Uuid::new_v4()))
}

pub fn new_resource(title: &str) -> NewResource {
    NewResource {
        title: title.to_string(),
        description: format!("{title} for everyday planning"),
        long_description: String::new(),
        resource_type: ResourceType::Spreadsheet,
        category: Category::Toolkit,
        tags: BTreeSet::new(),
        image_url: String::new(),
        file_url: String::new(),
        file_name: String::new(),
        is_coming_soon: false,
        is_hidden: false,
        live_date: None,
    }
}

pub fn sample_resource(title: &str) -> Resource {
    let now = Utc::now();
    Resource {
        id: uuid::Uuid::new_v4().to_string(),
        title: title.to_string(),
        description: format!("{title} for everyday planning"),
        long_description: String::new(),
        resource_type: ResourceType::Spreadsheet,
        category: Category::Toolkit,
        tags: BTreeSet::new(),
        image_url: String::new(),
        file_url: String::new(),
        file_name: String::new(),
        download_count: 0,
        is_coming_soon: false,
        is_hidden: false,
        live_date: None,
        revision: 1,
        created_at: now,
        updated_at: now,
    }
}
