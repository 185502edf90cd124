//! Migrator for the Postgres backend. Indexes are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240601_000001_create_resource;
mod m20240601_000002_create_lead;
mod m20240601_000003_create_admin_credentials;
mod m20240601_000004_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_resource::Migration),
            Box::new(m20240601_000002_create_lead::Migration),
            Box::new(m20240601_000003_create_admin_credentials::Migration),
            Box::new(m20240601_000004_add_indexes::Migration),
        ]
    }
}
