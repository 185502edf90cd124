//! Create `admin_credentials` table storing the admin password hash.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AdminCredentials::Table)
                    .if_not_exists()
                    .col(string_len(AdminCredentials::Username, 128).primary_key())
                    .col(string_len(AdminCredentials::PasswordHash, 255).not_null())
                    .col(string_len(AdminCredentials::PasswordAlgorithm, 64).not_null())
                    .col(timestamp_with_time_zone(AdminCredentials::UpdatedAt).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(AdminCredentials::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum AdminCredentials {
    Table,
    Username,
    PasswordHash,
    PasswordAlgorithm,
    UpdatedAt,
}
