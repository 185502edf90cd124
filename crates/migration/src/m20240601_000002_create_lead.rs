//! Create `lead` table: append-only signups.
//! No foreign key to `resource`; leads outlive deleted resources.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Lead::Table)
                    .if_not_exists()
                    .col(string_len(Lead::Id, 64).primary_key())
                    .col(string_len(Lead::FirstName, 256).not_null())
                    .col(string_len(Lead::Email, 320).not_null())
                    .col(string_len(Lead::ResourceId, 64).not_null())
                    .col(string_len(Lead::ResourceTitle, 256).not_null())
                    .col(timestamp_with_time_zone(Lead::Timestamp).not_null())
                    .col(boolean(Lead::HasConsented).not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Lead::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    Id,
    FirstName,
    Email,
    ResourceId,
    ResourceTitle,
    Timestamp,
    HasConsented,
}
