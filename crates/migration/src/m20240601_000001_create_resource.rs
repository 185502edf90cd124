//! Create `resource` table: one row per catalog entry.
//! `download_count` is only ever changed by an in-place `+ 1` update.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Resource::Table)
                    .if_not_exists()
                    .col(string_len(Resource::Id, 64).primary_key())
                    .col(string_len(Resource::Title, 256).not_null())
                    .col(text(Resource::Description).not_null())
                    .col(text(Resource::LongDescription).not_null())
                    .col(string_len(Resource::ResourceType, 32).not_null())
                    .col(string_len(Resource::Category, 64).not_null())
                    .col(text(Resource::Tags).not_null())
                    .col(text(Resource::ImageUrl).not_null())
                    .col(text(Resource::FileUrl).not_null())
                    .col(string_len(Resource::FileName, 256).not_null())
                    .col(big_integer(Resource::DownloadCount).not_null().default(0))
                    .col(boolean(Resource::IsComingSoon).not_null())
                    .col(boolean(Resource::IsHidden).not_null().default(false))
                    .col(timestamp_with_time_zone_null(Resource::LiveDate))
                    .col(big_integer(Resource::Revision).not_null().default(1))
                    .col(timestamp_with_time_zone(Resource::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(Resource::UpdatedAt).not_null())
                    .check(Expr::col(Resource::DownloadCount).gte(0))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Resource::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Resource {
    Table,
    Id,
    Title,
    Description,
    LongDescription,
    ResourceType,
    Category,
    Tags,
    ImageUrl,
    FileUrl,
    FileName,
    DownloadCount,
    IsComingSoon,
    IsHidden,
    LiveDate,
    Revision,
    CreatedAt,
    UpdatedAt,
}
