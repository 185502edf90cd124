use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Lead: CSV export filters by resource
        manager
            .create_index(
                Index::create()
                    .name("idx_lead_resource")
                    .table(Lead::Table)
                    .col(Lead::ResourceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_lead_timestamp")
                    .table(Lead::Table)
                    .col(Lead::Timestamp)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_lead_timestamp").table(Lead::Table).to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_lead_resource").table(Lead::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Lead {
    Table,
    ResourceId,
    Timestamp,
}
