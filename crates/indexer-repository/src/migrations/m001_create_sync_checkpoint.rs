use sea_orm_migration::{
    async_trait::async_trait,
    prelude::{DbErr, DeriveMigrationName, Iden, Index, MigrationTrait, SchemaManager, Table},
    schema::{big_integer, integer},
    sea_query,
};

#[derive(Iden)]
enum SyncCheckpoint {
    Table,
    Id,
    LastIndexedBlock,
    LatestObservedBlock,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncCheckpoint::Table)
                    .if_not_exists()
                    .col(integer(SyncCheckpoint::Id))
                    .col(big_integer(SyncCheckpoint::LastIndexedBlock).default(0))
                    .col(big_integer(SyncCheckpoint::LatestObservedBlock).default(0))
                    .col(big_integer(SyncCheckpoint::UpdatedAt))
                    .primary_key(Index::create().col(SyncCheckpoint::Id))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(SyncCheckpoint::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await
    }
}
