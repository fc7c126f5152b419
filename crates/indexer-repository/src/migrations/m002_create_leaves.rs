use sea_orm_migration::{
    async_trait::async_trait,
    prelude::{DbErr, DeriveMigrationName, Iden, Index, MigrationTrait, SchemaManager, Table},
    schema::{big_integer, integer, string_len},
    sea_query,
};

#[derive(Iden)]
enum Leaves {
    Table,
    TxId,
    LogIndex,
    BlockNumber,
    Commitment,
    TreeIndex,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Leaves::Table)
                    .if_not_exists()
                    .col(string_len(Leaves::TxId, 66))
                    .col(integer(Leaves::LogIndex))
                    .col(big_integer(Leaves::BlockNumber))
                    .col(string_len(Leaves::Commitment, 66))
                    .col(string_len(Leaves::TreeIndex, 78))
                    .primary_key(
                        Index::create()
                            .col(Leaves::TxId)
                            .col(Leaves::LogIndex)
                            .col(Leaves::BlockNumber),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leaves_commitment")
                    .table(Leaves::Table)
                    .col(Leaves::Commitment)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leaves_tree_index")
                    .table(Leaves::Table)
                    .col(Leaves::TreeIndex)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_leaves_block_number")
                    .table(Leaves::Table)
                    .col(Leaves::BlockNumber)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Leaves::Table).if_exists().to_owned())
            .await
    }
}
