use sea_orm_migration::{
    async_trait::async_trait,
    prelude::{DbErr, DeriveMigrationName, Iden, Index, MigrationTrait, SchemaManager, Table},
    schema::{big_integer, blob_null, boolean, string_len, string_null},
    sea_query,
};

#[derive(Iden)]
enum Unspents {
    Table,
    TxId,
    BlockNumber,
    IsEncrypted,
    EncryptedPayload,
    ShieldAddress,
    Amount,
    Nonce,
    Token,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Unspents::Table)
                    .if_not_exists()
                    .col(string_len(Unspents::TxId, 66))
                    .col(big_integer(Unspents::BlockNumber))
                    .col(boolean(Unspents::IsEncrypted))
                    .col(blob_null(Unspents::EncryptedPayload))
                    .col(string_null(Unspents::ShieldAddress))
                    .col(string_null(Unspents::Amount))
                    .col(string_null(Unspents::Nonce))
                    .col(string_null(Unspents::Token))
                    .primary_key(
                        Index::create()
                            .col(Unspents::TxId)
                            .col(Unspents::BlockNumber),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_unspents_is_encrypted")
                    .table(Unspents::Table)
                    .col(Unspents::IsEncrypted)
                    .col(Unspents::BlockNumber)
                    .col(Unspents::TxId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Unspents::Table).if_exists().to_owned())
            .await
    }
}
