use sea_orm_migration::prelude::*;

use super::m20250722_000001_create_store_tables::{Orders, Products, Users, pk_col, timestamp_col};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Currencies::Table)
                    .if_not_exists()
                    .col(pk_col(Currencies::CurrencyId))
                    .col(
                        ColumnDef::new(Currencies::CurrencyCode)
                            .string_len(3)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Currencies::Symbol).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Currencies::ExchangeRateToUsd)
                            .decimal_len(10, 4)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(TransactionLogs::Table)
                    .if_not_exists()
                    .col(pk_col(TransactionLogs::LogId))
                    .col(ColumnDef::new(TransactionLogs::UserId).integer().null())
                    .col(ColumnDef::new(TransactionLogs::ActionType).string().not_null())
                    .col(ColumnDef::new(TransactionLogs::TableName).string().not_null())
                    .col(ColumnDef::new(TransactionLogs::RecordId).integer().not_null())
                    .col(ColumnDef::new(TransactionLogs::OldValue).text().null())
                    .col(ColumnDef::new(TransactionLogs::NewValue).text().null())
                    .col(timestamp_col(TransactionLogs::ActionTimestamp))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transaction_logs_user_id")
                            .from(TransactionLogs::Table, TransactionLogs::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // SQLite accepts a single column change per ALTER statement.
        manager
            .alter_table(
                Table::alter()
                    .table(Orders::Table)
                    .add_column(ColumnDef::new(Alias::new("currency_id")).integer().null())
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Products::Table)
                    .add_column(ColumnDef::new(Alias::new("currency_id")).integer().null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Products::Table)
                    .drop_column(Alias::new("currency_id"))
                    .to_owned(),
            )
            .await?;
        manager
            .alter_table(
                Table::alter()
                    .table(Orders::Table)
                    .drop_column(Alias::new("currency_id"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(TransactionLogs::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Currencies::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Currencies {
    Table,
    CurrencyId,
    CurrencyCode,
    Symbol,
    ExchangeRateToUsd,
}

#[derive(DeriveIden)]
enum TransactionLogs {
    Table,
    LogId,
    UserId,
    ActionType,
    TableName,
    RecordId,
    OldValue,
    NewValue,
    ActionTimestamp,
}
