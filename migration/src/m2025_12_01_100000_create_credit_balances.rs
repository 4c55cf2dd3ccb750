//! Migration to create the credit_balances table.
//!
//! One row per user holding the remaining generation credits. The balance
//! is only ever mutated through single-statement conditional updates, and
//! the check constraint keeps it from going negative even if a future
//! write path regresses.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CreditBalances::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CreditBalances::UserId)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CreditBalances::Balance)
                            .big_integer()
                            .not_null()
                            .check(Expr::col(CreditBalances::Balance).gte(0)),
                    )
                    .col(
                        ColumnDef::new(CreditBalances::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(CreditBalances::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CreditBalances::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum CreditBalances {
    Table,
    UserId,
    Balance,
    CreatedAt,
    UpdatedAt,
}
