//! Migration to create the user_features table.
//!
//! Per-user feature entitlements. A row here overrides the global flag in
//! feature_flags for that (user, feature) pair.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserFeatures::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(UserFeatures::UserId).uuid().not_null())
                    .col(ColumnDef::new(UserFeatures::Feature).text().not_null())
                    .col(
                        ColumnDef::new(UserFeatures::Enabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(UserFeatures::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(UserFeatures::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(UserFeatures::UserId)
                            .col(UserFeatures::Feature),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserFeatures::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserFeatures {
    Table,
    UserId,
    Feature,
    Enabled,
    CreatedAt,
    UpdatedAt,
}
