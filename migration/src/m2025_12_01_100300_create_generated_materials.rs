//! Migration to create the generated_materials table.
//!
//! Append-only log of generated artifacts per user, queried newest-first
//! for the history view.

use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::Statement;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(GeneratedMaterials::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GeneratedMaterials::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GeneratedMaterials::UserId).uuid().not_null())
                    .col(ColumnDef::new(GeneratedMaterials::Prompt).text().not_null())
                    .col(
                        ColumnDef::new(GeneratedMaterials::Material)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(GeneratedMaterials::Mode).text().not_null())
                    .col(
                        ColumnDef::new(GeneratedMaterials::RequestId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(GeneratedMaterials::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // History is always read newest-first per user, so the index
        // carries created_at DESC (raw SQL: the builder has no column
        // ordering on all backends).
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "CREATE INDEX IF NOT EXISTS idx_generated_materials_user_created \
                 ON generated_materials (user_id, created_at DESC)"
                    .to_string(),
            ))
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute(Statement::from_string(
                manager.get_database_backend(),
                "DROP INDEX IF EXISTS idx_generated_materials_user_created".to_string(),
            ))
            .await?;

        manager
            .drop_table(Table::drop().table(GeneratedMaterials::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum GeneratedMaterials {
    Table,
    Id,
    UserId,
    Prompt,
    Material,
    Mode,
    RequestId,
    CreatedAt,
}
