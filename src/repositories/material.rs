//! Generated material repository
//!
//! Append-only persistence of generation results plus the newest-first
//! history query backing `GET /generate/history`.

use std::sync::Arc;

use anyhow::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::models::generated_material::{self, Entity as GeneratedMaterial};

/// Maximum number of materials returned by the history view.
pub const HISTORY_LIMIT: u64 = 20;

/// Repository for generated material records
#[derive(Debug, Clone)]
pub struct MaterialRepository {
    db: Arc<DatabaseConnection>,
}

impl MaterialRepository {
    /// Creates a new MaterialRepository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Append a generated material record for the user.
    pub async fn append(
        &self,
        user_id: Uuid,
        prompt: &str,
        material: &str,
        mode: &str,
        request_id: Uuid,
    ) -> Result<generated_material::Model> {
        let record = generated_material::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            prompt: Set(prompt.to_string()),
            material: Set(material.to_string()),
            mode: Set(mode.to_string()),
            request_id: Set(request_id),
            created_at: Set(chrono::Utc::now().into()),
        };

        Ok(record.insert(&*self.db).await?)
    }

    /// Most recent materials for the user, newest first, capped at `limit`.
    pub async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<generated_material::Model>> {
        let materials = GeneratedMaterial::find()
            .filter(generated_material::Column::UserId.eq(user_id))
            .order_by_desc(generated_material::Column::CreatedAt)
            .limit(limit)
            .all(&*self.db)
            .await?;

        Ok(materials)
    }
}
