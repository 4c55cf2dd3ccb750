//! Generated material entity model
//!
//! Append-only log of generated artifacts. Rows are written best-effort
//! after a successful generation pass and never updated.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One generated artifact owned by a user
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "generated_materials")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    /// Owning user (external auth identity)
    pub user_id: Uuid,

    /// The prompt the material was generated from
    pub prompt: String,

    /// The generated (or fallback) material text
    pub material: String,

    /// Generation mode the request was made with
    pub mode: String,

    /// Correlation id of the originating request
    pub request_id: Uuid,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// History view of a generated material, as returned by `GET /generate/history`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MaterialHistoryEntry {
    /// Unique identifier of the material
    #[schema(value_type = String)]
    pub id: Uuid,
    /// Prompt the material was generated from
    pub prompt: String,
    /// Generated material text
    pub material: String,
    /// Generation mode
    pub mode: String,
    /// Creation timestamp, RFC3339
    pub created_at: String,
}

impl From<Model> for MaterialHistoryEntry {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            prompt: model.prompt,
            material: model.material,
            mode: model.mode,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}
