//! Global feature flag entity model
//!
//! Global on/off switches keyed by feature name; the fallback tier of the
//! two-tier entitlement resolution.

use sea_orm::ActiveModelBehavior;
use sea_orm::entity::prelude::*;
use sea_orm::prelude::DateTimeWithTimeZone;

/// Global feature switch
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "feature_flags")]
pub struct Model {
    /// Feature name (primary key)
    #[sea_orm(primary_key, auto_increment = false)]
    pub feature: String,

    /// Whether the feature is enabled for users without a per-user override
    pub is_enabled: bool,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
