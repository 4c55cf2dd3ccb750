//! Entitlement repository
//!
//! Read-only two-tier feature entitlement resolution: a per-user row wins,
//! a missing row falls back to the global flag, and a missing global flag
//! means disabled. A hard store failure is its own error variant so the
//! caller can refuse the feature instead of accidentally enabling it.

use std::sync::Arc;

use sea_orm::{DatabaseConnection, DbErr, EntityTrait};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{FeatureFlag, UserFeature};

/// Errors surfaced by entitlement lookups.
#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("entitlement lookup failed: {0}")]
    Store(#[from] DbErr),
}

/// Repository for feature entitlement lookups
#[derive(Debug, Clone)]
pub struct EntitlementRepository {
    db: Arc<DatabaseConnection>,
}

impl EntitlementRepository {
    /// Creates a new EntitlementRepository instance
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Resolve whether `feature` is enabled for `user_id`.
    ///
    /// Resolution order: per-user override row, then the global flag,
    /// then `false`.
    pub async fn is_feature_enabled(
        &self,
        user_id: Uuid,
        feature: &str,
    ) -> Result<bool, EntitlementError> {
        if let Some(row) = UserFeature::find_by_id((user_id, feature.to_string()))
            .one(&*self.db)
            .await?
        {
            return Ok(row.enabled);
        }

        let global = FeatureFlag::find_by_id(feature.to_string())
            .one(&*self.db)
            .await?;

        Ok(global.map(|flag| flag.is_enabled).unwrap_or(false))
    }
}
