//! Feature flag seeding functionality
//!
//! Seeds the feature_flags table with the global switches the service
//! ships with, so a fresh deployment resolves entitlements without manual
//! setup.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};

use crate::models::feature_flag::{self, Entity as FeatureFlag};

/// Seeds the feature_flags table with the built-in global flags.
///
/// Existing rows are left untouched so operator overrides survive
/// restarts.
pub async fn seed_feature_flags(db: &DatabaseConnection) -> Result<()> {
    let flags = [("generador", true)];

    for (feature, is_enabled) in flags {
        match FeatureFlag::find_by_id(feature.to_string()).one(db).await {
            Ok(Some(_)) => {
                log::info!("Feature flag '{}' already exists, skipping", feature);
                continue;
            }
            Ok(None) => {
                log::info!("Creating feature flag: {}", feature);

                let flag = feature_flag::ActiveModel {
                    feature: Set(feature.to_string()),
                    is_enabled: Set(is_enabled),
                    created_at: Set(Utc::now().into()),
                    updated_at: Set(Utc::now().into()),
                };

                if let Err(e) = flag.insert(db).await {
                    log::error!("Failed to create feature flag '{}': {}", feature, e);
                    return Err(e.into());
                }
            }
            Err(e) => {
                log::error!("Error checking if feature flag '{}' exists: {}", feature, e);
                return Err(e.into());
            }
        }
    }

    log::info!("Feature flag seeding completed successfully");
    Ok(())
}
