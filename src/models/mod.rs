//! # Data Models
//!
//! This module contains all the data models used throughout the SAM API.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod credit_balance;
pub mod feature_flag;
pub mod generated_material;
pub mod user_feature;

pub use credit_balance::Entity as CreditBalance;
pub use feature_flag::Entity as FeatureFlag;
pub use generated_material::Entity as GeneratedMaterial;
pub use user_feature::Entity as UserFeature;

/// Basic service information response
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ServiceInfo {
    /// The name of the service
    pub service: String,
    /// The version of the service
    pub version: String,
}

impl Default for ServiceInfo {
    fn default() -> Self {
        Self {
            service: "sam-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
