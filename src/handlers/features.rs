//! # Feature Entitlement Handler
//!
//! `GET /features/{feature}` resolves whether a named feature is enabled
//! for the authenticated user: per-user override first, global flag next,
//! disabled otherwise.

use crate::auth::UserExtension;
use crate::error::ApiError;
use crate::repositories::EntitlementRepository;
use crate::server::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

/// Response for `GET /features/{feature}`
#[derive(Debug, Serialize, ToSchema)]
pub struct FeatureStatusResponse {
    /// Whether the feature is enabled for the caller
    pub enabled: bool,
}

/// Check whether a feature is enabled for the authenticated user
#[utoipa::path(
    get,
    path = "/features/{feature}",
    params(
        ("feature" = String, Path, description = "Feature name, e.g. \"generador\"")
    ),
    responses(
        (status = 200, description = "Entitlement resolution result", body = FeatureStatusResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 500, description = "Entitlement store unavailable", body = ApiError)
    ),
    tag = "features"
)]
pub async fn feature_status(
    State(state): State<AppState>,
    UserExtension(user): UserExtension,
    Path(feature): Path<String>,
) -> Result<Json<FeatureStatusResponse>, ApiError> {
    let repo = EntitlementRepository::new(Arc::new(state.db.clone()));

    match repo.is_feature_enabled(user.id, &feature).await {
        Ok(enabled) => Ok(Json(FeatureStatusResponse { enabled })),
        Err(err) => {
            tracing::error!(user_id = %user.id, feature = %feature, error = %err, "Entitlement lookup failed");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVER_ERROR",
                "Feature not available",
            ))
        }
    }
}
