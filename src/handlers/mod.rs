//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the SAM API.

use crate::models::ServiceInfo;
use axum::response::Json;

pub mod checkout;
pub mod features;
pub mod generate;
pub mod health;
pub mod pricing;
pub mod webhooks;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}
