//! # Pricing Handler
//!
//! `GET /pricing` exposes the subscription price currently in effect. The
//! early-bird price applies until the configured window closes.

use crate::config::PricingConfig;
use crate::server::AppState;
use axum::{extract::State, response::Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Response for `GET /pricing`
#[derive(Debug, Serialize, ToSchema)]
pub struct PricingResponse {
    /// Price currently in effect, CLP
    #[serde(rename = "activePrice")]
    pub active_price: u32,
    /// "EARLY_BIRD" or "REGULAR"
    pub label: String,
    /// End of the early-bird window, RFC3339
    #[serde(rename = "endsAt")]
    pub ends_at: String,
    /// Whether the early-bird window is still open
    #[serde(rename = "isActive")]
    pub is_active: bool,
}

/// True while the early-bird window is open. An unparseable window end
/// closes the window rather than discounting forever.
pub fn early_bird_active(pricing: &PricingConfig) -> bool {
    DateTime::parse_from_rfc3339(&pricing.early_bird_ends_at)
        .map(|ends_at| Utc::now() < ends_at)
        .unwrap_or(false)
}

/// Current subscription pricing
#[utoipa::path(
    get,
    path = "/pricing",
    responses(
        (status = 200, description = "Active subscription pricing", body = PricingResponse)
    ),
    tag = "payments"
)]
pub async fn pricing(State(state): State<AppState>) -> Json<PricingResponse> {
    let pricing = &state.config.pricing;
    let is_active = early_bird_active(pricing);

    Json(PricingResponse {
        active_price: if is_active {
            pricing.early_bird_price_clp
        } else {
            pricing.regular_price_clp
        },
        label: if is_active { "EARLY_BIRD" } else { "REGULAR" }.to_string(),
        ends_at: pricing.early_bird_ends_at.clone(),
        is_active,
    })
}
