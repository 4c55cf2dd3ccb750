//! # Generation API Handlers
//!
//! Handlers for the generation endpoint family: `POST /generate` runs the
//! credit-gated provider fallback pass, `GET /generate/history` returns the
//! caller's recent materials.
//!
//! `POST /generate` validates its input before authenticating: an
//! unrecognized mode or empty prompt is rejected without consulting the
//! auth provider, the entitlement store, or the ledger.

use crate::auth::{self, UserExtension};
use crate::error::{ApiError, ErrorCode};
use crate::llm::GenerationMode;
use crate::models::generated_material::MaterialHistoryEntry;
use crate::orchestrator::{self, GenerateResponse};
use crate::repositories::MaterialRepository;
use crate::repositories::material::HISTORY_LIMIT;
use crate::server::AppState;
use crate::telemetry::RequestContext;
use axum::{
    Extension,
    extract::{Json, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use utoipa::ToSchema;

/// Request body for `POST /generate`
#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    /// Prompt describing the material to generate
    pub prompt: Option<String>,
    /// Generation mode: "basic" (default), "advanced" or "premium"
    #[serde(default)]
    pub mode: Option<String>,
}

/// Response wrapper for `GET /generate/history`
#[derive(Debug, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub ok: bool,
    /// Most recent materials, newest first (at most 20)
    pub materials: Vec<MaterialHistoryEntry>,
    /// Number of materials returned
    pub count: usize,
}

/// Generate educational material for the authenticated user
#[utoipa::path(
    post,
    path = "/generate",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Generated material (possibly the fallback stub)", body = GenerateResponse),
        (status = 400, description = "Unrecognized mode or missing prompt", body = ApiError),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 402, description = "Insufficient credits", body = ApiError),
        (status = 403, description = "Feature not enabled", body = ApiError),
        (status = 500, description = "Credit ledger or entitlement store unavailable", body = ApiError)
    ),
    tag = "generation"
)]
pub async fn generate(
    State(state): State<AppState>,
    Extension(context): Extension<RequestContext>,
    headers: HeaderMap,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let Json(body) = payload?;

    // Cheap validation first: nothing else is consulted for bad input.
    let mode_name = body.mode.as_deref().unwrap_or("basic");
    let mode = GenerationMode::parse(mode_name).ok_or_else(|| {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            "INVALID_MODE",
            "Mode must be one of: basic, advanced, premium",
        )
        .with_details(json!({ "mode": mode_name }))
    })?;

    let prompt = body
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .ok_or(ErrorCode::InvalidPrompt)
        .map_err(ApiError::from)?;

    let user = auth::authenticate(&state, &headers).await?;

    let response =
        orchestrator::run_generation(&state, &user, prompt, mode, &context.request_id).await?;

    Ok(Json(response))
}

/// Most recent generated materials for the authenticated user
#[utoipa::path(
    get,
    path = "/generate/history",
    responses(
        (status = 200, description = "Recent materials, newest first", body = HistoryResponse),
        (status = 401, description = "Missing or invalid session", body = ApiError),
        (status = 500, description = "History lookup failed", body = ApiError)
    ),
    tag = "generation"
)]
pub async fn history(
    State(state): State<AppState>,
    UserExtension(user): UserExtension,
) -> Result<Json<HistoryResponse>, ApiError> {
    let repo = MaterialRepository::new(Arc::new(state.db.clone()));

    let materials = repo
        .recent_for_user(user.id, HISTORY_LIMIT)
        .await
        .map_err(|err| {
            tracing::error!(user_id = %user.id, error = %err, "Failed to fetch history");
            ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVER_ERROR",
                "Failed to fetch history",
            )
        })?;

    let materials: Vec<MaterialHistoryEntry> =
        materials.into_iter().map(MaterialHistoryEntry::from).collect();

    Ok(Json(HistoryResponse {
        ok: true,
        count: materials.len(),
        materials,
    }))
}
