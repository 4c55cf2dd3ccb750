//! Generation orchestrator
//!
//! Sequences one generation request end to end: entitlement check, atomic
//! credit debit, provider fallback loop, best-effort persistence. The
//! ordering is deliberate and load-bearing:
//!
//! - nothing touches the ledger before entitlement passes;
//! - nothing generates before the debit succeeds;
//! - once the debit succeeded the request can no longer fail — provider
//!   failures degrade to the fallback stub, and by default the spent
//!   credit is absorbed as cost of attempting (the refund policy flips
//!   that for total failures);
//! - persistence failures are logged and swallowed.

use std::sync::Arc;

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::error::{ApiError, ErrorCode};
use crate::llm::GenerationMode;
use crate::repositories::{CreditLedger, EntitlementRepository, MaterialRepository};
use crate::server::AppState;

/// Feature gate for the generator endpoint family.
pub const GENERATOR_FEATURE: &str = "generador";

/// Successful generation response payload for `POST /generate`
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GenerateResponse {
    pub ok: bool,
    /// Generated material, or the fallback stub when every provider failed
    pub material: String,
    /// Balance remaining after the debit (and optional refund)
    #[serde(rename = "creditsRemaining")]
    pub credits_remaining: i64,
    /// Mode the request ran at
    pub mode: String,
    /// Correlation id, also echoed in the X-Request-ID header
    #[serde(rename = "requestId")]
    pub request_id: String,
    /// True when a real provider produced the material
    #[serde(rename = "llmUsed")]
    pub llm_used: bool,
    /// Wall-clock time of the provider loop
    pub latency_ms: u64,
    /// Winning provider, absent on fallback
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
}

/// Run the full generation pass for an authenticated user.
///
/// `prompt` and `mode` are already validated; every error returned here
/// happened before the debit, so a non-200 response always means "you were
/// not charged".
pub async fn run_generation(
    state: &AppState,
    user: &AuthUser,
    prompt: &str,
    mode: GenerationMode,
    request_id: &str,
) -> Result<GenerateResponse, ApiError> {
    let cost = state
        .config
        .credit_cost(mode.as_str())
        .unwrap_or(1);

    let db = Arc::new(state.db.clone());

    let entitlements = EntitlementRepository::new(Arc::clone(&db));
    let entitled = match entitlements
        .is_feature_enabled(user.id, GENERATOR_FEATURE)
        .await
    {
        Ok(entitled) => entitled,
        Err(err) => {
            tracing::error!(request_id, user_id = %user.id, error = %err, "Entitlement check failed");
            return Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVER_ERROR",
                "Feature not available",
            ));
        }
    };

    if !entitled {
        tracing::info!(request_id, user_id = %user.id, "Generation rejected: feature not enabled");
        return Err(ErrorCode::FeatureNotEnabled.into());
    }

    tracing::debug!(request_id, user_id = %user.id, "Entitlement check passed");

    let ledger = CreditLedger::new(Arc::clone(&db), state.config.credits.default_balance);
    let debit = match ledger.debit(user.id, cost).await {
        Ok(debit) => debit,
        Err(err) => {
            tracing::error!(request_id, user_id = %user.id, error = %err, "Credit debit failed");
            return Err(ErrorCode::CreditError.into());
        }
    };

    if !debit.success {
        tracing::info!(
            request_id,
            user_id = %user.id,
            balance = debit.new_balance,
            cost,
            "Generation rejected: insufficient credits"
        );
        return Err(ApiError::new(
            StatusCode::PAYMENT_REQUIRED,
            "INSUFFICIENT_CREDITS",
            "Insufficient credits for this mode",
        )
        .with_details(json!({ "required": cost, "balance": debit.new_balance })));
    }

    tracing::debug!(
        request_id,
        user_id = %user.id,
        cost,
        balance = debit.new_balance,
        "Credits debited"
    );

    // Credits are spent from here on; the provider loop cannot fail the
    // request anymore.
    let outcome = state.generation.generate(prompt, mode).await;

    tracing::debug!(
        request_id,
        user_id = %user.id,
        provider = outcome.provider.as_deref().unwrap_or("none"),
        used_fallback = outcome.used_fallback,
        latency_ms = outcome.latency_ms,
        "Generation pass finished"
    );

    let mut credits_remaining = debit.new_balance;
    if outcome.used_fallback && state.config.credits.refund_on_generation_failure {
        match ledger.credit(user.id, cost).await {
            Ok(balance) => {
                tracing::info!(request_id, user_id = %user.id, cost, "Refunded credits after total generation failure");
                credits_remaining = balance;
            }
            Err(err) => {
                tracing::error!(request_id, user_id = %user.id, error = %err, "Refund after generation failure did not apply");
            }
        }
    }

    let request_uuid = Uuid::parse_str(request_id).unwrap_or_else(|_| Uuid::new_v4());
    let materials = MaterialRepository::new(db);
    if let Err(err) = materials
        .append(
            user.id,
            prompt,
            &outcome.material,
            mode.as_str(),
            request_uuid,
        )
        .await
    {
        // Best-effort: the user already has their material and balance.
        tracing::warn!(request_id, user_id = %user.id, error = %err, "Failed to persist generated material");
    } else {
        tracing::debug!(request_id, user_id = %user.id, "Generated material persisted");
    }

    Ok(GenerateResponse {
        ok: true,
        material: outcome.material,
        credits_remaining,
        mode: mode.as_str().to_string(),
        request_id: request_id.to_string(),
        llm_used: !outcome.used_fallback,
        latency_ms: outcome.latency_ms,
        provider: outcome.provider,
    })
}
