//! # Health Check Handler
//!
//! `GET /health` aggregates the configuration state of every external
//! dependency into a single readiness report for monitoring.

use crate::db;
use crate::server::AppState;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;
use utoipa::ToSchema;

/// Full health report
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// "ok", "degraded" or "error"
    pub status: String,
    pub version: String,
    pub profile: String,
    pub components: HealthComponents,
    /// "ready", "degraded" or "error"
    pub readiness: String,
    pub issues: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthComponents {
    pub llm: LlmHealth,
    pub payments: PaymentsHealth,
    pub database: DatabaseHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LlmHealth {
    pub configured: bool,
    pub providers: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentsHealth {
    pub stripe: bool,
    pub mercadopago: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DatabaseHealth {
    pub reachable: bool,
}

/// Aggregated platform health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is ready or degraded", body = HealthResponse),
        (status = 500, description = "Service is not operational", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let mut issues = Vec::new();
    let mut readiness = "ready";

    let providers: Vec<String> = state
        .config
        .llm
        .configured_providers()
        .into_iter()
        .map(str::to_string)
        .collect();
    let llm_configured = !providers.is_empty();

    if !llm_configured {
        issues.push(
            "No LLM API key configured; generation will return fallback material only".to_string(),
        );
        readiness = "degraded";
    }

    let stripe_ready =
        state.config.stripe_secret_key.is_some() && state.config.stripe_webhook_secret.is_some();
    if !stripe_ready {
        issues.push(
            "Stripe not fully configured; need SAM_STRIPE_SECRET_KEY and SAM_STRIPE_WEBHOOK_SECRET"
                .to_string(),
        );
        readiness = "degraded";
    }

    let mercadopago_ready = state.config.mercado_pago_access_token.is_some();
    if !mercadopago_ready {
        issues.push(
            "Mercado Pago not configured (optional); set SAM_MERCADO_PAGO_ACCESS_TOKEN for regional payment support"
                .to_string(),
        );
    }

    let database_reachable = db::health_check(&state.db).await.is_ok();
    if !database_reachable {
        issues.push("Database is unreachable".to_string());
        readiness = "error";
    }

    if !stripe_ready && !mercadopago_ready {
        issues.push("No payment gateway configured; configure Stripe or Mercado Pago".to_string());
        readiness = "error";
    }

    let status = match readiness {
        "ready" => "ok",
        "degraded" => "degraded",
        _ => "error",
    };

    let status_code = if readiness == "error" {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        profile: state.config.profile.clone(),
        components: HealthComponents {
            llm: LlmHealth {
                configured: llm_configured,
                providers,
            },
            payments: PaymentsHealth {
                stripe: stripe_ready,
                mercadopago: mercadopago_ready,
            },
            database: DatabaseHealth {
                reachable: database_reachable,
            },
        },
        readiness: readiness.to_string(),
        issues,
    };

    (status_code, Json(response))
}
