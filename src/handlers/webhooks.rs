//! # Payment Webhook Handlers
//!
//! Log-only event intake from the payment gateways. Signature verification
//! and balance top-ups belong to the billing integration; these endpoints
//! acknowledge delivery so the gateways stop retrying.

use axum::extract::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Acknowledgement returned for every accepted webhook delivery
#[derive(Debug, Serialize, ToSchema)]
pub struct WebhookAck {
    pub received: bool,
}

/// Stripe event intake
#[utoipa::path(
    post,
    path = "/webhooks/stripe",
    responses(
        (status = 200, description = "Event received", body = WebhookAck)
    ),
    tag = "webhooks"
)]
pub async fn stripe_webhook(Json(event): Json<serde_json::Value>) -> Json<WebhookAck> {
    let event_type = event
        .get("type")
        .and_then(|value| value.as_str())
        .unwrap_or("unknown");

    tracing::info!(event_type, "Received Stripe webhook event");

    Json(WebhookAck { received: true })
}

/// Mercado Pago event intake
#[utoipa::path(
    post,
    path = "/webhooks/mercadopago",
    responses(
        (status = 200, description = "Event received", body = WebhookAck)
    ),
    tag = "webhooks"
)]
pub async fn mercado_pago_webhook(Json(event): Json<serde_json::Value>) -> Json<WebhookAck> {
    let action = event
        .get("action")
        .or_else(|| event.get("type"))
        .and_then(|value| value.as_str())
        .unwrap_or("unknown");

    tracing::info!(action, "Received Mercado Pago webhook event");

    Json(WebhookAck { received: true })
}
