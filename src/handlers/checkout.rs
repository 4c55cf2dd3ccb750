//! # Checkout Handlers
//!
//! Thin delegates to the payment gateways' REST APIs. These endpoints are
//! outer surface, not core: they validate configuration, forward one
//! request upstream, and hand the resulting checkout URL back to the
//! frontend for redirect.

use crate::error::ApiError;
use crate::server::AppState;
use axum::{
    extract::{Json, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

/// Request body for `POST /checkout`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct StripeCheckoutRequest {
    /// Stripe price id; falls back to the configured default
    #[serde(rename = "priceId")]
    pub price_id: Option<String>,
}

/// Request body for `POST /checkout/mercadopago`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct MercadoPagoCheckoutRequest {
    /// Plan selector, currently only "MONTHLY"
    #[serde(rename = "planType", default)]
    pub plan_type: Option<String>,
}

/// Checkout session response: URL for the frontend redirect
#[derive(Debug, Serialize, ToSchema)]
pub struct CheckoutResponse {
    pub url: String,
}

/// Create a Stripe subscription checkout session
#[utoipa::path(
    post,
    path = "/checkout",
    request_body = StripeCheckoutRequest,
    responses(
        (status = 200, description = "Checkout session created", body = CheckoutResponse),
        (status = 502, description = "Payment gateway error", body = ApiError),
        (status = 503, description = "Stripe not configured", body = ApiError)
    ),
    tag = "payments"
)]
pub async fn stripe_checkout(
    State(state): State<AppState>,
    payload: Result<Json<StripeCheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let body = payload.map(|Json(body)| body).unwrap_or_default();

    let secret_key = state.config.stripe_secret_key.clone().ok_or_else(|| {
        ApiError::new(
            StatusCode::SERVICE_UNAVAILABLE,
            "PAYMENT_NOT_CONFIGURED",
            "Stripe is not configured",
        )
    })?;

    let price_id = body
        .price_id
        .or_else(|| state.config.stripe_price_id.clone())
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "PAYMENT_NOT_CONFIGURED",
                "No Stripe price configured",
            )
        })?;

    let response = state
        .http
        .post(format!(
            "{}/v1/checkout/sessions",
            state.config.stripe_api_base
        ))
        .bearer_auth(&secret_key)
        .form(&[
            ("mode", "subscription"),
            ("line_items[0][price]", price_id.as_str()),
            ("line_items[0][quantity]", "1"),
            ("success_url", state.config.checkout_success_url.as_str()),
            ("cancel_url", state.config.checkout_cancel_url.as_str()),
        ])
        .send()
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "Stripe checkout request failed");
            payment_error("stripe")
        })?;

    if !response.status().is_success() {
        tracing::error!(status = %response.status(), "Stripe checkout returned error status");
        return Err(payment_error("stripe"));
    }

    let session: serde_json::Value = response.json().await.map_err(|err| {
        tracing::error!(error = %err, "Stripe checkout response was not valid JSON");
        payment_error("stripe")
    })?;

    let url = session
        .get("url")
        .and_then(|url| url.as_str())
        .ok_or_else(|| payment_error("stripe"))?;

    Ok(Json(CheckoutResponse {
        url: url.to_string(),
    }))
}

/// Create a Mercado Pago checkout preference
#[utoipa::path(
    post,
    path = "/checkout/mercadopago",
    request_body = MercadoPagoCheckoutRequest,
    responses(
        (status = 200, description = "Checkout preference created", body = CheckoutResponse),
        (status = 502, description = "Payment gateway error", body = ApiError),
        (status = 503, description = "Mercado Pago not configured", body = ApiError)
    ),
    tag = "payments"
)]
pub async fn mercado_pago_checkout(
    State(state): State<AppState>,
    payload: Result<Json<MercadoPagoCheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let _body = payload.map(|Json(body)| body).unwrap_or_default();

    let token = state
        .config
        .mercado_pago_access_token
        .clone()
        .ok_or_else(|| {
            ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "PAYMENT_NOT_CONFIGURED",
                "Mercado Pago is not configured",
            )
        })?;

    let pricing = &state.config.pricing;
    let early_bird = crate::handlers::pricing::early_bird_active(pricing);
    let (title, price) = if early_bird {
        ("Plan Early Bird - SAM", pricing.early_bird_price_clp)
    } else {
        ("Plan Mensual SAM", pricing.regular_price_clp)
    };

    let preference = json!({
        "items": [{
            "title": title,
            "description": "Acceso mensual a SAM",
            "category_id": "services",
            "quantity": 1,
            "unit_price": price,
            "currency_id": "CLP",
        }],
        "back_urls": {
            "success": state.config.checkout_success_url,
            "failure": state.config.checkout_cancel_url,
        },
        "auto_return": "approved",
    });

    let response = state
        .http
        .post(format!(
            "{}/checkout/preferences",
            state.config.mercado_pago_api_base
        ))
        .bearer_auth(&token)
        .json(&preference)
        .send()
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "Mercado Pago preference request failed");
            payment_error("mercadopago")
        })?;

    if !response.status().is_success() {
        tracing::error!(status = %response.status(), "Mercado Pago returned error status");
        return Err(payment_error("mercadopago"));
    }

    let created: serde_json::Value = response.json().await.map_err(|err| {
        tracing::error!(error = %err, "Mercado Pago response was not valid JSON");
        payment_error("mercadopago")
    })?;

    let url = created
        .get("init_point")
        .and_then(|url| url.as_str())
        .ok_or_else(|| payment_error("mercadopago"))?;

    Ok(Json(CheckoutResponse {
        url: url.to_string(),
    }))
}

fn payment_error(gateway: &str) -> ApiError {
    ApiError::new(
        StatusCode::BAD_GATEWAY,
        "PAYMENT_ERROR",
        "Payment gateway request failed",
    )
    .with_details(json!({ "gateway": gateway }))
}
