//! # Server Configuration
//!
//! This module contains the server setup and configuration for the SAM API:
//! the shared [`AppState`], the router with its middleware layers, and the
//! OpenAPI document.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::auth::{RemoteSessionVerifier, SessionVerifier, auth_middleware};
use crate::config::AppConfig;
use crate::handlers;
use crate::llm::{GenerationClient, ProviderRegistry};
use crate::telemetry::{self, RequestContext};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub db: DatabaseConnection,
    /// Shared HTTP client for payment gateways and the auth provider
    pub http: reqwest::Client,
    /// External session verification capability
    pub session: Arc<dyn SessionVerifier>,
    /// Provider fallback client, built once from configuration
    pub generation: GenerationClient,
}

impl AppState {
    /// Build production state: remote session verifier and the provider
    /// registry resolved from configuration.
    pub fn new(config: Arc<AppConfig>, db: DatabaseConnection) -> Self {
        let http = reqwest::Client::new();
        let session: Arc<dyn SessionVerifier> = Arc::new(RemoteSessionVerifier::new(
            http.clone(),
            config.auth_base_url.clone(),
            config.auth_anon_key.clone(),
        ));
        let generation =
            GenerationClient::new(http.clone(), Arc::new(ProviderRegistry::from_config(&config)));

        Self {
            config,
            db,
            http,
            session,
            generation,
        }
    }

    /// Minimal state for router-level tests: default config, detached
    /// database handle, empty provider registry, injected verifier.
    pub fn for_tests(session: Arc<dyn SessionVerifier>) -> Self {
        let http = reqwest::Client::new();
        Self {
            config: Arc::new(AppConfig::default()),
            db: DatabaseConnection::default(),
            http: http.clone(),
            session,
            generation: GenerationClient::new(http, Arc::new(ProviderRegistry::default())),
        }
    }
}

/// Middleware assigning every request a correlation id, exposed to
/// handlers through request extensions and task-local storage, and echoed
/// in the `X-Request-ID` response header.
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let context = RequestContext::generate();
    let request_id = context.request_id.clone();

    request.extensions_mut().insert(context.clone());

    let mut response = telemetry::with_request_context(context, next.run(request)).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }

    response
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    // Session-gated routes; /generate authenticates inline so input
    // validation can run before the auth provider is consulted.
    let protected = Router::new()
        .route("/generate/history", get(handlers::generate::history))
        .route("/features/{feature}", get(handlers::features::feature_status))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/generate", post(handlers::generate::generate))
        .route("/checkout", post(handlers::checkout::stripe_checkout))
        .route(
            "/checkout/mercadopago",
            post(handlers::checkout::mercado_pago_checkout),
        )
        .route("/webhooks/stripe", post(handlers::webhooks::stripe_webhook))
        .route(
            "/webhooks/mercadopago",
            post(handlers::webhooks::mercado_pago_webhook),
        )
        .route("/health", get(handlers::health::health))
        .route("/pricing", get(handlers::pricing::pricing))
        .merge(protected)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
}

/// Starts the server with the given configuration
pub async fn run_server(
    config: AppConfig,
    db: DatabaseConnection,
) -> Result<(), Box<dyn std::error::Error>> {
    let addr = config
        .bind_addr()
        .map_err(|e| format!("Invalid server address: {}", e))?;

    let profile = config.profile.clone();
    let state = AppState::new(Arc::new(config), db);
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::generate::generate,
        crate::handlers::generate::history,
        crate::handlers::features::feature_status,
        crate::handlers::checkout::stripe_checkout,
        crate::handlers::checkout::mercado_pago_checkout,
        crate::handlers::webhooks::stripe_webhook,
        crate::handlers::webhooks::mercado_pago_webhook,
        crate::handlers::health::health,
        crate::handlers::pricing::pricing,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::models::generated_material::MaterialHistoryEntry,
            crate::handlers::generate::GenerateRequest,
            crate::handlers::generate::HistoryResponse,
            crate::handlers::features::FeatureStatusResponse,
            crate::handlers::checkout::StripeCheckoutRequest,
            crate::handlers::checkout::MercadoPagoCheckoutRequest,
            crate::handlers::checkout::CheckoutResponse,
            crate::handlers::webhooks::WebhookAck,
            crate::handlers::health::HealthResponse,
            crate::handlers::health::HealthComponents,
            crate::handlers::health::LlmHealth,
            crate::handlers::health::PaymentsHealth,
            crate::handlers::health::DatabaseHealth,
            crate::handlers::pricing::PricingResponse,
            crate::orchestrator::GenerateResponse,
            crate::error::ApiError,
        )
    ),
    info(
        title = "SAM API",
        description = "Credit-gated AI content generation for teachers",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
