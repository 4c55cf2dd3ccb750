//! # Error Handling
//!
//! This module provides unified error handling for the SAM API, implementing
//! a consistent problem+json response format with request ID propagation.
//!
//! The error taxonomy distinguishes pre-debit rejections (4xx/5xx, no credits
//! spent) from post-debit degradation, which is never surfaced as an HTTP
//! error: once the debit succeeded the client always gets a 200 with either
//! real or fallback material.

use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::telemetry;

/// Unified API error response structure
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ApiError {
    /// HTTP status code for the response
    #[serde(skip_serializing, skip_deserializing)]
    pub status: StatusCode,
    /// Error code for programmatic handling
    pub code: Box<str>,
    /// Human-readable error message
    pub message: Box<str>,
    /// Additional error details (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Box<serde_json::Value>>,
    /// Correlation request ID for debugging (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<Box<str>>,
}

impl ApiError {
    /// Create a new API error with the given status code and message
    pub fn new<S: Into<String>>(status: StatusCode, code: S, message: S) -> Self {
        Self {
            status,
            code: code.into().into_boxed_str(),
            message: message.into().into_boxed_str(),
            details: None,
            request_id: Self::current_request_id(),
        }
    }

    /// Add details to the error
    pub fn with_details<V: Into<serde_json::Value>>(mut self, details: V) -> Self {
        self.details = Some(Box::new(details.into()));
        self
    }

    /// Extract the request ID from the active request scope (falls back to a generated one)
    fn current_request_id() -> Option<Box<str>> {
        telemetry::current_request_id()
            .map(|request_id| request_id.into_boxed_str())
            .or_else(|| {
                // Fallback: generate a correlation ID for basic client-server log correlation
                Some(format!("corr-{}", &uuid::Uuid::new_v4().to_string()[..8]).into_boxed_str())
            })
    }
}

/// Stable error codes surfaced in the `code` field (SCREAMING_SNAKE_CASE)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ErrorCode {
    #[error("Unrecognized generation mode")]
    InvalidMode,
    #[error("Prompt is required")]
    InvalidPrompt,
    #[error("Authentication required")]
    NoSession,
    #[error("Invalid session token")]
    InvalidToken,
    #[error("Feature not enabled")]
    FeatureNotEnabled,
    #[error("Insufficient credits")]
    InsufficientCredits,
    #[error("Credit ledger unavailable")]
    CreditError,
    #[error("Payment gateway error")]
    PaymentError,
    #[error("An internal error occurred")]
    ServerError,
}

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidMode | ErrorCode::InvalidPrompt => StatusCode::BAD_REQUEST,
            ErrorCode::NoSession | ErrorCode::InvalidToken => StatusCode::UNAUTHORIZED,
            ErrorCode::FeatureNotEnabled => StatusCode::FORBIDDEN,
            ErrorCode::InsufficientCredits => StatusCode::PAYMENT_REQUIRED,
            ErrorCode::CreditError | ErrorCode::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::PaymentError => StatusCode::BAD_GATEWAY,
        }
    }

    /// Get the wire string for this error code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidMode => "INVALID_MODE",
            ErrorCode::InvalidPrompt => "INVALID_PROMPT",
            ErrorCode::NoSession => "NO_SESSION",
            ErrorCode::InvalidToken => "INVALID_TOKEN",
            ErrorCode::FeatureNotEnabled => "FEATURE_NOT_ENABLED",
            ErrorCode::InsufficientCredits => "INSUFFICIENT_CREDITS",
            ErrorCode::CreditError => "CREDIT_ERROR",
            ErrorCode::PaymentError => "PAYMENT_ERROR",
            ErrorCode::ServerError => "SERVER_ERROR",
        }
    }
}

impl From<ErrorCode> for ApiError {
    fn from(code: ErrorCode) -> Self {
        Self::new(code.status_code(), code.as_str(), &code.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert(
            "content-type",
            HeaderValue::from_static("application/problem+json"),
        );

        if let Some(ref request_id) = self.request_id
            && let Ok(header_value) = HeaderValue::from_str(request_id)
        {
            headers.insert("x-request-id", header_value);
        }

        (self.status, headers, axum::Json(self)).into_response()
    }
}

// Error mappers for common sources

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        // Log the full error for debugging
        tracing::error!("Internal error: {:?}", error);

        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "SERVER_ERROR",
            "An internal error occurred",
        )
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let message = match rejection {
            JsonRejection::JsonDataError(err) => format!("Invalid JSON: {}", err),
            JsonRejection::JsonSyntaxError(err) => format!("JSON syntax error: {}", err),
            JsonRejection::MissingJsonContentType(_) => {
                "Missing 'Content-Type: application/json' header".to_string()
            }
            _ => "Invalid request body".to_string(),
        };

        Self::new(StatusCode::BAD_REQUEST, "INVALID_PROMPT", &message)
    }
}

impl From<sea_orm::DbErr> for ApiError {
    fn from(error: sea_orm::DbErr) -> Self {
        match error {
            sea_orm::DbErr::Conn(connection_err) => {
                tracing::error!("Database connection error: {:?}", connection_err);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    "Database service unavailable",
                )
            }
            _ => {
                tracing::error!("Database error: {:?}", error);
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "SERVER_ERROR",
                    "Database error occurred",
                )
            }
        }
    }
}

/// Create an unauthorized error (401) with the `NO_SESSION` code
pub fn no_session(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Authentication required");
    ApiError::new(StatusCode::UNAUTHORIZED, "NO_SESSION", msg)
}

/// Create an unauthorized error (401) with the `INVALID_TOKEN` code
pub fn invalid_token(message: Option<&str>) -> ApiError {
    let msg = message.unwrap_or("Invalid session token");
    ApiError::new(StatusCode::UNAUTHORIZED, "INVALID_TOKEN", msg)
}
