//! # Authentication
//!
//! Session-token authentication for protected API endpoints. Sessions are
//! owned by an external auth provider; this module only extracts the token
//! (bearer header preferred, `sb-token` cookie as the legacy fallback) and
//! resolves it to a user through the injected [`SessionVerifier`].

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap,
        header::{AUTHORIZATION, COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::Response,
};
use axum::http::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::error::{ApiError, invalid_token, no_session};
use crate::server::AppState;

/// Authenticated user resolved from a session token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// Errors from session verification
#[derive(Debug, Error)]
pub enum SessionError {
    /// The token is present but the auth provider rejected it
    #[error("session token rejected")]
    Rejected,
    /// The auth provider could not be consulted
    #[error("auth provider unavailable: {0}")]
    Unavailable(String),
}

/// External session verification capability.
///
/// Production uses [`RemoteSessionVerifier`]; tests inject stubs.
#[async_trait]
pub trait SessionVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, SessionError>;
}

/// Session verifier backed by the configured auth provider's user-info
/// endpoint (`GET {base}/auth/v1/user`).
pub struct RemoteSessionVerifier {
    http: reqwest::Client,
    base_url: String,
    anon_key: Option<String>,
}

impl RemoteSessionVerifier {
    pub fn new(http: reqwest::Client, base_url: String, anon_key: Option<String>) -> Self {
        Self {
            http,
            base_url,
            anon_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

#[async_trait]
impl SessionVerifier for RemoteSessionVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, SessionError> {
        let mut request = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .bearer_auth(token);

        if let Some(ref anon_key) = self.anon_key {
            request = request.header("apikey", anon_key);
        }

        let response = request
            .send()
            .await
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SessionError::Rejected);
        }
        if !status.is_success() {
            return Err(SessionError::Unavailable(format!(
                "auth provider returned status {}",
                status
            )));
        }

        let user: UserInfoResponse = response
            .json()
            .await
            .map_err(|err| SessionError::Unavailable(err.to_string()))?;

        Ok(AuthUser {
            id: user.id,
            email: user.email,
        })
    }
}

/// Extractor for the authenticated user placed in request extensions
#[derive(Debug, Clone)]
pub struct UserExtension(pub AuthUser);

/// Resolve the session token in `headers` to an authenticated user.
///
/// Missing token → 401 NO_SESSION; rejected token → 401 INVALID_TOKEN;
/// verifier infrastructure failure → 500 SERVER_ERROR.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<AuthUser, ApiError> {
    let token =
        extract_session_token(headers).ok_or_else(|| no_session(Some("Missing session token")))?;

    match state.session.verify(&token).await {
        Ok(user) => {
            tracing::debug!(user_id = %user.id, "Authenticated session");
            Ok(user)
        }
        Err(SessionError::Rejected) => Err(invalid_token(None)),
        Err(SessionError::Unavailable(reason)) => {
            tracing::error!(reason = %reason, "Session verification unavailable");
            Err(ApiError::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "SERVER_ERROR",
                "Session verification unavailable",
            ))
        }
    }
}

/// Authentication middleware for session-protected routes. No downstream
/// component runs when authentication fails.
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(&state, request.headers()).await?;

    let mut request = request;
    request.extensions_mut().insert(UserExtension(user));

    Ok(next.run(request).await)
}

/// Pull the session token from `Authorization: Bearer` or the legacy
/// `sb-token` cookie.
fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get(AUTHORIZATION)
        && let Ok(header) = value.to_str()
        && let Some(token) = header.strip_prefix("Bearer ")
        && !token.is_empty()
    {
        return Some(token.to_string());
    }

    let cookies = headers.get(COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == "sb-token" && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

impl<S> FromRequestParts<S> for UserExtension
where
    S: Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<UserExtension>()
            .cloned()
            .ok_or_else(|| no_session(Some("Session context missing")))
    }
}

/// Stub verifier accepting a fixed token → user mapping (test helper).
pub struct StaticSessionVerifier {
    accepted: Vec<(String, AuthUser)>,
}

impl StaticSessionVerifier {
    pub fn new(accepted: Vec<(String, AuthUser)>) -> Self {
        Self { accepted }
    }

    pub fn single(token: &str, user_id: Uuid) -> Self {
        Self::new(vec![(
            token.to_string(),
            AuthUser {
                id: user_id,
                email: None,
            },
        )])
    }
}

#[async_trait]
impl SessionVerifier for StaticSessionVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, SessionError> {
        self.accepted
            .iter()
            .find(|(accepted, _)| accepted == token)
            .map(|(_, user)| user.clone())
            .ok_or(SessionError::Rejected)
    }
}
