//! Fallback generation client
//!
//! Walks the registry in priority order, trying each model alias of each
//! eligible provider exactly once. An attempt succeeds iff the HTTP call
//! returns a success status AND the extracted text is non-empty; every
//! other outcome (timeout, non-2xx, malformed or empty body) advances to
//! the next candidate. When the registry is empty or all candidates are
//! exhausted the caller gets a deterministic stub — never an error.

use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, warn};

use super::GenerationMode;
use super::descriptor::AuthScheme;
use super::registry::{ConfiguredProvider, ProviderRegistry};

/// Marker embedded in stub material so clients (and tests) can recognize a
/// degraded response.
pub const FALLBACK_MARKER: &str = "[FALLBACK]";

/// Slack added on top of the summed per-attempt budgets for the umbrella
/// timeout around the whole loop.
const UMBRELLA_SLACK_MS: u64 = 2_000;

/// Deterministic stub returned when no provider produced a completion.
pub fn fallback_material(prompt: &str) -> String {
    let excerpt: String = prompt.chars().take(50).collect();
    format!(
        "{} No fue posible generar el material para: {}... Intenta nuevamente en unos minutos.",
        FALLBACK_MARKER, excerpt
    )
}

/// Result of a full fallback pass. `used_fallback` distinguishes the stub
/// from a genuine completion.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub material: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub used_fallback: bool,
    pub latency_ms: u64,
}

#[derive(Debug, Error)]
enum AttemptError {
    #[error("provider returned status {status}")]
    Http { status: u16 },
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("response body was not valid JSON")]
    Malformed,
    #[error("completion text was empty")]
    EmptyCompletion,
}

/// Client driving the provider fallback loop.
#[derive(Clone)]
pub struct GenerationClient {
    http: reqwest::Client,
    registry: Arc<ProviderRegistry>,
}

impl GenerationClient {
    pub fn new(http: reqwest::Client, registry: Arc<ProviderRegistry>) -> Self {
        Self { http, registry }
    }

    /// Generate text for the prompt at the given mode.
    ///
    /// Infallible by contract: total failure degrades to the stub.
    pub async fn generate(&self, prompt: &str, mode: GenerationMode) -> GenerationOutcome {
        let started = Instant::now();

        if self.registry.is_empty() {
            debug!("No LLM provider configured; short-circuiting to stub");
            return self.stub_outcome(prompt, started);
        }

        // The loop as a whole is bounded by the sum of the per-attempt
        // budgets it could possibly spend, so a misbehaving socket cannot
        // hold the request past its worst-case schedule.
        let umbrella = Duration::from_millis(self.umbrella_budget_ms(mode) + UMBRELLA_SLACK_MS);

        match tokio::time::timeout(umbrella, self.try_candidates(prompt, mode)).await {
            Ok(Some((material, provider, model))) => GenerationOutcome {
                material,
                provider: Some(provider),
                model: Some(model),
                used_fallback: false,
                latency_ms: started.elapsed().as_millis() as u64,
            },
            Ok(None) => {
                warn!("All provider candidates exhausted; returning stub");
                self.stub_outcome(prompt, started)
            }
            Err(_) => {
                warn!("Generation umbrella timeout expired; returning stub");
                self.stub_outcome(prompt, started)
            }
        }
    }

    fn stub_outcome(&self, prompt: &str, started: Instant) -> GenerationOutcome {
        GenerationOutcome {
            material: fallback_material(prompt),
            provider: None,
            model: None,
            used_fallback: true,
            latency_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn umbrella_budget_ms(&self, mode: GenerationMode) -> u64 {
        self.registry
            .eligible()
            .iter()
            .map(|entry| {
                entry.descriptor.budget(mode).timeout_ms * entry.descriptor.models.len() as u64
            })
            .sum()
    }

    async fn try_candidates(
        &self,
        prompt: &str,
        mode: GenerationMode,
    ) -> Option<(String, String, String)> {
        for entry in self.registry.eligible() {
            let budget = entry.descriptor.budget(mode);
            let attempt_timeout = Duration::from_millis(budget.timeout_ms);

            for model in &entry.descriptor.models {
                debug!(
                    provider = %entry.descriptor.name,
                    model = %model,
                    timeout_ms = budget.timeout_ms,
                    "Attempting provider"
                );

                match tokio::time::timeout(
                    attempt_timeout,
                    self.attempt(entry, model, prompt, budget.max_output_tokens),
                )
                .await
                {
                    Ok(Ok(material)) => {
                        debug!(
                            provider = %entry.descriptor.name,
                            model = %model,
                            "Provider returned completion"
                        );
                        return Some((material, entry.descriptor.name.clone(), model.clone()));
                    }
                    Ok(Err(err)) => {
                        warn!(
                            provider = %entry.descriptor.name,
                            model = %model,
                            error = %err,
                            "Provider attempt failed"
                        );
                    }
                    Err(_) => {
                        warn!(
                            provider = %entry.descriptor.name,
                            model = %model,
                            timeout_ms = budget.timeout_ms,
                            "Provider attempt timed out"
                        );
                    }
                }
            }
        }

        None
    }

    async fn attempt(
        &self,
        entry: &ConfiguredProvider,
        model: &str,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, AttemptError> {
        let descriptor = &entry.descriptor;
        let body = descriptor.shape.build_body(model, prompt, max_output_tokens);

        let mut request = self.http.post(descriptor.request_url(model)).json(&body);

        request = match &descriptor.auth {
            AuthScheme::Bearer => request.bearer_auth(&entry.api_key),
            AuthScheme::ApiKeyHeader { header } => request.header(*header, &entry.api_key),
            AuthScheme::QueryParam { param } => {
                request.query(&[(*param, entry.api_key.as_str())])
            }
        };

        for (name, value) in &descriptor.extra_headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError::Http {
                status: status.as_u16(),
            });
        }

        let raw: serde_json::Value = response.json().await.map_err(|_| AttemptError::Malformed)?;

        descriptor
            .shape
            .extract_text(&raw)
            .ok_or(AttemptError::EmptyCompletion)
    }
}
