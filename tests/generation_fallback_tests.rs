//! Integration tests for the provider fallback loop, driven by wiremock
//! doubles standing in for the upstream LLM APIs.

use std::sync::Arc;
use std::time::Duration;

use sam_api::llm::{
    AuthScheme, ConfiguredProvider, FALLBACK_MARKER, GenerationClient, GenerationMode, ModeBudget,
    ModeBudgets, ProviderDescriptor, ProviderRegistry, ResponseShape,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Budgets small enough that timeout paths run in test time.
fn fast_budgets() -> ModeBudgets {
    let budget = ModeBudget {
        max_output_tokens: 100,
        timeout_ms: 500,
    };
    ModeBudgets {
        basic: budget,
        advanced: budget,
        premium: budget,
    }
}

fn test_provider(name: &str, base: &str, models: &[&str]) -> ConfiguredProvider {
    ConfiguredProvider {
        descriptor: ProviderDescriptor {
            name: name.to_string(),
            endpoint_base: base.to_string(),
            auth: AuthScheme::Bearer,
            extra_headers: Vec::new(),
            models: models.iter().map(|m| m.to_string()).collect(),
            shape: ResponseShape::OpenAiChat,
            budgets: fast_budgets(),
        },
        api_key: "test-key".to_string(),
    }
}

fn completion(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "choices": [{ "message": { "role": "assistant", "content": text } }]
    }))
}

fn client_for(providers: Vec<ConfiguredProvider>) -> GenerationClient {
    GenerationClient::new(
        reqwest::Client::new(),
        Arc::new(ProviderRegistry::new(providers)),
    )
}

#[tokio::test]
async fn failing_provider_falls_back_to_next() {
    let server_a = MockServer::start().await;
    let server_b = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server_a)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(completion("Material desde B"))
        .mount(&server_b)
        .await;

    let client = client_for(vec![
        test_provider("provider-a", &server_a.uri(), &["model-a"]),
        test_provider("provider-b", &server_b.uri(), &["model-b"]),
    ]);

    let outcome = client.generate("plan de clase", GenerationMode::Basic).await;

    assert!(!outcome.used_fallback);
    assert_eq!(outcome.material, "Material desde B");
    assert_eq!(outcome.provider.as_deref(), Some("provider-b"));
    assert_eq!(outcome.model.as_deref(), Some("model-b"));
}

#[tokio::test]
async fn first_success_short_circuits_remaining_providers() {
    let server_a = MockServer::start().await;
    let server_b = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .respond_with(completion("Material desde A"))
        .expect(1)
        .mount(&server_a)
        .await;

    Mock::given(method("POST"))
        .respond_with(completion("Material desde B"))
        .expect(0)
        .mount(&server_b)
        .await;

    let client = client_for(vec![
        test_provider("provider-a", &server_a.uri(), &["model-a"]),
        test_provider("provider-b", &server_b.uri(), &["model-b"]),
    ]);

    let outcome = client.generate("prueba", GenerationMode::Basic).await;

    assert_eq!(outcome.provider.as_deref(), Some("provider-a"));
    assert_eq!(outcome.material, "Material desde A");
}

#[tokio::test]
async fn empty_completion_counts_as_failure() {
    let server_a = MockServer::start().await;
    let server_b = MockServer::start().await;

    // HTTP 200 with whitespace-only text must not win.
    Mock::given(method("POST"))
        .respond_with(completion("   "))
        .mount(&server_a)
        .await;

    Mock::given(method("POST"))
        .respond_with(completion("Material real"))
        .mount(&server_b)
        .await;

    let client = client_for(vec![
        test_provider("provider-a", &server_a.uri(), &["model-a"]),
        test_provider("provider-b", &server_b.uri(), &["model-b"]),
    ]);

    let outcome = client.generate("prueba", GenerationMode::Basic).await;

    assert_eq!(outcome.provider.as_deref(), Some("provider-b"));
    assert_eq!(outcome.material, "Material real");
}

#[tokio::test]
async fn model_aliases_tried_in_listed_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "model": "model-1" })))
        .respond_with(ResponseTemplate::new(429))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "model": "model-2" })))
        .respond_with(completion("Material del alias secundario"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(vec![test_provider(
        "provider-a",
        &server.uri(),
        &["model-1", "model-2"],
    )]);

    let outcome = client.generate("prueba", GenerationMode::Basic).await;

    assert!(!outcome.used_fallback);
    assert_eq!(outcome.provider.as_deref(), Some("provider-a"));
    assert_eq!(outcome.model.as_deref(), Some("model-2"));
}

#[tokio::test]
async fn slow_provider_times_out_and_falls_back() {
    let server_a = MockServer::start().await;
    let server_b = MockServer::start().await;

    // Longer than the 500ms attempt budget; the attempt is aborted, not
    // retried.
    Mock::given(method("POST"))
        .respond_with(completion("demasiado tarde").set_delay(Duration::from_secs(3)))
        .mount(&server_a)
        .await;

    Mock::given(method("POST"))
        .respond_with(completion("Material a tiempo"))
        .mount(&server_b)
        .await;

    let client = client_for(vec![
        test_provider("provider-a", &server_a.uri(), &["model-a"]),
        test_provider("provider-b", &server_b.uri(), &["model-b"]),
    ]);

    let outcome = client.generate("prueba", GenerationMode::Basic).await;

    assert_eq!(outcome.provider.as_deref(), Some("provider-b"));
    assert_eq!(outcome.material, "Material a tiempo");
}

#[tokio::test]
async fn exhausted_candidates_return_labeled_stub() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = client_for(vec![
        test_provider("provider-a", &server.uri(), &["model-a"]),
        test_provider("provider-b", &server.uri(), &["model-b"]),
    ]);

    let outcome = client
        .generate("plan de clase sobre fotosíntesis", GenerationMode::Basic)
        .await;

    assert!(outcome.used_fallback);
    assert!(outcome.material.contains(FALLBACK_MARKER));
    assert!(outcome.material.contains("plan de clase"));
    assert_eq!(outcome.provider, None);
    assert_eq!(outcome.model, None);
}

#[tokio::test]
async fn no_configured_provider_makes_no_network_calls() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(completion("nunca"))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(Vec::new());

    let outcome = client.generate("prueba", GenerationMode::Basic).await;

    assert!(outcome.used_fallback);
    assert!(outcome.material.contains(FALLBACK_MARKER));

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}
