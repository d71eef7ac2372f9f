//! Paper discovery tests against a mocked Gemini API.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quantum_archives::adapters::PaperDiscovery;
use quantum_archives::client::{GeminiClient, GenerativeModel};
use quantum_archives::config::Config;
use quantum_archives::error::{AdapterError, ClientError, PayloadError};
use quantum_archives::models::Physicist;

const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn setup_discovery(mock_server: &MockServer) -> PaperDiscovery {
    let config = Config::for_testing(&mock_server.uri());
    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(config).unwrap());
    PaperDiscovery::new(model)
}

/// A generateContent response whose first candidate carries `text`.
fn gemini_text(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }],
        "modelVersion": "gemini-2.5-flash"
    })
}

fn dirac_papers() -> serde_json::Value {
    json!([
        {
            "title": "The Quantum Theory of the Electron",
            "year": 1928,
            "description": "Introduces the Dirac equation."
        },
        {
            "title": "The Principles of Quantum Mechanics",
            "year": 1930,
            "description": "Foundational textbook."
        }
    ])
}

// =============================================================================
// Successful discovery
// =============================================================================

#[tokio::test]
async fn test_discover_returns_validated_papers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text(&dirac_papers().to_string())))
        .expect(1)
        .mount(&mock_server)
        .await;

    let papers = setup_discovery(&mock_server).discover(Physicist::Dirac).await;

    assert_eq!(papers.len(), 2);
    assert_eq!(papers[0].title, "The Quantum Theory of the Electron");
    assert_eq!(papers[0].year, 1928);
    assert_eq!(papers[1].description, "Foundational textbook.");
}

#[tokio::test]
async fn test_discover_accepts_fenced_payload() {
    let mock_server = MockServer::start().await;
    let fenced = format!("```json\n{}\n```", dirac_papers());

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text(&fenced)))
        .mount(&mock_server)
        .await;

    let papers = setup_discovery(&mock_server).discover(Physicist::Dirac).await;
    assert_eq!(papers.len(), 2);
}

#[tokio::test]
async fn test_discover_sends_schema_constrained_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({
            "generationConfig": {
                "responseMimeType": "application/json",
                "temperature": 0.3,
                "responseSchema": {
                    "type": "ARRAY",
                    "items": { "required": ["title", "year", "description"] }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("[]")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let papers = setup_discovery(&mock_server).discover(Physicist::Heisenberg).await;
    assert!(papers.is_empty());

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("List 6 of the most significant"));
    assert!(prompt.contains("Werner Heisenberg"));
    assert_eq!(body["contents"][0]["role"], "user");
    assert!(body.get("tools").is_none());
}

#[tokio::test]
async fn test_discover_honours_paper_count() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("[]")))
        .mount(&mock_server)
        .await;

    let discovery = setup_discovery(&mock_server).with_paper_count(3);
    discovery.discover(Physicist::Schrodinger).await;

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let prompt = body["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.starts_with("List 3 of"));
    assert!(prompt.contains("Erwin Schrödinger"));
}

// =============================================================================
// Degraded results
// =============================================================================

#[tokio::test]
async fn test_discover_empty_candidates_yields_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&mock_server)
        .await;

    let discovery = setup_discovery(&mock_server);
    assert!(discovery.discover(Physicist::Pauli).await.is_empty());
    assert!(matches!(
        discovery.try_discover(Physicist::Pauli).await,
        Err(AdapterError::EmptyResponse)
    ));
}

#[tokio::test]
async fn test_discover_malformed_json_yields_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text("[{\"title\": ")))
        .mount(&mock_server)
        .await;

    let discovery = setup_discovery(&mock_server);
    assert!(discovery.discover(Physicist::Pauli).await.is_empty());
    assert!(matches!(
        discovery.try_discover(Physicist::Pauli).await,
        Err(AdapterError::Payload(PayloadError::InvalidJson(_)))
    ));
}

#[tokio::test]
async fn test_discover_rejects_payload_with_missing_field() {
    let mock_server = MockServer::start().await;
    let payload = json!([
        { "title": "Exclusion principle", "year": 1925, "description": "Pauli exclusion." },
        { "title": "No year here", "description": "Broken element." }
    ]);

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_text(&payload.to_string())))
        .mount(&mock_server)
        .await;

    let discovery = setup_discovery(&mock_server);
    assert!(discovery.discover(Physicist::Pauli).await.is_empty());

    match discovery.try_discover(Physicist::Pauli).await {
        Err(AdapterError::Payload(PayloadError::MissingField { index, field })) => {
            assert_eq!(index, 1);
            assert_eq!(field, "year");
        }
        other => panic!("expected missing field, got {other:?}"),
    }
}

#[tokio::test]
async fn test_discover_server_error_yields_empty_list() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend unavailable"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let discovery = setup_discovery(&mock_server);
    assert!(discovery.discover(Physicist::Dirac).await.is_empty());
}

#[tokio::test]
async fn test_try_discover_surfaces_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = setup_discovery(&mock_server).try_discover(Physicist::Dirac).await;
    match result {
        Err(AdapterError::Client(err @ ClientError::RateLimited { .. })) => {
            assert_eq!(err.retry_after(), Some(std::time::Duration::from_secs(12)));
        }
        other => panic!("expected rate limit, got {other:?}"),
    }
}

#[tokio::test]
async fn test_discover_unreachable_server_yields_empty_list() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let config = Config::for_testing(&uri);
    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(config).unwrap());
    let papers = PaperDiscovery::new(model).discover(Physicist::Heisenberg).await;

    assert!(papers.is_empty());
}
