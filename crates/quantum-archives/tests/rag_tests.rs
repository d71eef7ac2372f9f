//! Grounded chat tests against a mocked Gemini API.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quantum_archives::adapters::RagResponder;
use quantum_archives::adapters::rag::{ARCHIVE_ERROR_TEXT, NO_RESPONSE_TEXT};
use quantum_archives::client::{GeminiClient, GenerativeModel};
use quantum_archives::config::Config;
use quantum_archives::models::{ChatMessage, GroundingSource, Paper, PaperDraft, Physicist};

const ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

fn setup_responder(mock_server: &MockServer) -> RagResponder {
    let config = Config::for_testing(&mock_server.uri());
    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(config).unwrap());
    RagResponder::new(model)
}

fn gemini_answer(text: &str, chunks: serde_json::Value) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP",
            "groundingMetadata": {
                "groundingChunks": chunks,
                "webSearchQueries": ["dirac equation 1928"]
            }
        }]
    })
}

fn collected_paper() -> Paper {
    PaperDraft {
        title: "The Quantum Theory of the Electron".to_string(),
        year: 1928,
        description: "Introduces the Dirac equation.".to_string(),
    }
    .into_paper("dirac-1", Physicist::Dirac)
}

fn alternating_history(count: usize) -> Vec<ChatMessage> {
    (0..count)
        .map(|i| {
            if i % 2 == 0 {
                ChatMessage::user(format!("u{i}"), format!("message {i}"))
            } else {
                ChatMessage::model(format!("m{i}"), format!("message {i}"), Vec::new())
            }
        })
        .collect()
}

async fn request_body(mock_server: &MockServer) -> serde_json::Value {
    let requests = mock_server.received_requests().await.unwrap();
    serde_json::from_slice(&requests[0].body).unwrap()
}

// =============================================================================
// Answers
// =============================================================================

#[tokio::test]
async fn test_answer_with_empty_collection_is_non_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_answer("Hello! Your library is empty so far.", json!([]))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let answer = setup_responder(&mock_server).answer(&[], &[], "hello").await;

    assert!(!answer.text.is_empty());
    assert!(answer.sources.is_empty());

    let body = request_body(&mock_server).await;
    assert_eq!(body["contents"].as_array().unwrap().len(), 1);
    assert_eq!(body["contents"][0]["parts"][0]["text"], "hello");
}

#[tokio::test]
async fn test_answer_embeds_collection_and_search_tool() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(body_partial_json(json!({ "tools": [{ "googleSearch": {} }] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer("Yes.", json!([]))))
        .expect(1)
        .mount(&mock_server)
        .await;

    setup_responder(&mock_server)
        .answer(&[], &[collected_paper()], "Tell me about the Dirac equation")
        .await;

    let body = request_body(&mock_server).await;
    let instruction = body["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
    assert!(instruction.contains(
        "- \"The Quantum Theory of the Electron\" (1928) by Paul Dirac: Introduces the Dirac equation."
    ));
    assert!(instruction.contains("Use the Google Search tool"));
}

#[tokio::test]
async fn test_history_truncated_to_six_messages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer("Sure.", json!([]))))
        .mount(&mock_server)
        .await;

    let history = alternating_history(10);
    setup_responder(&mock_server).answer(&history, &[], "and then?").await;

    let body = request_body(&mock_server).await;
    let contents = body["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 7);
    assert_eq!(contents[0]["parts"][0]["text"], "message 4");
    assert_eq!(contents[0]["role"], "user");
    assert_eq!(contents[5]["parts"][0]["text"], "message 9");
    assert_eq!(contents[5]["role"], "model");
    assert_eq!(contents[6]["parts"][0]["text"], "and then?");
}

#[tokio::test]
async fn test_thinking_placeholders_are_not_forwarded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer("Ok.", json!([]))))
        .mount(&mock_server)
        .await;

    let mut history = alternating_history(2);
    history.push(ChatMessage::thinking("t1"));
    setup_responder(&mock_server).answer(&history, &[], "next").await;

    let body = request_body(&mock_server).await;
    let texts: Vec<&str> = body["contents"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["parts"][0]["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["message 0", "message 1", "next"]);
}

#[tokio::test]
async fn test_grounding_sources_keep_complete_chunks_in_order() {
    let mock_server = MockServer::start().await;
    let chunks = json!([
        { "web": { "uri": "https://royalsocietypublishing.org/doi/10.1098/rspa.1928.0023", "title": "Royal Society" } },
        { "web": { "uri": "https://example.org/no-title" } },
        { "web": { "title": "No link" } },
        {},
        { "web": { "uri": "https://en.wikipedia.org/wiki/Dirac_equation", "title": "Dirac equation" } }
    ]);

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_answer("It predicted antimatter.", chunks)),
        )
        .mount(&mock_server)
        .await;

    let answer = setup_responder(&mock_server)
        .answer(&[], &[collected_paper()], "What did it predict?")
        .await;

    assert_eq!(answer.text, "It predicted antimatter.");
    assert_eq!(
        answer.sources,
        vec![
            GroundingSource {
                title: "Royal Society".to_string(),
                uri: "https://royalsocietypublishing.org/doi/10.1098/rspa.1928.0023".to_string(),
            },
            GroundingSource {
                title: "Dirac equation".to_string(),
                uri: "https://en.wikipedia.org/wiki/Dirac_equation".to_string(),
            },
        ]
    );
}

// =============================================================================
// Fallbacks
// =============================================================================

#[tokio::test]
async fn test_missing_text_uses_fallback() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&mock_server)
        .await;

    let answer = setup_responder(&mock_server).answer(&[], &[], "hello").await;
    assert_eq!(answer.text, NO_RESPONSE_TEXT);
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn test_server_error_yields_archive_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let answer = setup_responder(&mock_server).answer(&[], &[], "hello").await;
    assert_eq!(answer.text, ARCHIVE_ERROR_TEXT);
    assert!(answer.sources.is_empty());
}

#[tokio::test]
async fn test_unauthorized_yields_archive_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&mock_server)
        .await;

    let responder = setup_responder(&mock_server);
    assert_eq!(responder.answer(&[], &[], "hello").await.text, ARCHIVE_ERROR_TEXT);
    assert!(responder.try_answer(&[], &[], "hello").await.is_err());
}

#[tokio::test]
async fn test_network_failure_yields_archive_error() {
    let mock_server = MockServer::start().await;
    let uri = mock_server.uri();
    drop(mock_server);

    let config = Config::for_testing(&uri);
    let model: Arc<dyn GenerativeModel> = Arc::new(GeminiClient::new(config).unwrap());
    let answer = RagResponder::new(model).answer(&[], &[], "hello").await;

    assert_eq!(answer.text, ARCHIVE_ERROR_TEXT);
    assert!(answer.sources.is_empty());
}
