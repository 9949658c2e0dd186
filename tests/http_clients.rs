// tests/http_clients.rs
//! The reqwest-backed collaborators against mock services: request shape on
//! the way out, error mapping on the way back.

use content2notion::{
    map_record, AudioClip, ContainerId, ContentRecord, FetchError, GeminiClient,
    GenerationApiKey, GenerationError, GenerationPrompt, GenerationService, HttpSourceFetcher,
    ModelId, NotionErrorCode, NotionHttpClient, PageCreateRequest, PersistenceError,
    PropertySchema, SourceFetcher, Transcriber, ValidatedUrl, WorkspaceRepository,
    WorkspaceToken,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MODEL_PATH: &str = "/models/gemini-2.0-flash:generateContent";

fn model() -> ModelId {
    ModelId::new("gemini-2.0-flash").unwrap()
}

fn api_key() -> GenerationApiKey {
    GenerationApiKey::new("gen-key", "generationApiKey").unwrap()
}

fn completion(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

#[tokio::test]
async fn generation_posts_prompt_with_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(header("x-goog-api-key", "gen-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "Write about Rust" }] }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("```json\n{}\n```")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(format!("{}/models", server.uri())).unwrap();
    let raw = client
        .generate(
            &GenerationPrompt::new("Write about Rust".to_string()),
            &model(),
            &api_key(),
        )
        .await
        .unwrap();

    assert_eq!(raw.as_str(), "```json\n{}\n```");
}

#[tokio::test]
async fn generation_error_body_becomes_service_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT"
            }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(format!("{}/models/", server.uri())).unwrap();
    let err = client
        .generate(&GenerationPrompt::new("p".to_string()), &model(), &api_key())
        .await
        .unwrap_err();

    match err {
        GenerationError::Service { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("API key not valid"));
            assert!(message.contains("INVALID_ARGUMENT"));
        }
        other => panic!("expected service error, got {:?}", other),
    }
}

#[tokio::test]
async fn blocked_prompt_is_an_empty_completion() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let client = GeminiClient::new(format!("{}/models", server.uri())).unwrap();
    let err = client
        .generate(&GenerationPrompt::new("p".to_string()), &model(), &api_key())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        GenerationError::EmptyCompletion { reason: Some(ref r) } if r.contains("SAFETY")
    ));
}

#[tokio::test]
async fn transcription_sends_audio_inline() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(MODEL_PATH))
        .and(body_partial_json(json!({
            "contents": [{
                "parts": [
                    {},
                    { "inlineData": { "mimeType": "audio/webm", "data": "AQID" } }
                ]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion("  Hello from a memo.\n")))
        .expect(1)
        .mount(&server)
        .await;

    let client = GeminiClient::new(format!("{}/models", server.uri())).unwrap();
    let audio = AudioClip::new(vec![1, 2, 3], Some("audio/webm")).unwrap();
    let transcript = client.transcribe(&audio, &model(), &api_key()).await.unwrap();

    assert_eq!(transcript.as_str(), "Hello from a memo.");
}

fn token() -> WorkspaceToken {
    WorkspaceToken::new("secret_token", "workspaceToken").unwrap()
}

fn page_request() -> PageCreateRequest {
    let record = ContentRecord {
        title: "Rust in production".to_string(),
        ..ContentRecord::default()
    };
    let container = ContainerId::parse("0123456789abcdef0123456789abcdef").unwrap();
    map_record(&record, &PropertySchema::default(), &container, None)
}

#[tokio::test]
async fn create_page_sends_bearer_and_version() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .and(header("authorization", "Bearer secret_token"))
        .and(header("notion-version", "2022-06-28"))
        .and(body_partial_json(json!({
            "parent": { "database_id": "01234567-89ab-cdef-0123-456789abcdef" },
            "properties": {
                "Name": { "title": [{ "type": "text", "text": { "content": "Rust in production" } }] }
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "url": "https://www.notion.so/Rust-in-production-598337872cf94fdf8782e53db20768a5"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = NotionHttpClient::new(format!("{}/v1", server.uri())).unwrap();
    let page = client.create_page(&page_request(), &token()).await.unwrap();

    assert_eq!(page.id.as_str(), "598337872cf94fdf8782e53db20768a5");
    assert!(page.url.unwrap().ends_with("598337872cf94fdf8782e53db20768a5"));
}

#[tokio::test]
async fn create_page_surfaces_notion_error_code() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "object": "error",
            "status": 401,
            "code": "unauthorized",
            "message": "API token is invalid.",
            "request_id": "7c5b2a1e-0000-4000-8000-000000000000"
        })))
        .mount(&server)
        .await;

    let client = NotionHttpClient::new(format!("{}/v1", server.uri())).unwrap();
    let err = client.create_page(&page_request(), &token()).await.unwrap_err();

    match err {
        PersistenceError::Rejected {
            status,
            code,
            message,
            request_id,
        } => {
            assert_eq!(status, 401);
            assert_eq!(code, NotionErrorCode::Unauthorized);
            assert_eq!(message, "API token is invalid.");
            assert!(request_id.is_some());
        }
        other => panic!("expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn create_page_with_non_notion_error_body_uses_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let client = NotionHttpClient::new(format!("{}/v1", server.uri())).unwrap();
    let err = client.create_page(&page_request(), &token()).await.unwrap_err();

    assert!(matches!(
        err,
        PersistenceError::Rejected { status: 502, .. }
    ));
}

#[tokio::test]
async fn fetcher_returns_body_of_successful_get() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blog/post"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("<article>Ownership, explained.</article>"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpSourceFetcher::new().unwrap();
    let url = ValidatedUrl::parse(&format!("{}/blog/post", server.uri())).unwrap();

    assert_eq!(
        fetcher.fetch(&url).await.unwrap(),
        "<article>Ownership, explained.</article>"
    );
}

#[tokio::test]
async fn fetcher_reports_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = HttpSourceFetcher::new().unwrap();
    let url = ValidatedUrl::parse(&format!("{}/missing", server.uri())).unwrap();

    assert!(matches!(
        fetcher.fetch(&url).await,
        Err(FetchError::Status { status: 404, .. })
    ));
}
