// tests/end_to_end.rs
//! A full run through the HTTP collaborators: blog fetch, generation and
//! page creation all answered by mock servers.

use content2notion::notion::PropertyValue;
use content2notion::{
    CredentialInput, GeminiClient, HttpSourceFetcher, ModelId, NotionHttpClient,
    PageCreateRequest, Pipeline, PipelineRequest, PipelineStage,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COMPLETION: &str = "```json\n{\n  \"Title\": \"Fearless concurrency\",\n  \"Summary\": \"Threads without data races.\",\n  \"Facebook\": {\"Caption\": \"Rust threads\", \"Tags\": [\"rust\", \"concurrency\"], \"Hashtags\": [\"#rustlang\"]},\n  \"YouTube\": {\"Description\": \"A walkthrough\"},\n  \"ReelScript\": \"Hook: no more data races.\"\n}\n```";

struct Services {
    blog: MockServer,
    gemini: MockServer,
    notion: MockServer,
}

impl Services {
    async fn start() -> Self {
        Self {
            blog: MockServer::start().await,
            gemini: MockServer::start().await,
            notion: MockServer::start().await,
        }
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline::new(
            Arc::new(HttpSourceFetcher::new().unwrap()),
            Arc::new(GeminiClient::new(format!("{}/models", self.gemini.uri())).unwrap()),
            Arc::new(NotionHttpClient::new(format!("{}/v1", self.notion.uri())).unwrap()),
            ModelId::new("gemini-2.0-flash").unwrap(),
        )
    }

    fn request(&self, content: String) -> PipelineRequest {
        PipelineRequest::new(
            content,
            CredentialInput {
                generation_api_key: "gen-key".to_string(),
                workspace_token: "secret_token".to_string(),
                workspace_container_id: "0123456789abcdef0123456789abcdef".to_string(),
            },
        )
    }

    async fn answer_generation(&self) {
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.0-flash:generateContent"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{ "content": { "parts": [{ "text": COMPLETION }] } }]
            })))
            .expect(1)
            .mount(&self.gemini)
            .await;
    }
}

#[tokio::test]
async fn blog_post_is_filed_as_a_page() {
    let services = Services::start().await;

    Mock::given(method("GET"))
        .and(path("/2024/fearless-concurrency"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Fearless concurrency</h1>"))
        .expect(1)
        .mount(&services.blog)
        .await;
    services.answer_generation().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "page",
            "id": "59833787-2cf9-4fdf-8782-e53db20768a5",
            "url": "https://www.notion.so/598337872cf94fdf8782e53db20768a5"
        })))
        .expect(1)
        .mount(&services.notion)
        .await;

    let post_url = format!("{}/2024/fearless-concurrency", services.blog.uri());
    let outcome = services
        .pipeline()
        .run(&services.request(post_url.clone()))
        .await
        .unwrap();

    assert_eq!(outcome.record.title, "Fearless concurrency");
    assert_eq!(outcome.page.id.as_str(), "598337872cf94fdf8782e53db20768a5");

    let prompt_requests = services.gemini.received_requests().await.unwrap();
    let prompt: Value = prompt_requests[0].body_json().unwrap();
    assert!(prompt["contents"][0]["parts"][0]["text"]
        .as_str()
        .unwrap()
        .contains("<h1>Fearless concurrency</h1>"));

    let page_requests = services.notion.received_requests().await.unwrap();
    let mut page: PageCreateRequest = page_requests[0].body_json().unwrap();
    assert_eq!(
        page.properties["URL"],
        PropertyValue::Url(Some(post_url))
    );
    assert!(page.children[0].plain_text().contains("\"Fearless concurrency\""));

    // The mock server's port changes between runs
    page.properties.insert(
        "URL".to_string(),
        PropertyValue::Url(Some("<blog url>".to_string())),
    );
    page.children.clear();

    insta::assert_json_snapshot!(page, @r###"
    {
      "parent": {
        "database_id": "01234567-89ab-cdef-0123-456789abcdef"
      },
      "properties": {
        "Name": {
          "title": [
            {
              "type": "text",
              "text": {
                "content": "Fearless concurrency"
              }
            }
          ]
        },
        "URL": {
          "url": "<blog url>"
        },
        "Title": {
          "rich_text": [
            {
              "type": "text",
              "text": {
                "content": "Fearless concurrency"
              }
            }
          ]
        },
        "Summary": {
          "rich_text": [
            {
              "type": "text",
              "text": {
                "content": "Threads without data races."
              }
            }
          ]
        },
        "Facebook": {
          "rich_text": [
            {
              "type": "text",
              "text": {
                "content": "Rust threads"
              }
            }
          ]
        },
        "LinkedIn": {
          "rich_text": [
            {
              "type": "text",
              "text": {
                "content": ""
              }
            }
          ]
        },
        "Threads": {
          "rich_text": [
            {
              "type": "text",
              "text": {
                "content": ""
              }
            }
          ]
        },
        "YouTube": {
          "rich_text": [
            {
              "type": "text",
              "text": {
                "content": "A walkthrough"
              }
            }
          ]
        },
        "Instagram": {
          "rich_text": [
            {
              "type": "text",
              "text": {
                "content": ""
              }
            }
          ]
        },
        "ReelScript": {
          "rich_text": [
            {
              "type": "text",
              "text": {
                "content": "Hook: no more data races."
              }
            }
          ]
        }
      },
      "children": []
    }
    "###);
}

#[tokio::test]
async fn unreachable_post_stops_before_generation() {
    let services = Services::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&services.blog)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&services.gemini)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&services.notion)
        .await;

    let err = services
        .pipeline()
        .run(&services.request(format!("{}/gone", services.blog.uri())))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), PipelineStage::Acquiring);
    assert_eq!(err.kind(), "FetchError");
}

#[tokio::test]
async fn unknown_database_is_a_persistence_error() {
    let services = Services::start().await;

    services.answer_generation().await;
    Mock::given(method("POST"))
        .and(path("/v1/pages"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "object": "error",
            "status": 404,
            "code": "object_not_found",
            "message": "Could not find database with ID: 01234567-89ab-cdef-0123-456789abcdef."
        })))
        .expect(1)
        .mount(&services.notion)
        .await;

    let err = services
        .pipeline()
        .run(&services.request("A dictated memo about ownership.".to_string()))
        .await
        .unwrap_err();

    assert_eq!(err.stage(), PipelineStage::Persisting);
    assert_eq!(err.http_status(), 500);
    assert!(err.to_string().contains("Could not find database"));
}
