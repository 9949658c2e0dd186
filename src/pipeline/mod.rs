// src/pipeline/mod.rs
//! The content pipeline: acquire, prompt, generate, validate, persist.
//!
//! Stages run strictly in sequence, each at most once. The first failure
//! ends the run and is reported tagged with its stage; nothing is retried
//! and nothing partial is written.

mod request;

pub use request::{CredentialInput, Credentials, PipelineRequest, ValidatedRequest};

use crate::api::GenerationService;
use crate::error::PipelineError;
use crate::model::{parse_completion, ContentRecord};
use crate::notion::{persist, CreatedPage, PersistTarget, PropertySchema, WorkspaceRepository};
use crate::prompt::build_prompt;
use crate::source::{acquire, ContentRef, SourceFetcher};
use crate::types::ModelId;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Where a run is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PipelineStage {
    Idle,
    Acquiring,
    Generating,
    Validating,
    Persisting,
    Done,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "Idle",
            Self::Acquiring => "Acquiring",
            Self::Generating => "Generating",
            Self::Validating => "Validating",
            Self::Persisting => "Persisting",
            Self::Done => "Done",
        };
        f.write_str(name)
    }
}

/// A completed run: the record that was filed and the page it became.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub record: ContentRecord,
    pub page: CreatedPage,
}

/// The collaborators and settings shared by every run.
///
/// Holds no per-request state; clone it freely across concurrent callers.
#[derive(Clone)]
pub struct Pipeline {
    fetcher: Arc<dyn SourceFetcher>,
    generator: Arc<dyn GenerationService>,
    workspace: Arc<dyn WorkspaceRepository>,
    default_model: ModelId,
    schema: Arc<PropertySchema>,
}

impl Pipeline {
    pub fn new(
        fetcher: Arc<dyn SourceFetcher>,
        generator: Arc<dyn GenerationService>,
        workspace: Arc<dyn WorkspaceRepository>,
        default_model: ModelId,
    ) -> Self {
        Self {
            fetcher,
            generator,
            workspace,
            default_model,
            schema: Arc::new(PropertySchema::default()),
        }
    }

    pub fn with_schema(mut self, schema: PropertySchema) -> Self {
        self.schema = Arc::new(schema);
        self
    }

    pub fn default_model(&self) -> &ModelId {
        &self.default_model
    }

    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    /// Runs one request end to end.
    ///
    /// Inputs are validated before any network call, so a missing
    /// credential costs nothing.
    pub async fn run(&self, request: &PipelineRequest) -> Result<PipelineOutcome, PipelineError> {
        let validated = request.validate(&self.default_model)?;
        let credentials = &validated.credentials;

        enter(PipelineStage::Acquiring);
        let content = ContentRef::parse(&validated.content)?;
        let text = acquire(&content, self.fetcher.as_ref()).await?;
        log::debug!("Acquired {} bytes of source text", text.len());

        enter(PipelineStage::Generating);
        let prompt = build_prompt(&text);
        let completion = self
            .generator
            .generate(&prompt, &validated.model, &credentials.generation_api_key)
            .await?;

        enter(PipelineStage::Validating);
        let record = parse_completion(&completion)?;
        if record.is_blank() {
            log::warn!("Completion parsed but every field is empty");
        }

        enter(PipelineStage::Persisting);
        let target = PersistTarget {
            container: &credentials.container_id,
            token: &credentials.workspace_token,
            schema: &self.schema,
        };
        let page = persist(&record, content.url(), target, self.workspace.as_ref()).await?;

        enter(PipelineStage::Done);
        Ok(PipelineOutcome { record, page })
    }
}

fn enter(stage: PipelineStage) {
    log::info!("Pipeline stage: {}", stage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, GenerationError, PersistenceError};
    use crate::notion::PageCreateRequest;
    use crate::types::{
        GenerationApiKey, GenerationPrompt, PageId, RawCompletion, ValidatedUrl, WorkspaceToken,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeFetcher {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl SourceFetcher for FakeFetcher {
        async fn fetch(&self, url: &ValidatedUrl) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(format!("Article at {}", url))
        }
    }

    struct FakeGenerator {
        calls: AtomicUsize,
        reply: String,
        prompts: Mutex<Vec<String>>,
    }

    impl FakeGenerator {
        fn replying(reply: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: reply.to_string(),
                prompts: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl GenerationService for FakeGenerator {
        async fn generate(
            &self,
            prompt: &GenerationPrompt,
            _model: &ModelId,
            _api_key: &GenerationApiKey,
        ) -> Result<RawCompletion, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.prompts.lock().unwrap().push(prompt.as_str().to_string());
            Ok(RawCompletion::new(self.reply.clone()))
        }
    }

    #[derive(Default)]
    struct FakeWorkspace {
        requests: Mutex<Vec<PageCreateRequest>>,
    }

    #[async_trait::async_trait]
    impl WorkspaceRepository for FakeWorkspace {
        async fn create_page(
            &self,
            request: &PageCreateRequest,
            _token: &WorkspaceToken,
        ) -> Result<CreatedPage, PersistenceError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(CreatedPage {
                id: PageId::parse("598337872cf94fdf8782e53db20768a5").unwrap(),
                url: None,
            })
        }
    }

    fn request(content: &str) -> PipelineRequest {
        PipelineRequest::new(
            content,
            CredentialInput {
                generation_api_key: "gen-key".to_string(),
                workspace_token: "secret_token".to_string(),
                workspace_container_id: "0123456789abcdef0123456789abcdef".to_string(),
            },
        )
    }

    fn pipeline(
        fetcher: &Arc<FakeFetcher>,
        generator: &Arc<FakeGenerator>,
        workspace: &Arc<FakeWorkspace>,
    ) -> Pipeline {
        Pipeline::new(
            fetcher.clone(),
            generator.clone(),
            workspace.clone(),
            ModelId::new("gemini-2.0-flash").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_literal_text_runs_without_fetching() {
        let fetcher = Arc::new(FakeFetcher::default());
        let generator = Arc::new(FakeGenerator::replying(
            "```json\n{\"Title\": \"T\", \"Summary\": \"S\"}\n```",
        ));
        let workspace = Arc::new(FakeWorkspace::default());

        let outcome = pipeline(&fetcher, &generator, &workspace)
            .run(&request("not a url"))
            .await
            .unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(outcome.record.title, "T");
        assert!(generator.prompts.lock().unwrap()[0].contains("not a url"));

        let requests = workspace.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(!requests[0].properties.contains_key("URL"));
    }

    #[tokio::test]
    async fn test_url_content_is_fetched_once_and_recorded() {
        let fetcher = Arc::new(FakeFetcher::default());
        let generator = Arc::new(FakeGenerator::replying("{}"));
        let workspace = Arc::new(FakeWorkspace::default());

        pipeline(&fetcher, &generator, &workspace)
            .run(&request("https://blog.example.com/post"))
            .await
            .unwrap();

        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
        let requests = workspace.requests.lock().unwrap();
        assert!(requests[0].properties.contains_key("URL"));
    }

    #[tokio::test]
    async fn test_unparseable_completion_writes_nothing() {
        let fetcher = Arc::new(FakeFetcher::default());
        let generator = Arc::new(FakeGenerator::replying("I cannot help with that."));
        let workspace = Arc::new(FakeWorkspace::default());

        let err = pipeline(&fetcher, &generator, &workspace)
            .run(&request("some text"))
            .await
            .unwrap_err();

        assert_eq!(err.stage(), PipelineStage::Validating);
        assert_eq!(err.kind(), "ParseError");
        assert!(workspace.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_token_fails_before_generation() {
        let fetcher = Arc::new(FakeFetcher::default());
        let generator = Arc::new(FakeGenerator::replying("{}"));
        let workspace = Arc::new(FakeWorkspace::default());

        let mut request = request("https://blog.example.com/post");
        request.credentials.workspace_token.clear();
        let err = pipeline(&fetcher, &generator, &workspace)
            .run(&request)
            .await
            .unwrap_err();

        assert_eq!(err.stage(), PipelineStage::Idle);
        assert_eq!(err.http_status(), 400);
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 0);
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }
}
