// tests/common/mod.rs
//! In-memory collaborators with call counters, shared by the integration tests.

#![allow(dead_code)]

use content2notion::{
    AudioClip, CreatedPage, CredentialInput, FetchError, GenerationApiKey, GenerationError,
    GenerationPrompt, GenerationService, ModelId, NotionErrorCode, PageCreateRequest, PageId,
    PersistenceError, Pipeline, RawCompletion, SourceFetcher, Transcriber, Transcript,
    ValidatedUrl, WorkspaceRepository, WorkspaceToken,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const CONTAINER_ID: &str = "0123456789abcdef0123456789abcdef";

pub fn credentials() -> CredentialInput {
    CredentialInput {
        generation_api_key: "gen-key".to_string(),
        workspace_token: "secret_token".to_string(),
        workspace_container_id: CONTAINER_ID.to_string(),
    }
}

pub struct FakeFetcher {
    pub calls: AtomicUsize,
    body: String,
}

impl FakeFetcher {
    pub fn returning(body: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            body: body.to_string(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl SourceFetcher for FakeFetcher {
    async fn fetch(&self, _url: &ValidatedUrl) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.body.clone())
    }
}

pub struct FakeGenerator {
    pub calls: AtomicUsize,
    reply: String,
    pub models: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply: reply.to_string(),
            models: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GenerationService for FakeGenerator {
    async fn generate(
        &self,
        _prompt: &GenerationPrompt,
        model: &ModelId,
        _api_key: &GenerationApiKey,
    ) -> Result<RawCompletion, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.models.lock().unwrap().push(model.as_str().to_string());
        Ok(RawCompletion::new(self.reply.clone()))
    }
}

/// Accepts every page, or rejects every page with a Notion error.
pub struct FakeWorkspace {
    pub calls: AtomicUsize,
    pub requests: Mutex<Vec<PageCreateRequest>>,
    reject_with: Option<(u16, NotionErrorCode, String)>,
}

impl FakeWorkspace {
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reject_with: None,
        })
    }

    pub fn rejecting(status: u16, code: NotionErrorCode, message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            reject_with: Some((status, code, message.to_string())),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WorkspaceRepository for FakeWorkspace {
    async fn create_page(
        &self,
        request: &PageCreateRequest,
        _token: &WorkspaceToken,
    ) -> Result<CreatedPage, PersistenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, code, message)) = &self.reject_with {
            return Err(PersistenceError::Rejected {
                status: *status,
                code: code.clone(),
                message: message.clone(),
                request_id: None,
            });
        }
        self.requests.lock().unwrap().push(request.clone());
        Ok(CreatedPage {
            id: PageId::parse("598337872cf94fdf8782e53db20768a5").unwrap(),
            url: Some("https://www.notion.so/598337872cf94fdf8782e53db20768a5".to_string()),
        })
    }
}

pub struct FakeTranscriber {
    pub calls: AtomicUsize,
    pub mime_types: Mutex<Vec<String>>,
}

impl FakeTranscriber {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            mime_types: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Transcriber for FakeTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        _model: &ModelId,
        _api_key: &GenerationApiKey,
    ) -> Result<Transcript, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.mime_types
            .lock()
            .unwrap()
            .push(audio.mime_type().to_string());
        Ok(Transcript::new(format!("{} bytes of speech", audio.len())))
    }
}

pub fn pipeline(
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
