// src/lib.rs
//! content2notion library: turns a blog post or a dictated transcript into
//! social-media content with a generative model and files it in Notion.
//!
//! # Public API
//!
//! The library exposes types organized by concern:
//! - **Error handling**: `PipelineError` and the per-stage errors
//! - **Configuration**: `PipelineConfig`, `CommandLineInput`
//! - **Domain types**: `AcquiredText`, `ModelId`, `ContainerId`, secrets
//! - **Record model**: `ContentRecord`, `Platform`, `parse_completion`
//! - **Collaborators**: `SourceFetcher`, `GenerationService`, `Transcriber`,
//!   `WorkspaceRepository` and their HTTP implementations
//! - **Orchestration**: `Pipeline`, `PipelineRequest`, `PipelineStage`
//! - **HTTP surface**: `server::router`

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
mod http;
pub mod model;
pub mod notion;
pub mod pipeline;
pub mod prompt;
pub mod server;
pub mod source;
mod text;
pub mod types;

// --- Error Handling ---
pub use crate::error::{
    AppError, ConfigError, ErrorDetail, FetchError, GenerationError, NotionErrorCode, ParseError,
    PersistenceError, PipelineError,
};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, PipelineConfig};

// --- Domain Types ---
pub use crate::types::{
    AcquiredText, ContainerId, GenerationApiKey, GenerationPrompt, ModelId, PageId, PropertyName,
    RawCompletion, Transcript, ValidatedUrl, WorkspaceToken,
};

// --- Record Model ---
pub use crate::model::{
    parse_completion, strip_code_fences, ContentRecord, Platform, PlatformContent, PlatformField,
    RecordField,
};

// --- Stages and Collaborators ---
pub use crate::api::{AudioClip, GeminiClient, GenerationService, Transcriber};
pub use crate::notion::{
    map_record, persist, CreatedPage, NotionHttpClient, PageCreateRequest, PersistTarget,
    PropertyKind, PropertyMapping, PropertySchema, ValueSource, WorkspaceRepository,
};
pub use crate::prompt::build_prompt;
pub use crate::source::{acquire, ContentRef, HttpSourceFetcher, SourceFetcher};

// --- Orchestration ---
pub use crate::pipeline::{
    CredentialInput, Credentials, Pipeline, PipelineOutcome, PipelineRequest, PipelineStage,
};
