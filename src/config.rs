// src/config.rs
use crate::api::GeminiClient;
use crate::constants::{
    DEFAULT_BIND_ADDRESS, DEFAULT_MODEL_ID, GENERATION_API_BASE_URL, NOTION_API_BASE_URL,
};
use crate::error::AppError;
use crate::notion::{NotionHttpClient, PropertySchema};
use crate::pipeline::{CredentialInput, Pipeline};
use crate::source::HttpSourceFetcher;
use crate::types::ModelId;
use clap::{Args, Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const GENERATION_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const WORKSPACE_TOKEN_VAR: &str = "NOTION_API_KEY";
pub const CONTAINER_ID_VAR: &str = "NOTION_DATABASE_ID";
pub const MODEL_VAR: &str = "CONTENT2NOTION_MODEL";
pub const GENERATION_URL_VAR: &str = "CONTENT2NOTION_GENERATION_URL";
pub const NOTION_URL_VAR: &str = "CONTENT2NOTION_NOTION_URL";

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// JSON file replacing the built-in property schema table
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Model used when a request does not name one (e.g. "gemini-2.0-flash")
    #[arg(long, global = true)]
    pub model: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Turn a blog URL or literal text into social content and save it to Notion
    Process(ProcessArgs),
    /// Transcribe an audio file, optionally feeding the transcript to `process`
    Transcribe(TranscribeArgs),
    /// Serve the HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Blog URL or source text; "-" reads the text from stdin
    pub content: String,

    /// Print the result envelope as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct TranscribeArgs {
    /// Audio recording to transcribe
    pub audio_file: PathBuf,

    /// MIME type of the recording (guessed from the extension otherwise)
    #[arg(long)]
    pub mime: Option<String>,

    /// Run the transcript through the content pipeline
    #[arg(long, default_value_t = false)]
    pub process: bool,

    /// Print the result envelope as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = DEFAULT_BIND_ADDRESS)]
    pub bind: SocketAddr,
}

/// Resolved configuration shared by every pipeline run.
///
/// Credentials from the environment are kept raw: a missing one surfaces
/// as a `ConfigError` from the pipeline, exactly as over HTTP.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub default_model: ModelId,
    pub generation_base_url: String,
    pub notion_base_url: String,
    pub schema: PropertySchema,
    pub credentials: CredentialInput,
}

impl PipelineConfig {
    /// Resolves configuration from CLI input and the process environment.
    pub fn resolve(cli: &CommandLineInput) -> Result<Self, AppError> {
        Self::resolve_with(cli, |name| std::env::var(name).ok())
    }

    /// Resolves configuration with `lookup` standing in for the environment.
    pub fn resolve_with(
        cli: &CommandLineInput,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let model = cli
            .model
            .clone()
            .or_else(|| var(MODEL_VAR))
            .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());
        let default_model = ModelId::new(model)?;

        let schema = match &cli.schema {
            Some(path) => load_schema(path)?,
            None => PropertySchema::default(),
        };

        Ok(Self {
            default_model,
            generation_base_url: var(GENERATION_URL_VAR)
                .unwrap_or_else(|| GENERATION_API_BASE_URL.to_string()),
            notion_base_url: var(NOTION_URL_VAR)
                .unwrap_or_else(|| NOTION_API_BASE_URL.to_string()),
            schema,
            credentials: CredentialInput {
                generation_api_key: var(GENERATION_API_KEY_VAR).unwrap_or_default(),
                workspace_token: var(WORKSPACE_TOKEN_VAR).unwrap_or_default(),
                workspace_container_id: var(CONTAINER_ID_VAR).unwrap_or_default(),
            },
        })
    }

    /// Builds the HTTP-backed pipeline described by this configuration.
    pub fn build_pipeline(&self) -> Result<Pipeline, AppError> {
        let pipeline = Pipeline::new(
            Arc::new(HttpSourceFetcher::new()?),
            Arc::new(self.generation_client()?),
            Arc::new(NotionHttpClient::new(&self.notion_base_url)?),
            self.default_model.clone(),
        );
        Ok(pipeline.with_schema(self.schema.clone()))
    }

    pub fn generation_client(&self) -> Result<GeminiClient, AppError> {
        GeminiClient::new(&self.generation_base_url)
    }
}

/// Reads a property schema table from a JSON file.
pub fn load_schema(path: &Path) -> Result<PropertySchema, AppError> {
    let raw = std::fs::read_to_string(path)?;
    let schema = serde_json::from_str(&raw).map_err(|source| AppError::InvalidSchema {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loaded property schema from {}", path.display());
    Ok(schema)
}
