// src/error.rs
//! Application error types with structured error handling.
//!
//! Each pipeline stage owns one error type and raises nothing else.
//! `PipelineError` tags whichever of them ended a run with the stage it came
//! from, so callers can tell a workspace rejection from a model failure.

use crate::constants::ERROR_BODY_PREVIEW_LENGTH;
use crate::pipeline::PipelineStage;
use crate::text::truncate_chars;
use crate::types::ValidationError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Notion API error codes as a typed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotionErrorCode {
    /// API rate limit exceeded
    RateLimited,
    /// The database does not exist or is not shared with the integration
    ObjectNotFound,
    /// Token is invalid or expired
    Unauthorized,
    /// Token lacks permission for this resource
    RestrictedResource,
    /// Request body contains invalid JSON
    InvalidJson,
    /// Request parameters failed Notion's validation, e.g. a missing property
    ValidationFailed,
    /// Conflict with current state of the resource
    Conflict,
    /// Notion internal server error
    InternalError,
    /// Notion is temporarily unavailable
    ServiceUnavailable,
    /// HTTP status code fallback when the error body is unparseable
    HttpStatus(u16),
    /// An error code this client doesn't recognize yet
    Unknown(String),
}

impl NotionErrorCode {
    /// Parse a Notion API error code string into the typed vocabulary.
    pub fn from_api_response(code: &str) -> Self {
        match code {
            "rate_limited" => Self::RateLimited,
            "object_not_found" => Self::ObjectNotFound,
            "unauthorized" => Self::Unauthorized,
            "restricted_resource" => Self::RestrictedResource,
            "invalid_json" => Self::InvalidJson,
            "validation_error" => Self::ValidationFailed,
            "conflict_error" => Self::Conflict,
            "internal_server_error" => Self::InternalError,
            "service_unavailable" => Self::ServiceUnavailable,
            other => Self::Unknown(other.to_string()),
        }
    }

    /// Create from an HTTP status code when the error body is unparseable.
    pub fn from_http_status(status: u16) -> Self {
        Self::HttpStatus(status)
    }

    /// Whether the token itself was refused.
    pub fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::Unauthorized | Self::RestrictedResource | Self::HttpStatus(401 | 403)
        )
    }
}

impl fmt::Display for NotionErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RateLimited => write!(f, "rate_limited"),
            Self::ObjectNotFound => write!(f, "object_not_found"),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::RestrictedResource => write!(f, "restricted_resource"),
            Self::InvalidJson => write!(f, "invalid_json"),
            Self::ValidationFailed => write!(f, "validation_error"),
            Self::Conflict => write!(f, "conflict_error"),
            Self::InternalError => write!(f, "internal_server_error"),
            Self::ServiceUnavailable => write!(f, "service_unavailable"),
            Self::HttpStatus(code) => write!(f, "http_{}", code),
            Self::Unknown(code) => write!(f, "{}", code),
        }
    }
}

/// A required input was missing or malformed. Raised before any network call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error(transparent)]
    Invalid(ValidationError),
}

/// Empty-field validation failures are reported as missing input.
impl From<ValidationError> for ConfigError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::EmptyField(field) => Self::Missing(field),
            other => Self::Invalid(other),
        }
    }
}

/// The content reference could not be turned into text.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Content reference is empty")]
    EmptyContent,

    #[error("Invalid source URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} responded with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} returned an empty body")]
    EmptyBody { url: String },
}

/// The generation service was unreachable or produced nothing usable.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Generation service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API key cannot be sent to the generation service: {0}")]
    InvalidCredentials(String),

    #[error("Generation service returned HTTP {status}: {message}")]
    Service { status: u16, message: String },

    #[error("Generation service returned no completion text{}", reason_suffix(.reason))]
    EmptyCompletion { reason: Option<String> },

    #[error("Malformed generation response: {0}")]
    MalformedResponse(String),
}

fn reason_suffix(reason: &Option<String>) -> String {
    reason
        .as_ref()
        .map(|r| format!(" ({})", r))
        .unwrap_or_default()
}

/// The completion was not a JSON object even after unwrapping.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Completion is empty after stripping code fences")]
    Empty,

    #[error("Completion is not valid JSON: {source} (starts with: {preview:?})")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
        preview: String,
    },

    #[error("Completion JSON is {found}, expected an object")]
    NotAnObject { found: &'static str },
}

/// Wording Notion uses for an unknown property and for a type clash.
const SCHEMA_MISMATCH_PHRASES: [&str; 2] = ["is not a property that exists", "is expected to be"];

/// The workspace refused or failed to create the page.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Workspace service unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Workspace token cannot be sent to the workspace service: {0}")]
    InvalidCredentials(String),

    #[error("Workspace rejected the page ({code}): {message}")]
    Rejected {
        status: u16,
        code: NotionErrorCode,
        message: String,
        request_id: Option<String>,
    },

    #[error("Malformed workspace response: {0}")]
    MalformedResponse(String),
}

impl PersistenceError {
    /// The workspace error code, when the service returned one.
    pub fn code(&self) -> Option<&NotionErrorCode> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Whether the target database lacks a property the page mapped to,
    /// or has it with a different type.
    ///
    /// Notion reports both as a plain `validation_error`, so this is a
    /// heuristic over the message wording. Only used to add a hint to the
    /// log; the error itself is surfaced unchanged either way.
    pub fn is_schema_mismatch(&self) -> bool {
        match self {
            Self::Rejected {
                code: NotionErrorCode::ValidationFailed,
                message,
                ..
            } => SCHEMA_MISMATCH_PHRASES
                .iter()
                .any(|phrase| message.contains(phrase)),
            _ => false,
        }
    }
}

/// The single failure a pipeline run reports, tagged with its stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Invalid request: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not acquire source text: {0}")]
    Fetch(#[from] FetchError),

    #[error("Content generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("Generated content could not be parsed: {0}")]
    Parse(#[from] ParseError),

    #[error("Saving to Notion failed: {0}")]
    Persistence(#[from] PersistenceError),
}

impl PipelineError {
    /// The stage that was running when the error was raised.
    pub fn stage(&self) -> PipelineStage {
        match self {
            Self::Config(_) => PipelineStage::Idle,
            Self::Fetch(_) => PipelineStage::Acquiring,
            Self::Generation(_) => PipelineStage::Generating,
            Self::Parse(_) => PipelineStage::Validating,
            Self::Persistence(_) => PipelineStage::Persisting,
        }
    }

    /// The taxonomy name reported to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "ConfigError",
            Self::Fetch(_) => "FetchError",
            Self::Generation(_) => "GenerationError",
            Self::Parse(_) => "ParseError",
            Self::Persistence(_) => "PersistenceError",
        }
    }

    /// HTTP-style status: 400 for missing or invalid input, 500 otherwise.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::Config(_) => 400,
            _ => 500,
        }
    }

    /// The `error` member of the failure envelope sent to callers.
    pub fn detail(&self) -> ErrorDetail {
        match self {
            Self::Config(_) => ErrorDetail::Message(self.to_string()),
            _ => ErrorDetail::Stage {
                stage: self.stage(),
                kind: self.kind(),
                message: self.to_string(),
            },
        }
    }
}

/// Missing input is reported as a plain message; stage failures carry the
/// stage and taxonomy name so callers can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    Message(String),
    Stage {
        stage: PipelineStage,
        kind: &'static str,
        message: String,
    },
}

/// Main application error type.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing configuration: {0}")]
    MissingConfiguration(String),

    #[error("Filesystem IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Property schema file {path} is invalid: {source}")]
    InvalidSchema {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Shortens a response body for inclusion in an error message.
pub(crate) fn body_preview(body: &str) -> String {
    let trimmed = body.trim();
    let preview = truncate_chars(trimmed, ERROR_BODY_PREVIEW_LENGTH);
    if preview.len() < trimmed.len() {
        format!("{}...", preview)
    } else {
        preview.to_string()
    }
}

/// Result type alias for convenience
pub type Result<T, E = AppError> = std::result::Result<T, E>;
