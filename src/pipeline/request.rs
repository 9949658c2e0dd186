// src/pipeline/request.rs
//! Caller input for one pipeline run, and its eager validation.

use crate::error::ConfigError;
use crate::types::{ContainerId, GenerationApiKey, ModelId, WorkspaceToken};
use serde::Deserialize;
use std::fmt;

/// Credentials as the caller sent them, unchecked.
///
/// Field names follow the invocation boundary; the browser UI's older
/// names (`geminiApiKey`, `notionToken`, `notionDatabaseId`) are accepted as
/// aliases.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialInput {
    #[serde(default, alias = "geminiApiKey")]
    pub generation_api_key: String,
    #[serde(default, alias = "notionToken")]
    pub workspace_token: String,
    #[serde(default, alias = "notionDatabaseId")]
    pub workspace_container_id: String,
}

impl CredentialInput {
    /// Checks that every credential is present.
    ///
    /// Fails on the first missing value, in the order generation key,
    /// workspace token, container id.
    pub fn validate(&self) -> Result<Credentials, ConfigError> {
        Ok(Credentials {
            generation_api_key: GenerationApiKey::new(
                self.generation_api_key.as_str(),
                "generationApiKey",
            )?,
            workspace_token: WorkspaceToken::new(self.workspace_token.as_str(), "workspaceToken")?,
            container_id: ContainerId::parse(&self.workspace_container_id)?,
        })
    }
}

/// Shows which credentials are present, never their values.
impl fmt::Debug for CredentialInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = |value: &str| !value.trim().is_empty();
        f.debug_struct("CredentialInput")
            .field("generation_api_key", &present(&self.generation_api_key))
            .field("workspace_token", &present(&self.workspace_token))
            .field("workspace_container_id", &self.workspace_container_id)
            .finish()
    }
}

/// Credentials that passed validation. Threaded through every call; never
/// stored beyond the run.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub generation_api_key: GenerationApiKey,
    pub workspace_token: WorkspaceToken,
    pub container_id: ContainerId,
}

/// One pipeline invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    /// A URL to fetch, or the literal text to transform.
    #[serde(default)]
    pub content: String,
    #[serde(flatten)]
    pub credentials: CredentialInput,
    /// Falls back to the configured default model when absent or blank.
    #[serde(default, alias = "model")]
    pub model_id: Option<String>,
}

impl PipelineRequest {
    pub fn new(content: impl Into<String>, credentials: CredentialInput) -> Self {
        Self {
            content: content.into(),
            credentials,
            model_id: None,
        }
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = Some(model_id.into());
        self
    }

    /// Performs every check that needs no network access.
    pub fn validate(&self, default_model: &ModelId) -> Result<ValidatedRequest, ConfigError> {
        if self.content.trim().is_empty() {
            return Err(ConfigError::Missing("content"));
        }

        let credentials = self.credentials.validate()?;

        let model = match self.model_id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => ModelId::new(id)?,
            _ => default_model.clone(),
        };

        Ok(ValidatedRequest {
            content: self.content.clone(),
            credentials,
            model,
        })
    }
}

/// A request whose inputs are all present and well-formed.
#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub content: String,
    pub credentials: Credentials,
    pub model: ModelId,
}
