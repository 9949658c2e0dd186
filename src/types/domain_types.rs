// src/types/domain_types.rs
//! Domain-specific newtypes for type safety and validation.

use super::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use url::Url;

/// Marker types for the two caller-supplied secrets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationKeyMarker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceTokenMarker;

/// A caller-supplied secret, redacted whenever it is displayed.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret<T> {
    value: String,
    _phantom: PhantomData<T>,
}

/// API key for the generation service.
pub type GenerationApiKey = Secret<GenerationKeyMarker>;
/// Integration token for the Notion workspace.
pub type WorkspaceToken = Secret<WorkspaceTokenMarker>;

impl<T> Secret<T> {
    /// Wraps a secret, rejecting empty or whitespace-only values.
    pub fn new(value: impl Into<String>, field: &'static str) -> Result<Self, ValidationError> {
        let value = value.into().trim().to_string();
        if value.is_empty() {
            return Err(ValidationError::EmptyField(field));
        }
        Ok(Self {
            value,
            _phantom: PhantomData,
        })
    }

    pub fn expose(&self) -> &str {
        &self.value
    }

    fn redacted(&self) -> String {
        let visible: String = self.value.chars().take(4).collect();
        format!("{}...", visible)
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Secret({})", self.redacted())
    }
}

/// Validated URL type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUrl(Url);

impl Serialize for ValidatedUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ValidatedUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ValidatedUrl::parse(&s).map_err(serde::de::Error::custom)
    }
}

impl ValidatedUrl {
    /// Create a new validated URL
    pub fn parse(url: &str) -> Result<Self, ValidationError> {
        match Url::parse(url) {
            Ok(parsed_url) => {
                if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
                    return Err(ValidationError::InvalidUrl {
                        url: url.to_string(),
                        reason: "Only HTTP and HTTPS URLs are supported".to_string(),
                    });
                }
                Ok(Self(parsed_url))
            }
            Err(e) => Err(ValidationError::InvalidUrl {
                url: url.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for ValidatedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generation model identifier, e.g. `gemini-2.0-flash`.
///
/// The id is interpolated into the service's request path, so it is limited
/// to the characters model names actually use. A leading `models/` prefix is
/// accepted and stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = id.into();
        let trimmed = raw.trim();
        let name = trimmed.strip_prefix("models/").unwrap_or(trimmed);

        if name.is_empty() {
            return Err(ValidationError::EmptyField("modelId"));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(ValidationError::InvalidModelId {
                id: raw.clone(),
                reason: "Model id can only contain alphanumeric characters, hyphens, underscores, and dots".to_string(),
            });
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The name of a property on a Notion database.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyName(String);

impl PropertyName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::borrow::Borrow<str> for PropertyName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PropertyName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Source text ready for prompting. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquiredText(String);

impl AcquiredText {
    pub fn new(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ValidationError::EmptyField("content"));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The instruction template with the source text embedded, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPrompt(String);

impl GenerationPrompt {
    pub fn new(content: String) -> Self {
        Self(content)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for GenerationPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Untyped completion text as returned by the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCompletion(String);

impl RawCompletion {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RawCompletion {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Plain-text transcript produced by the speech path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Transcript(String);

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Continues a running transcript with the text of the next chunk,
    /// separated by a single space. Blank pieces add nothing.
    pub fn append(&self, next: &Transcript) -> Transcript {
        match (self.0.trim(), next.0.trim()) {
            ("", next) => Transcript::new(next),
            (previous, "") => Transcript::new(previous),
            (previous, next) => Transcript::new(format!("{} {}", previous, next)),
        }
    }
}
