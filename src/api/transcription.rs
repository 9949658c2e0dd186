// src/api/transcription.rs
//! The speech path: audio in, plain-text transcript out.
//!
//! Transcripts feed the pipeline exactly like pasted text.

use crate::constants::DEFAULT_AUDIO_MIME_TYPE;
use crate::error::GenerationError;
use crate::types::{GenerationApiKey, ModelId, Transcript, ValidationError};
use base64::Engine as _;

pub(crate) const TRANSCRIPTION_INSTRUCTION: &str =
    "Transcribe this audio recording verbatim. Respond with the transcript text only.";

/// The ability to turn recorded speech into text.
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        model: &ModelId,
        api_key: &GenerationApiKey,
    ) -> Result<Transcript, GenerationError>;
}

/// A recorded audio payload and its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    bytes: Vec<u8>,
    mime_type: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime_type: Option<&str>) -> Result<Self, ValidationError> {
        if bytes.is_empty() {
            return Err(ValidationError::EmptyField("audio"));
        }

        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_AUDIO_MIME_TYPE);
        if !mime_type.starts_with("audio/") && !mime_type.starts_with("video/") {
            return Err(ValidationError::InvalidAudio(format!(
                "unsupported MIME type '{}'",
                mime_type
            )));
        }

        Ok(Self {
            bytes,
            mime_type: mime_type.to_string(),
        })
    }

    /// Decodes a base64 payload as sent by browsers, with or without a
    /// `data:<mime>;base64,` prefix. A MIME type in the prefix is used when
    /// `mime_type` is not given.
    pub fn from_base64(encoded: &str, mime_type: Option<&str>) -> Result<Self, ValidationError> {
        let encoded = encoded.trim();
        let (prefix_mime, payload) = match encoded
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
        {
            Some((mime, payload)) => (Some(mime), payload),
            None => (None, encoded),
        };

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(payload)
            .map_err(|e| ValidationError::InvalidAudio(format!("not valid base64: {}", e)))?;

        Self::new(bytes, mime_type.or(prefix_mime))
    }

    /// Guesses the MIME type from a file extension.
    pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
        match extension.to_ascii_lowercase().as_str() {
            "wav" => Some("audio/wav"),
            "mp3" => Some("audio/mp3"),
            "ogg" | "oga" => Some("audio/ogg"),
            "flac" => Some("audio/flac"),
            "aac" => Some("audio/aac"),
            "aiff" | "aif" => Some("audio/aiff"),
            "webm" => Some("audio/webm"),
            "m4a" => Some("audio/mp4"),
            _ => None,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
