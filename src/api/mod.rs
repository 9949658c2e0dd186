// src/api/mod.rs
//! Generative model interaction: the ability to turn a prompt into a completion.
//!
//! Business logic depends on [`GenerationService`] and [`Transcriber`],
//! never on HTTP details.

pub mod client;
pub mod parser;
mod responses;
pub mod transcription;

use crate::error::GenerationError;
use crate::types::{GenerationApiKey, GenerationPrompt, ModelId, RawCompletion};

pub use client::GeminiClient;
pub use transcription::{AudioClip, Transcriber};

/// The ability to produce a completion for a prompt.
///
/// One call per pipeline run. Implementations must not retry.
#[async_trait::async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(
        &self,
        prompt: &GenerationPrompt,
        model: &ModelId,
        api_key: &GenerationApiKey,
    ) -> Result<RawCompletion, GenerationError>;
}
