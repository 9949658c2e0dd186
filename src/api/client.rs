// src/api/client.rs
//! HTTP client for the generation service.
//!
//! Every call is authenticated with the key supplied by the caller for that
//! request; the client itself holds no credentials and can be shared freely
//! between concurrent pipeline runs.

use super::parser::parse_generation_response;
use super::responses::{GenerateContentRequest, InlineData, RequestPart};
use super::transcription::{AudioClip, Transcriber, TRANSCRIPTION_INSTRUCTION};
use super::GenerationService;
use crate::constants::HTTP_TIMEOUT_SECS;
use crate::error::{AppError, GenerationError};
use crate::http::extract_response_text;
use crate::types::{GenerationApiKey, GenerationPrompt, ModelId, RawCompletion, Transcript};
use base64::Engine as _;
use reqwest::{header, Client};
use std::time::Duration;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// A thin wrapper around reqwest Client for `generateContent` requests.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// Creates a client for the model collection at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &ModelId) -> String {
        format!("{}/{}:generateContent", self.base_url, model.as_str())
    }

    /// Sends one `generateContent` request and returns the completion text.
    async fn generate_content(
        &self,
        model: &ModelId,
        api_key: &GenerationApiKey,
        request: &GenerateContentRequest<'_>,
    ) -> Result<String, GenerationError> {
        let url = self.endpoint(model);
        log::debug!("POST {}", url);

        let api_key = header::HeaderValue::from_str(api_key.expose())
            .map_err(|e| GenerationError::InvalidCredentials(e.to_string()))?;

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, api_key)
            .json(request)
            .send()
            .await?;

        log::debug!("POST {} -> {}", url, response.status());
        let result = extract_response_text(response).await?;
        parse_generation_response(result)
    }
}

#[async_trait::async_trait]
impl GenerationService for GeminiClient {
    async fn generate(
        &self,
        prompt: &GenerationPrompt,
        model: &ModelId,
        api_key: &GenerationApiKey,
    ) -> Result<RawCompletion, GenerationError> {
        log::info!(
            "Requesting completion from {} ({} byte prompt)",
            model,
            prompt.len()
        );

        let request = GenerateContentRequest::single_turn(vec![RequestPart::Text {
            text: prompt.as_str(),
        }]);
        let text = self.generate_content(model, api_key, &request).await?;

        log::info!("Received {} byte completion", text.len());
        Ok(RawCompletion::new(text))
    }
}

#[async_trait::async_trait]
impl Transcriber for GeminiClient {
    async fn transcribe(
        &self,
        audio: &AudioClip,
        model: &ModelId,
        api_key: &GenerationApiKey,
    ) -> Result<Transcript, GenerationError> {
        log::info!(
            "Transcribing {} bytes of {} audio with {}",
            audio.len(),
            audio.mime_type(),
            model
        );

        let request = GenerateContentRequest::single_turn(vec![
            RequestPart::Text {
                text: TRANSCRIPTION_INSTRUCTION,
            },
            RequestPart::InlineData {
                inline_data: InlineData {
                    mime_type: audio.mime_type().to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(audio.bytes()),
                },
            },
        ]);
        let text = self.generate_content(model, api_key, &request).await?;

        Ok(Transcript::new(text.trim()))
    }
}
