// src/api/parser.rs
//! Interprets generation service responses.

use super::responses::{ErrorEnvelope, GenerateContentResponse};
use crate::error::{body_preview, GenerationError};
use crate::http::ApiResponse;

/// Extracts the completion text from a `generateContent` response.
///
/// Non-success statuses become [`GenerationError::Service`]; a success with
/// no candidate text becomes [`GenerationError::EmptyCompletion`].
pub fn parse_generation_response(result: ApiResponse<String>) -> Result<String, GenerationError> {
    if !result.status.is_success() {
        return Err(service_error(&result));
    }

    let response: GenerateContentResponse = serde_json::from_str(&result.data).map_err(|e| {
        log::error!("Failed to parse generation response from {}: {}", result.url, e);
        GenerationError::MalformedResponse(format!("{} (body: {})", e, body_preview(&result.data)))
    })?;

    completion_text(response)
}

fn completion_text(response: GenerateContentResponse) -> Result<String, GenerationError> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason)
        .map(|reason| format!("prompt blocked: {}", reason));

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(GenerationError::EmptyCompletion {
            reason: block_reason.or_else(|| Some("no candidates".to_string())),
        });
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GenerationError::EmptyCompletion {
            reason: candidate
                .finish_reason
                .map(|reason| format!("finish reason: {}", reason))
                .or(block_reason),
        });
    }

    Ok(text)
}

fn service_error(result: &ApiResponse<String>) -> GenerationError {
    let status = result.status.as_u16();
    let message = match serde_json::from_str::<ErrorEnvelope>(&result.data) {
        Ok(envelope) => match envelope.error.status {
            Some(code) => format!("{} ({})", envelope.error.message, code),
            None => envelope.error.message,
        },
        Err(_) => body_preview(&result.data),
    };

    log::error!("Generation service returned HTTP {}: {}", status, message);
    GenerationError::Service { status, message }
}
