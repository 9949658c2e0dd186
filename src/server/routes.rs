// src/server/routes.rs
use super::AppState;
use crate::api::AudioClip;
use crate::error::{ConfigError, ErrorDetail, PipelineError};
use crate::model::ContentRecord;
use crate::pipeline::{CredentialInput, PipelineRequest};
use crate::types::{GenerationApiKey, ModelId, Transcript};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
struct ProcessResponse<'a> {
    message: &'static str,
    data: &'a ContentRecord,
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

fn error_response(status: StatusCode, error: ErrorDetail) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

fn bad_request(message: impl Into<String>) -> Response {
    error_response(StatusCode::BAD_REQUEST, ErrorDetail::Message(message.into()))
}

fn parse_body<T: DeserializeOwned>(body: &Bytes) -> Result<T, Response> {
    serde_json::from_slice(body).map_err(|e| {
        log::warn!("Rejected request body: {}", e);
        bad_request(format!("Request body must be a JSON object: {}", e))
    })
}

impl IntoResponse for PipelineError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match &self {
            PipelineError::Config(_) => log::warn!("Rejected pipeline request: {}", self),
            _ => log::error!("Pipeline failed at stage {}: {}", self.stage(), self),
        }

        error_response(status, self.detail())
    }
}

/// `POST /api/process`
pub(super) async fn process(State(state): State<AppState>, body: Bytes) -> Response {
    let request: PipelineRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.pipeline.run(&request).await {
        Ok(outcome) => {
            log::info!("Processed request into page {}", outcome.page.id);
            Json(ProcessResponse {
                message: "Processed successfully",
                data: &outcome.record,
            })
            .into_response()
        }
        Err(err) => err.into_response(),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TranscribeRequest {
    #[serde(default)]
    audio: String,
    mime_type: Option<String>,
    #[serde(default, alias = "geminiApiKey")]
    generation_api_key: String,
    #[serde(default, alias = "model")]
    model_id: Option<String>,
}

#[derive(Serialize)]
struct TranscribeResponse {
    transcription: Transcript,
}

/// `POST /api/transcribe`
pub(super) async fn transcribe(State(state): State<AppState>, body: Bytes) -> Response {
    let request: TranscribeRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (audio, api_key, model) = match validate_transcription(&request, &state) {
        Ok(inputs) => inputs,
        Err(err) => {
            log::warn!("Rejected transcription request: {}", err);
            return bad_request(err.to_string());
        }
    };

    match state.transcriber.transcribe(&audio, &model, &api_key).await {
        Ok(transcription) => Json(TranscribeResponse { transcription }).into_response(),
        Err(err) => {
            log::error!("Transcription failed: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::Message(format!("Transcription failed: {}", err)),
            )
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveTranscribeRequest {
    #[serde(flatten)]
    chunk: TranscribeRequest,
    #[serde(default)]
    previous_transcript: String,
}

#[derive(Serialize)]
struct LiveTranscribeResponse {
    /// Text of this chunk alone.
    transcription: Transcript,
    /// The previous transcript continued with this chunk.
    transcript: Transcript,
}

/// `POST /api/live-transcribe`: transcribes one chunk of an ongoing
/// recording and returns it joined onto the transcript so far. The caller
/// holds the running transcript between chunks.
pub(super) async fn live_transcribe(State(state): State<AppState>, body: Bytes) -> Response {
    let request: LiveTranscribeRequest = match parse_body(&body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let (audio, api_key, model) = match validate_transcription(&request.chunk, &state) {
        Ok(inputs) => inputs,
        Err(err) => {
            log::warn!("Rejected live transcription chunk: {}", err);
            return bad_request(err.to_string());
        }
    };

    match state.transcriber.transcribe(&audio, &model, &api_key).await {
        Ok(transcription) => {
            let transcript = Transcript::new(request.previous_transcript).append(&transcription);
            log::debug!(
                "Live transcript now {} bytes after a {} byte chunk",
                transcript.as_str().len(),
                audio.len()
            );
            Json(LiveTranscribeResponse {
                transcription,
                transcript,
            })
            .into_response()
        }
        Err(err) => {
            log::error!("Live transcription failed: {}", err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::Message(format!("Transcription failed: {}", err)),
            )
        }
    }
}

fn validate_transcription(
    request: &TranscribeRequest,
    state: &AppState,
) -> Result<(AudioClip, GenerationApiKey, ModelId), ConfigError> {
    if request.audio.trim().is_empty() {
        return Err(ConfigError::Missing("audio"));
    }
    let api_key = GenerationApiKey::new(request.generation_api_key.as_str(), "generationApiKey")?;
    let audio = AudioClip::from_base64(&request.audio, request.mime_type.as_deref())?;
    let model = match request.model_id.as_deref().map(str::trim) {
        Some(id) if !id.is_empty() => ModelId::new(id)?,
        _ => state.pipeline.default_model().clone(),
    };
    Ok((audio, api_key, model))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SettingsResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// `POST /api/settings`: reports whether a credential set is complete.
/// Nothing is stored.
pub(super) async fn check_settings(body: Bytes) -> Response {
    let credentials: CredentialInput = match parse_body(&body) {
        Ok(credentials) => credentials,
        Err(response) => return response,
    };

    match credentials.validate() {
        Ok(_) => Json(SettingsResponse {
            success: true,
            message: Some("All credentials are present"),
            error: None,
        })
        .into_response(),
        Err(err) => (
            StatusCode::BAD_REQUEST,
            Json(SettingsResponse {
                success: false,
                message: None,
                error: Some(err.to_string()),
            }),
        )
            .into_response(),
    }
}

#[derive(Serialize)]
pub(super) struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// `GET /health`
pub(super) async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub(super) async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(ErrorBody {
            error: ErrorDetail::Message("Method not allowed".to_string()),
        }),
    )
        .into_response()
}
