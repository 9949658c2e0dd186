// src/server/mod.rs
//! HTTP surface for the pipeline and the speech path.
//!
//! Every route takes one write verb; any other verb gets 405. Request
//! bodies are read raw and parsed here so malformed JSON is answered with
//! the same `{error}` envelope as every other failure.

mod routes;

use crate::api::Transcriber;
use crate::constants::MAX_REQUEST_BODY_BYTES;
use crate::error::AppError;
use crate::pipeline::Pipeline;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

/// Shared, immutable state: the pipeline's collaborators and settings.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Pipeline,
    pub transcriber: Arc<dyn Transcriber>,
}

/// Build the axum router for the API.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/process",
            post(routes::process).fallback(routes::method_not_allowed),
        )
        .route(
            "/api/transcribe",
            post(routes::transcribe).fallback(routes::method_not_allowed),
        )
        .route(
            "/api/live-transcribe",
            post(routes::live_transcribe).fallback(routes::method_not_allowed),
        )
        .route(
            "/api/settings",
            post(routes::check_settings).fallback(routes::method_not_allowed),
        )
        .route("/health", get(routes::health))
        .layer(DefaultBodyLimit::max(MAX_REQUEST_BODY_BYTES))
        .with_state(state)
}

/// Serves the API until the process is stopped.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
