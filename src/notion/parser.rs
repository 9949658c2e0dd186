// src/notion/parser.rs
//! Interprets `POST /v1/pages` responses.
//!
//! Error bodies are read with notion-client's error object so the service's
//! code and message reach the caller intact.

use super::CreatedPage;
use crate::error::{body_preview, NotionErrorCode, PersistenceError};
use crate::http::ApiResponse;
use crate::types::PageId;
use notion_client::objects::error::Error as NotionError;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct CreatedPageResponse {
    id: String,
    url: Option<String>,
}

/// Turns a page-creation response into the created page or a
/// [`PersistenceError`].
pub fn parse_created_page(result: ApiResponse<String>) -> Result<CreatedPage, PersistenceError> {
    if !result.status.is_success() {
        return Err(rejection(&result));
    }

    let page: CreatedPageResponse = serde_json::from_str(&result.data).map_err(|e| {
        log::error!("Failed to parse page response from {}: {}", result.url, e);
        PersistenceError::MalformedResponse(format!("{} (body: {})", e, body_preview(&result.data)))
    })?;

    let id = PageId::parse(&page.id).map_err(|_| {
        PersistenceError::MalformedResponse("created page has no id".to_string())
    })?;

    Ok(CreatedPage { id, url: page.url })
}

fn rejection(result: &ApiResponse<String>) -> PersistenceError {
    let status = result.status.as_u16();

    let error = match serde_json::from_str::<NotionError>(&result.data) {
        Ok(error) => PersistenceError::Rejected {
            status,
            code: NotionErrorCode::from_api_response(&error.code),
            message: error.message,
            request_id: error.request_id,
        },
        // Fallback to the HTTP status when the body is not a Notion error
        Err(_) => PersistenceError::Rejected {
            status,
            code: NotionErrorCode::from_http_status(status),
            message: format!("HTTP {} from {}: {}", status, result.url, body_preview(&result.data)),
            request_id: None,
        },
    };

    log::error!("Notion rejected page creation: {}", error);
    error
}
