// src/notion/client.rs
//! Thin HTTP client for the Notion pages endpoint.
//!
//! The integration token arrives with each call rather than living in the
//! client's default headers, so one client serves every caller.

use super::parser::parse_created_page;
use super::requests::PageCreateRequest;
use super::{CreatedPage, WorkspaceRepository};
use crate::constants::{HTTP_TIMEOUT_SECS, NOTION_VERSION};
use crate::error::{AppError, PersistenceError};
use crate::http::extract_response_text;
use crate::types::WorkspaceToken;
use reqwest::{header, Client};
use std::time::Duration;

/// A thin wrapper around reqwest Client for Notion API requests.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .default_headers(Self::create_headers())
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn create_headers() -> header::HeaderMap {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers
    }

    fn authorization(token: &WorkspaceToken) -> Result<header::HeaderValue, PersistenceError> {
        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token.expose()))
            .map_err(|e| PersistenceError::InvalidCredentials(e.to_string()))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[async_trait::async_trait]
impl WorkspaceRepository for NotionHttpClient {
    async fn create_page(
        &self,
        request: &PageCreateRequest,
        token: &WorkspaceToken,
    ) -> Result<CreatedPage, PersistenceError> {
        let url = format!("{}/pages", self.base_url);
        log::info!(
            "Creating page in database {} ({} properties)",
            request.parent.database_id,
            request.properties.len()
        );

        let response = self
            .client
            .post(&url)
            .header(header::AUTHORIZATION, Self::authorization(token)?)
            .json(request)
            .send()
            .await?;

        log::debug!("POST {} -> {}", url, response.status());
        let result = extract_response_text(response).await?;
        let page = parse_created_page(result)?;

        log::info!("Created page {}", page.id);
        Ok(page)
    }
}
