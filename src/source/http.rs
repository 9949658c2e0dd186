// src/source/http.rs
//! reqwest-backed source fetcher.

use super::SourceFetcher;
use crate::constants::{HTTP_TIMEOUT_SECS, SOURCE_USER_AGENT};
use crate::error::{AppError, FetchError};
use crate::types::ValidatedUrl;
use reqwest::{header, Client};
use std::time::Duration;

/// Downloads source documents over HTTP(S).
#[derive(Clone)]
pub struct HttpSourceFetcher {
    client: Client,
}

impl HttpSourceFetcher {
    pub fn new() -> Result<Self, AppError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("text/html,application/xhtml+xml,text/plain;q=0.9,*/*;q=0.8"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .user_agent(SOURCE_USER_AGENT)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(AppError::HttpClient)?;

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, url: &ValidatedUrl) -> Result<String, FetchError> {
        log::debug!("GET {}", url);

        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.as_url().clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        log::debug!("GET {} -> {}", url, status);
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(transport)
    }
}
