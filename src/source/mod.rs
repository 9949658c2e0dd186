// src/source/mod.rs
//! Source acquisition: turning a content reference into text to prompt with.
//!
//! A reference that starts with an HTTP scheme is fetched; anything else is
//! the text itself (a dictated transcript or a pasted article) and is never
//! sent over the network.

mod http;

pub use http::HttpSourceFetcher;

use crate::error::FetchError;
use crate::types::{AcquiredText, ValidatedUrl};

/// The ability to download a source document.
#[async_trait::async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Returns the response body of a successful GET.
    async fn fetch(&self, url: &ValidatedUrl) -> Result<String, FetchError>;
}

/// A caller-supplied content reference, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentRef {
    Url(ValidatedUrl),
    Text(AcquiredText),
}

impl ContentRef {
    /// Classifies `input` by its scheme prefix.
    ///
    /// Input that claims an HTTP scheme but does not parse as a URL is an
    /// error rather than literal text.
    pub fn parse(input: &str) -> Result<Self, FetchError> {
        let candidate = input.trim();
        if has_http_scheme(candidate) {
            return ValidatedUrl::parse(candidate)
                .map(ContentRef::Url)
                .map_err(|e| FetchError::InvalidUrl {
                    url: candidate.to_string(),
                    reason: e.to_string(),
                });
        }

        AcquiredText::new(input)
            .map(ContentRef::Text)
            .map_err(|_| FetchError::EmptyContent)
    }

    pub fn url(&self) -> Option<&ValidatedUrl> {
        match self {
            ContentRef::Url(url) => Some(url),
            ContentRef::Text(_) => None,
        }
    }
}

fn has_http_scheme(input: &str) -> bool {
    let prefix = |scheme: &str| {
        input
            .get(..scheme.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(scheme))
    };
    prefix("http://") || prefix("https://")
}

/// Produces the text for a content reference.
///
/// Literal text is returned unchanged; URLs are fetched through `fetcher`.
pub async fn acquire(
    content: &ContentRef,
    fetcher: &dyn SourceFetcher,
) -> Result<AcquiredText, FetchError> {
    match content {
        ContentRef::Text(text) => {
            log::debug!("Using {} bytes of literal source text", text.len());
            Ok(text.clone())
        }
        ContentRef::Url(url) => {
            log::info!("Fetching source document {}", url);
            let body = fetcher.fetch(url).await?;
            let text = AcquiredText::new(body).map_err(|_| FetchError::EmptyBody {
                url: url.to_string(),
            })?;
            log::info!("Fetched {} bytes from {}", text.len(), url);
            Ok(text)
        }
    }
}
