// src/http.rs
//! Response plumbing shared by the generation and workspace clients.

use reqwest::Response;

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Extracts the response body as text with metadata.
///
/// Transport errors while reading the body are returned as-is; status
/// interpretation is left to the caller's parser.
pub async fn extract_response_text(
    response: Response,
) -> Result<ApiResponse<String>, reqwest::Error> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
