//! HTTP fetcher implementation
//!
//! This module handles plain HTTP requests made outside the browser:
//! - Building the shared HTTP client with the configured user agent
//! - Fetching sitemap documents as text
//! - Fetching asset bodies as bytes
//! - Error classification (timeout, HTTP status, transport)
//!
//! Failed requests are not retried; callers record the failure and move on.

use crate::SiteliftError;
use reqwest::{header, Client};
use std::time::Duration;

/// Accept header sent with asset downloads
///
/// Lists only formats the image decoder reads; AVIF is never requested.
const ASSET_ACCEPT: &str = "image/webp,image/png,image/jpeg,image/gif,image/*;q=0.8,*/*;q=0.5";

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - The user agent string presented to the site
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT_LANGUAGE,
        header::HeaderValue::from_static("en-US,en;q=0.9"),
    );

    Client::builder()
        .user_agent(user_agent)
        .default_headers(headers)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns the body as text
///
/// Non-2xx responses are errors.
pub async fn fetch_text(client: &Client, url: &str, timeout: Duration) -> Result<String, SiteliftError> {
    let response = send(client.get(url).timeout(timeout), url).await?;
    response.text().await.map_err(|e| classify(url, e))
}

/// Fetches a URL and returns the raw body bytes
///
/// Non-2xx responses are errors.
pub async fn fetch_bytes(client: &Client, url: &str, timeout: Duration) -> Result<Vec<u8>, SiteliftError> {
    let request = client
        .get(url)
        .timeout(timeout)
        .header(header::ACCEPT, ASSET_ACCEPT);
    let response = send(request, url).await?;
    let bytes = response.bytes().await.map_err(|e| classify(url, e))?;
    Ok(bytes.to_vec())
}

async fn send(request: reqwest::RequestBuilder, url: &str) -> Result<reqwest::Response, SiteliftError> {
    let response = request.send().await.map_err(|e| classify(url, e))?;
    let status = response.status();

    if !status.is_success() {
        return Err(SiteliftError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    Ok(response)
}

/// Maps a transport error onto the crate error taxonomy
fn classify(url: &str, error: reqwest::Error) -> SiteliftError {
    if error.is_timeout() {
        SiteliftError::Timeout {
            url: url.to_string(),
        }
    } else {
        SiteliftError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
