// src/fetch/http.rs

//! HTTP source.

use std::time::Duration;

use url::Url;

use crate::error::Result;
use crate::models::FetchConfig;

/// Create a configured HTTP client.
pub fn create_client(config: &FetchConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// GET a URL and return the response body.
///
/// Non-2xx responses are errors.
pub async fn get_bytes(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>> {
    let response = client.get(url.clone()).send().await?.error_for_status()?;
    let bytes = response.bytes().await?;
    Ok(bytes.to_vec())
}
