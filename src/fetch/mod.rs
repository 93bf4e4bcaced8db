//! Minimal HTTP plumbing for the handover API.

mod basic;
mod client;

pub use basic::{BasicClient, DEFAULT_TIMEOUT};
pub use client::HttpClient;

use reqwest::StatusCode;
use tracing::debug;

use crate::error::{Error, Result};

/// Issues a GET and returns the response body.
///
/// A `404 Not Found` is an answer, not a failure, and maps to `Ok(None)`.
///
/// # Errors
///
/// - [`Error::InvalidUrl`] if `url` does not parse.
/// - [`Error::Network`] for transport failures and timeouts.
/// - [`Error::HttpStatus`] for any other non-success status.
pub async fn get_text<C: HttpClient>(client: &C, url: &str) -> Result<Option<String>> {
    let parsed = reqwest::Url::parse(url).map_err(|e| Error::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    let req = reqwest::Request::new(reqwest::Method::GET, parsed);

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(url, %status, "Response received");

    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(Error::HttpStatus {
            status,
            url: url.to_string(),
        });
    }

    Ok(Some(resp.text().await?))
}
