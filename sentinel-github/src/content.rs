//! Blob content retrieval

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Deserialize;
use tracing::debug;

use crate::{Error, GitHubClient, Result};

/// Response of `GET /repos/{owner}/{repo}/git/blobs/{sha}`
#[derive(Debug, Clone, Deserialize)]
pub struct Blob {
    pub content: String,
    pub encoding: String,
}

impl Blob {
    /// Decode the blob to UTF-8 text
    ///
    /// GitHub wraps base64 content at 60 columns, so whitespace is removed
    /// before decoding.
    pub fn decode(&self) -> Result<String> {
        let bytes = match self.encoding.as_str() {
            "base64" => {
                let compact: String = self
                    .content
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .collect();
                STANDARD
                    .decode(compact)
                    .map_err(|e| Error::Decode(e.to_string()))?
            }
            "utf-8" | "utf8" => return Ok(self.content.clone()),
            other => return Err(Error::Decode(format!("Unsupported encoding: {}", other))),
        };

        String::from_utf8(bytes).map_err(|e| Error::Decode(format!("Blob is not UTF-8: {}", e)))
    }
}

/// API route for a blob locator
///
/// Absolute API URLs are reduced to their path so requests go through the
/// authenticated client's base URL.
pub fn blob_route(blob_url: &str) -> Result<String> {
    if blob_url.starts_with('/') {
        return Ok(blob_url.to_string());
    }

    let url = url::Url::parse(blob_url).map_err(|e| Error::Parse(e.to_string()))?;
    if !url.path().contains("/git/blobs/") {
        return Err(Error::Parse(format!("Not a blob URL: {}", blob_url)));
    }
    Ok(url.path().to_string())
}

impl GitHubClient {
    /// Fetch and decode a blob by its API URL
    pub async fn blob_text(&self, blob_url: &str) -> Result<String> {
        let route = blob_route(blob_url)?;
        debug!(%route, "Fetching blob");

        let blob: Blob = self.client().get(route, None::<&()>).await?;
        blob.decode()
    }
}
