//! Loading the page to pick from.
//!
//! HTML can come from an HTTP(S) URL (with the `fetch` feature), a local
//! file, or standard input.

use std::fs;
use std::path::PathBuf;

use crate::{MdPickError, Result};

/// HTTP client configuration for fetching web pages.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Request timeout in seconds.
    pub timeout: u64,
    /// Custom User-Agent string.
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { timeout: 30, user_agent: concat!("Mozilla/5.0 (compatible; mdpick/", env!("CARGO_PKG_VERSION"), ")").to_string() }
    }
}

/// Fetches HTML content from a URL.
///
/// Follows redirects and respects the configured timeout. Only `http` and
/// `https` URLs are accepted.
#[cfg(feature = "fetch")]
pub async fn fetch_url(url: &str, config: &FetchConfig) -> Result<String> {
    use std::time::Duration;

    use reqwest::Client;
    use url::Url;

    let parsed_url = Url::parse(url).map_err(|e| MdPickError::InvalidUrl(e.to_string()))?;

    if !matches!(parsed_url.scheme(), "http" | "https") {
        return Err(MdPickError::InvalidUrl(format!(
            "unsupported scheme '{}' (expected http:// or https://)",
            parsed_url.scheme()
        )));
    }

    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout))
        .build()
        .map_err(MdPickError::HttpError)?;

    tracing::debug!(url = %parsed_url, "fetching page");

    let response = client
        .get(parsed_url)
        .header("User-Agent", &config.user_agent)
        .header("Accept", "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8")
        .send()
        .await
        .map_err(|e| {
            if e.is_timeout() { MdPickError::Timeout { timeout: config.timeout } } else { MdPickError::HttpError(e) }
        })?;

    let content = response.error_for_status()?.text().await?;

    Ok(content)
}

/// Reads HTML content from a local file.
pub fn fetch_file(path: &str) -> Result<String> {
    let path_buf = PathBuf::from(path);

    if !path_buf.exists() {
        Err(MdPickError::FileNotFound(path_buf))
    } else {
        fs::read_to_string(&path_buf).map_err(MdPickError::from)
    }
}

/// Reads HTML content from standard input until EOF.
pub fn fetch_stdin() -> Result<String> {
    use std::io::{self, Read};

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;

    Ok(buffer)
}
