//! HTTP client for page metadata and remote images.
//!
//! Features:
//! - TLS 1.3 via rustls
//! - Brotli, Gzip, Deflate compression (auto-negotiated)
//! - Charset detection for HTML bodies
//! - Connect and overall timeouts on every request
//! - Response size cap on every body read

use std::time::Duration;

use anyhow::{bail, Result};
use reqwest::{Client, Response};
use tracing::{debug, instrument};

/// Largest remote response body read into memory (20 MiB).
pub const MAX_RESPONSE_BYTES: usize = 20 * 1024 * 1024;

const USER_AGENT: &str = concat!(
    "crosspost/",
    env!("CARGO_PKG_VERSION"),
    " (+https://indieweb.org/POSSE)"
);

/// Shared HTTP client. Cheap to clone.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a client whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            // ═══════════════════════════════════════════════════════════════
            // TLS
            // ═══════════════════════════════════════════════════════════════
            .use_rustls_tls()
            // ═══════════════════════════════════════════════════════════════
            // COMPRESSION (auto-negotiated via Accept-Encoding)
            // ═══════════════════════════════════════════════════════════════
            .brotli(true)
            .gzip(true)
            .deflate(true)
            // ═══════════════════════════════════════════════════════════════
            // TIMEOUTS
            // ═══════════════════════════════════════════════════════════════
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .timeout(timeout)
            // ═══════════════════════════════════════════════════════════════
            // REDIRECTS
            // ═══════════════════════════════════════════════════════════════
            .redirect(reqwest::redirect::Policy::limited(10))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client })
    }

    /// GET `url`, failing on non-success status.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<Response> {
        debug!("Fetching");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!(status = %status, version = ?response.version(), "Response received");
        if !status.is_success() {
            bail!("HTTP {status} for {url}");
        }
        Ok(response)
    }

    /// Fetch and return the body as text, with the final URL after
    /// redirects. Bodies over `max_len` bytes are refused.
    pub async fn fetch_text(&self, url: &str, max_len: usize) -> Result<(String, url::Url)> {
        let response = self.fetch(url).await?;
        check_declared_len(&response, max_len)?;
        let final_url = response.url().clone();
        let text = response.text().await?;
        if text.len() > max_len {
            bail!("response of {} bytes exceeds limit of {max_len}", text.len());
        }
        Ok((text, final_url))
    }

    /// Fetch and return the body bytes, refusing bodies over `max_len`.
    pub async fn fetch_bytes(&self, url: &str, max_len: usize) -> Result<Vec<u8>> {
        let response = self.fetch(url).await?;
        check_declared_len(&response, max_len)?;
        let bytes = response.bytes().await?;
        if bytes.len() > max_len {
            bail!("response of {} bytes exceeds limit of {max_len}", bytes.len());
        }
        Ok(bytes.to_vec())
    }
}

/// Refuse early when `Content-Length` already exceeds `max_len`.
fn check_declared_len(response: &Response, max_len: usize) -> Result<()> {
    if let Some(len) = response.content_length() {
        if usize::try_from(len).map_or(true, |len| len > max_len) {
            bail!("response of {len} bytes exceeds limit of {max_len}");
        }
    }
    Ok(())
}
