//! HTTP access to the device's `home.cgi` status page
//!
//! One GET per call, bounded by the configured timeout, no retries. Every
//! failure (connect, DNS, timeout, non-2xx, unreadable body) comes back as a
//! [`TransportError`]; callers are not expected to tell them apart.

use crate::error::{Result, ZeverError};
use crate::logging::get_logger;
use reqwest::{Client, Url};
use std::time::Duration;
use thiserror::Error;

/// Path of the status page, relative to the device base URL
pub const STATUS_PATH: &str = "home.cgi";

/// Network or HTTP failure while fetching the status page
#[derive(Debug, Clone, Error)]
#[error("request to {url} failed: {message}")]
pub struct TransportError {
    pub url: String,
    pub message: String,
}

impl TransportError {
    pub fn new<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self {
            url: url.into(),
            message: message.into(),
        }
    }

    fn from_reqwest(url: &str, err: &reqwest::Error) -> Self {
        let mut message = if err.is_timeout() {
            "timed out".to_string()
        } else if let Some(status) = err.status() {
            format!("HTTP status {}", status)
        } else {
            err.to_string()
        };
        // reqwest keeps the interesting part (refused, DNS) in the source chain
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        Self::new(url, message)
    }
}

/// Source of raw status payloads
#[async_trait::async_trait]
pub trait DeviceFetcher: Send + Sync {
    /// Fetch the raw status page text
    async fn fetch(&self) -> std::result::Result<String, TransportError>;

    /// URL being polled, for logs
    fn endpoint(&self) -> &str;
}

/// Build `{base_url}/home.cgi`, tolerating a trailing slash on the base.
pub fn status_url(base_url: &str) -> Result<Url> {
    let base = format!("{}/", base_url.trim().trim_end_matches('/'));
    let base = Url::parse(&base)
        .map_err(|e| ZeverError::validation("device.base_url", e.to_string()))?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ZeverError::validation(
            "device.base_url",
            format!("unsupported scheme {}", base.scheme()),
        ));
    }
    base.join(STATUS_PATH)
        .map_err(|e| ZeverError::validation("device.base_url", e.to_string()))
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
    url: Url,
    timeout: Duration,
    logger: crate::logging::StructuredLogger,
}

impl HttpFetcher {
    /// Create a fetcher for the device at `base_url`
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let url = status_url(base_url)?;
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        let logger = get_logger("fetcher");
        logger.debug(&format!(
            "Polling {} with a {}s timeout",
            url,
            timeout.as_secs_f64()
        ));
        Ok(Self {
            client,
            url,
            timeout,
            logger,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait::async_trait]
impl DeviceFetcher for HttpFetcher {
    async fn fetch(&self) -> std::result::Result<String, TransportError> {
        let url = self.url.as_str();
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| TransportError::from_reqwest(url, &e))?;
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::from_reqwest(url, &e))?;
        self.logger
            .trace(&format!("Received {} bytes from {}", body.len(), url));
        Ok(body)
    }

    fn endpoint(&self) -> &str {
        self.url.as_str()
    }
}

/// One-shot fetch of `{base_url}/home.cgi`
pub async fn fetch(base_url: &str, timeout: Duration) -> std::result::Result<String, TransportError> {
    let fetcher = HttpFetcher::new(base_url, timeout)
        .map_err(|e| TransportError::new(base_url, e.to_string()))?;
    fetcher.fetch().await
}
