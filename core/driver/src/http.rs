//! HTTP client shared by the resolver, the URL builder and the retriever.
//!
//! Every client carries an explicit timeout and user agent. HEAD probes use a
//! separate client that does not follow redirects, because release assets
//! answer with `302 Found` pointing at a storage host.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::redirect::Policy;

use crate::config::DriverConfig;
use crate::errors::{GeckoDriverError, Result};

/// Checks whether a candidate asset URL exists.
#[allow(async_fn_in_trait)]
pub trait AssetProbe {
    /// Returns `Ok(true)` if `url` answers with 200 or 302.
    ///
    /// # Errors
    ///
    /// Returns an error if the request could not be completed at all.
    async fn probe(&self, url: &str) -> Result<bool>;
}

/// Status codes that mark a download URL as valid.
#[must_use]
pub fn is_available_status(status: StatusCode) -> bool {
    status == StatusCode::OK || status == StatusCode::FOUND
}

/// `reqwest` clients configured from a [`DriverConfig`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    probe_client: reqwest::Client,
    download_timeout: Duration,
}

impl HttpClient {
    /// Builds the clients.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &DriverConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| GeckoDriverError::other_with_source("Failed to create HTTP client", e))?;

        let probe_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(Policy::none())
            .build()
            .map_err(|e| GeckoDriverError::other_with_source("Failed to create HTTP client", e))?;

        Ok(Self {
            client,
            probe_client,
            download_timeout: config.download_timeout,
        })
    }

    /// Fetches a page and returns its body as text.
    ///
    /// # Errors
    ///
    /// Returns a catch-all connectivity error if the request fails or the
    /// server answers with a non-success status.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GeckoDriverError::other_with_source(format!("Could not fetch from {url}"), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeckoDriverError::other(format!(
                "Could not fetch from {url} (HTTP {})",
                status.as_u16()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| GeckoDriverError::other_with_source(format!("Failed to read response from {url}"), e))
    }

    /// Starts a GET request for an archive download.
    ///
    /// # Errors
    ///
    /// Returns a download error on connection failures and non-success statuses.
    pub async fn get_archive(&self, url: &str) -> Result<reqwest::Response> {
        let response = self
            .client
            .get(url)
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(|e| GeckoDriverError::download_error_with_source(format!("Failed to connect to {url}"), e))?;

        if !response.status().is_success() {
            return Err(GeckoDriverError::download_error(format!(
                "HTTP error {}: {url}",
                response.status()
            )));
        }

        Ok(response)
    }
}

impl AssetProbe for HttpClient {
    async fn probe(&self, url: &str) -> Result<bool> {
        let response = self
            .probe_client
            .head(url)
            .send()
            .await
            .map_err(|e| GeckoDriverError::other_with_source(format!("Could not reach {url}"), e))?;

        let status = response.status();
        tracing::debug!(%url, status = status.as_u16(), "probed download url");
        Ok(is_available_status(status))
    }
}
