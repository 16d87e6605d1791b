//! Latest version lookup on the release page.
//!
//! The release page is HTML owned by a third party. The latest version is read
//! from the first element matching a CSS selector (see
//! [`DEFAULT_LATEST_SELECTOR`](crate::config::DEFAULT_LATEST_SELECTOR)).
//! That selector is positional, so a redesign of the page breaks the lookup
//! and surfaces as [`GeckoDriverError::UnknownVersion`].

use scraper::{Html, Selector};

use crate::config::DriverConfig;
use crate::errors::{GeckoDriverError, Result};
use crate::http::HttpClient;
use crate::version::Version;

/// Fetches the release page and returns the version labelled latest.
///
/// # Errors
///
/// Returns a catch-all connectivity error if the page cannot be fetched and
/// [`GeckoDriverError::UnknownVersion`] if no valid version is found on it.
pub async fn latest_version(client: &HttpClient, config: &DriverConfig) -> Result<Version> {
    tracing::debug!(url = %config.releases_url, "fetching release page");
    let html = client.fetch_text(&config.releases_url).await?;
    let version = parse_latest_version(&html, &config.latest_selector)?;
    tracing::debug!(%version, "resolved latest version");
    Ok(version)
}

/// Extracts the latest version from release page markup.
///
/// The text of the first element matching `selector` is trimmed and a single
/// leading `v` (as in tag names like `v0.34.0`) is dropped before validation.
///
/// # Errors
///
/// Returns [`GeckoDriverError::UnknownVersion`] if the selector is invalid,
/// matches nothing, or the matched text is not a version.
pub fn parse_latest_version(html: &str, selector: &str) -> Result<Version> {
    let selector = Selector::parse(selector).map_err(|e| {
        GeckoDriverError::other(format!("invalid latest version selector '{selector}': {e:?}"))
    })?;

    let document = Html::parse_document(html);
    let Some(element) = document.select(&selector).next() else {
        tracing::warn!("latest version label not found, the release page layout may have changed");
        return Err(GeckoDriverError::unknown_version(""));
    };

    let text = element.text().collect::<String>();
    let text = text.trim();
    let candidate = text.strip_prefix('v').unwrap_or(text);
    Version::parse(candidate).map_err(|_| GeckoDriverError::unknown_version(text))
}
