//! Static page fetching over plain HTTP.
//!
//! LinkedIn serves its guest job search pages as server-rendered HTML, so a
//! single GET with a desktop browser User-Agent is usually enough. The body
//! is handed back whatever the status code: an error page simply contains no
//! job cards.

use super::{FetchError, PageFetcher};
use reqwest::Client;
use std::time::Duration;
use tracing::{info, instrument, warn};
use url::Url;

/// User-Agent sent with every request.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Fetches pages with a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            info!(status = status.as_u16(), bytes = body.len(), "Fetched page");
        } else {
            warn!(
                status = status.as_u16(),
                bytes = body.len(),
                "Non-success status; passing body through"
            );
        }
        Ok(body)
    }
}
