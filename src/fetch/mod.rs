//! Page fetchers.
//!
//! This module contains the two interchangeable ways of retrieving the HTML
//! of a search result page:
//!
//! | Strategy | Type | Notes |
//! |----------|------|-------|
//! | Static | [`http::HttpFetcher`] | Plain GET with a browser-like User-Agent |
//! | Rendered | [`browser::BrowserFetcher`] | Headless Chromium; `browser` feature only |
//!
//! # Common Patterns
//!
//! Every fetcher implements [`PageFetcher`]. Fetchers report failures as
//! [`FetchError`]; the driver turns any failure into an empty document so a
//! single bad URL only costs that URL's results.

#[cfg(feature = "browser")]
pub mod browser;
pub mod http;

use crate::config::{Config, Strategy};
#[cfg(feature = "browser")]
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Why a page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[cfg(feature = "browser")]
    #[error("browser command failed: {0}")]
    Browser(#[from] chromiumoxide::error::CdpError),

    #[error("browser could not be started: {0}")]
    Launch(String),

    #[cfg(feature = "browser")]
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Retrieve the HTML of one page.
pub trait PageFetcher {
    /// Fetch `url` and return the document as text.
    async fn fetch(&self, url: &Url) -> Result<String, FetchError>;
}

/// The fetcher selected by [`Strategy`].
pub enum Fetcher {
    Http(http::HttpFetcher),
    #[cfg(feature = "browser")]
    Browser(browser::BrowserFetcher),
}

impl Fetcher {
    /// Build the fetcher the configuration asks for.
    pub fn from_config(config: &Config) -> Result<Self, FetchError> {
        match config.strategy {
            Strategy::Static => Ok(Self::Http(http::HttpFetcher::new(config.timeout)?)),
            #[cfg(feature = "browser")]
            Strategy::Rendered => Ok(Self::Browser(browser::BrowserFetcher::new(
                config.browser.clone(),
            ))),
            #[cfg(not(feature = "browser"))]
            Strategy::Rendered => Err(FetchError::Launch(
                "built without the `browser` feature".to_string(),
            )),
        }
    }

    /// Release any resources held by the fetcher.
    pub async fn shutdown(self) {
        match self {
            Self::Http(_) => {}
            #[cfg(feature = "browser")]
            Self::Browser(fetcher) => fetcher.close().await,
        }
    }
}

impl PageFetcher for Fetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        match self {
            Self::Http(fetcher) => fetcher.fetch(url).await,
            #[cfg(feature = "browser")]
            Self::Browser(fetcher) => fetcher.fetch(url).await,
        }
    }
}
