//! Runtime configuration.
//!
//! A [`Config`] is built once at startup from the parsed [`Cli`] and an
//! optional YAML file, validated, and then handed to the fetcher, the
//! notifier and the driver. Validation failures are [`ConfigError`]s and
//! abort the run before any network activity.
//!
//! # YAML file
//!
//! ```yaml
//! urls:
//!   - https://www.linkedin.com/jobs/search/?f_TPR=r3600&geoId=102454443&keywords=product%20manager
//! modal_selectors:
//!   - button.modal__dismiss
//! scroll_cycles: 5
//! show_uid: false
//! ```

use crate::cli::Cli;
use clap::ValueEnum;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Searches used when no `urls` are configured.
pub const DEFAULT_TARGETS: [&str; 2] = [
    "https://www.linkedin.com/jobs/search/?currentJobId=4241733995&f_TPR=r3600&geoId=102454443&keywords=product%20manager",
    "https://www.linkedin.com/jobs/search/?currentJobId=4241733995&f_TPR=r3600&geoId=104305776&keywords=product%20manager",
];

/// Overlays LinkedIn shows to signed-out visitors.
pub const DEFAULT_MODAL_SELECTORS: [&str; 2] = [
    "button.modal__dismiss",
    "button.contextual-sign-in-modal__modal-dismiss",
];

const DEFAULT_SCROLL_CYCLES: u32 = 3;

/// How target pages are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Strategy {
    /// Plain HTTP GET.
    Static,
    /// Headless Chromium render (requires the `browser` feature).
    Rendered,
}

/// Everything that can go wrong while building a [`Config`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not set; export it or pass the matching flag")]
    Missing(&'static str),

    #[error("failed to read config file {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}: {source}", path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("LINKEDIN_COOKIES is not a valid JSON cookie list: {0}")]
    Cookies(#[source] serde_json::Error),

    #[error("config file lists no target URLs")]
    NoTargets,

    #[error("invalid target URL {url:?}: {source}")]
    InvalidTarget {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("the rendered strategy needs a build with `--features browser`")]
    BrowserUnavailable,
}

/// Optional settings read from the YAML file.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// `None` falls back to [`DEFAULT_TARGETS`]; an explicit empty list is an error.
    pub urls: Option<Vec<String>>,
    pub modal_selectors: Option<Vec<String>>,
    pub scroll_cycles: Option<u32>,
    pub show_uid: Option<bool>,
}

impl FileConfig {
    /// Read and parse a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// A browser cookie in the shape exported by browser devtools and Playwright.
#[derive(Clone, Deserialize, PartialEq)]
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
#[serde(rename_all = "camelCase")]
pub struct SessionCookie {
    pub name: String,
    pub value: String,
    pub domain: Option<String>,
    pub path: Option<String>,
    /// Seconds since the epoch; zero or negative marks a session cookie.
    pub expires: Option<f64>,
    pub secure: Option<bool>,
    pub http_only: Option<bool>,
}

impl fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCookie")
            .field("name", &self.name)
            .field("value", &"<redacted>")
            .field("domain", &self.domain)
            .field("path", &self.path)
            .finish()
    }
}

/// Parse the cookie blob supplied through `LINKEDIN_COOKIES`.
pub fn parse_cookies(raw: &str) -> Result<Vec<SessionCookie>, ConfigError> {
    serde_json::from_str(raw).map_err(ConfigError::Cookies)
}

/// Where and how to deliver the alert.
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_base: String,
}

impl fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// Knobs for the rendered strategy.
#[derive(Debug, Clone)]
#[cfg_attr(not(feature = "browser"), allow(dead_code))]
pub struct BrowserOptions {
    pub cookies: Vec<SessionCookie>,
    pub modal_selectors: Vec<String>,
    pub scroll_cycles: u32,
    pub navigation_timeout: Duration,
    pub settle_timeout: Duration,
    pub selector_timeout: Duration,
}

/// Validated configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub targets: Vec<Url>,
    pub strategy: Strategy,
    pub timeout: Duration,
    #[cfg_attr(not(feature = "browser"), allow(dead_code))]
    pub browser: BrowserOptions,
    pub show_uid: bool,
    pub dedupe: bool,
    pub json_out: Option<PathBuf>,
}

impl Config {
    /// Build the run configuration from CLI arguments and the optional YAML file.
    pub fn load(cli: Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => {
                let file = FileConfig::load(path)?;
                info!(
                    path = %path.display(),
                    urls = file.urls.as_ref().map_or(0, Vec::len),
                    "Loaded config file"
                );
                file
            }
            None => FileConfig::default(),
        };
        Self::from_parts(cli, file)
    }

    /// Validate and merge already-parsed inputs.
    pub fn from_parts(cli: Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let bot_token = required(cli.telegram_bot_token, "TELEGRAM_BOT_TOKEN")?;
        let chat_id = required(cli.telegram_user_id, "TELEGRAM_USER_ID")?;

        if cli.strategy == Strategy::Rendered && !cfg!(feature = "browser") {
            return Err(ConfigError::BrowserUnavailable);
        }

        let raw_targets: Vec<String> = match file.urls {
            Some(urls) if urls.is_empty() => return Err(ConfigError::NoTargets),
            Some(urls) => urls,
            None => DEFAULT_TARGETS.iter().map(|u| u.to_string()).collect(),
        };
        let targets = raw_targets
            .into_iter()
            .map(|url| {
                let trimmed = url.trim();
                Url::parse(trimmed).map_err(|source| ConfigError::InvalidTarget {
                    url: trimmed.to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let cookies = match cli.linkedin_cookies.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_cookies(raw)?,
            _ => Vec::new(),
        };
        if !cookies.is_empty() && cli.strategy == Strategy::Static {
            warn!(count = cookies.len(), "Session cookies are only used by the rendered strategy");
        }

        let timeout = Duration::from_secs(cli.timeout_secs);
        let browser = BrowserOptions {
            cookies,
            modal_selectors: file.modal_selectors.unwrap_or_else(|| {
                DEFAULT_MODAL_SELECTORS.iter().map(|s| s.to_string()).collect()
            }),
            scroll_cycles: file.scroll_cycles.unwrap_or(DEFAULT_SCROLL_CYCLES),
            navigation_timeout: timeout,
            settle_timeout: Duration::from_secs(15),
            selector_timeout: Duration::from_secs(15),
        };

        Ok(Self {
            telegram: TelegramConfig {
                bot_token,
                chat_id,
                api_base: cli.telegram_api_base.trim_end_matches('/').to_string(),
            },
            targets,
            strategy: cli.strategy,
            timeout,
            browser,
            show_uid: !cli.hide_uid && file.show_uid.unwrap_or(true),
            dedupe: cli.dedupe,
            json_out: cli.json_out,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}
