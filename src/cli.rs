//! Command-line interface definitions for Job Alerts.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! All arguments can be provided via command-line flags or environment variables,
//! so the binary can run with no arguments at all from a cron job or CI runner.

use crate::config::Strategy;
use clap::Parser;
use std::path::PathBuf;

/// Telegram Bot API host used when none is configured.
pub const DEFAULT_TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Command-line arguments for the Job Alerts application.
///
/// The credentials are optional at the parser level so that their absence is
/// reported as a [`crate::config::ConfigError`] rather than a usage error.
///
/// # Examples
///
/// ```sh
/// # Credentials from the environment, default LinkedIn searches
/// TELEGRAM_BOT_TOKEN=... TELEGRAM_USER_ID=... job_alerts
///
/// # Custom search list, rendered in a headless browser
/// job_alerts --config searches.yaml --strategy rendered
///
/// # Keep a copy of what was found
/// job_alerts --json-out ./out/jobs.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Telegram bot token
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    pub telegram_bot_token: Option<String>,

    /// Telegram chat id that receives the alerts
    #[arg(long, env = "TELEGRAM_USER_ID")]
    pub telegram_user_id: Option<String>,

    /// Pre-authenticated LinkedIn session cookies as a JSON array (rendered strategy only)
    #[arg(long, env = "LINKEDIN_COOKIES", hide_env_values = true)]
    pub linkedin_cookies: Option<String>,

    /// Optional path to a YAML file with target URLs and browser tuning
    #[arg(short, long, env = "JOB_ALERTS_CONFIG")]
    pub config: Option<PathBuf>,

    /// How pages are fetched
    #[arg(short, long, value_enum, env = "JOB_ALERTS_STRATEGY", default_value_t = Strategy::Static)]
    pub strategy: Strategy,

    /// Base URL of the Telegram Bot API
    #[arg(long, env = "TELEGRAM_API_BASE", default_value = DEFAULT_TELEGRAM_API_BASE)]
    pub telegram_api_base: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Leave the UID line out of the alert message
    #[arg(long)]
    pub hide_uid: bool,

    /// Drop postings whose UID was already seen earlier in this run
    #[arg(long)]
    pub dedupe: bool,

    /// Write the collected postings to this JSON file
    #[arg(long)]
    pub json_out: Option<PathBuf>,
}
