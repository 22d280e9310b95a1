//! # Job Alerts
//!
//! Scrapes LinkedIn job search result pages and pushes the postings it finds
//! to a Telegram chat as one HTML-formatted message.
//!
//! ## Features
//!
//! - Fetches pages with a plain HTTP GET or, with the `browser` feature, by
//!   rendering them in headless Chromium (cookies, scrolling, overlay dismissal)
//! - Extracts title, company, location, posted label and link from every job card
//! - Sends a single Telegram Bot API message per run, and nothing when no jobs were found
//! - Optionally drops repeated postings and writes the results to a JSON file
//!
//! ## Usage
//!
//! ```sh
//! TELEGRAM_BOT_TOKEN=... TELEGRAM_USER_ID=... job_alerts
//! ```
//!
//! ## Architecture
//!
//! The application follows a strictly sequential pipeline:
//! 1. **Configuration**: Flags, environment and optional YAML are validated up front
//! 2. **Fetching**: Each target URL is retrieved in turn
//! 3. **Extraction**: Job cards are parsed out of every page
//! 4. **Notification**: All postings go out in one Telegram message

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod driver;
mod extract;
mod fetch;
mod models;
mod notify;
mod outputs;
mod seen;
mod utils;

use cli::Cli;
use config::Config;
use fetch::Fetcher;
use notify::TelegramNotifier;
use outputs::json;
use seen::{ForgetfulStore, MemoryStore};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("job_alerts starting up");

    // --- Configuration: any problem here ends the run before network activity ---
    let args = Cli::parse();
    let config = match Config::load(args) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    debug!(?config, "Loaded configuration");
    info!(
        targets = config.targets.len(),
        strategy = ?config.strategy,
        dedupe = config.dedupe,
        "Configuration ready"
    );

    let fetcher = Fetcher::from_config(&config)?;
    let notifier = TelegramNotifier::new(config.telegram.clone(), config.show_uid, config.timeout)?;

    // ---- Scrape and notify ----
    let summary = if config.dedupe {
        driver::run(&config.targets, &fetcher, &notifier, &mut MemoryStore::default()).await
    } else {
        driver::run(&config.targets, &fetcher, &notifier, &mut ForgetfulStore).await
    };
    fetcher.shutdown().await;

    // ---- JSON output ----
    if let Some(path) = &config.json_out {
        if let Err(e) = json::write_jobs(&summary.jobs, path).await {
            error!(path = %path.display(), error = %e, "Failed to write JSON output");
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        targets = summary.targets,
        fetch_failures = summary.fetch_failures,
        skipped_cards = summary.skipped_cards,
        already_seen = summary.already_seen,
        jobs = summary.jobs.len(),
        delivery = %summary
            .delivery
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "not needed".to_string()),
        "Execution complete"
    );

    Ok(())
}
