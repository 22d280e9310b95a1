//! Alert delivery through the Telegram Bot API.
//!
//! All postings collected in a run are rendered into one HTML-formatted
//! message and sent with a single `sendMessage` call. Delivery problems are
//! logged and reported as a [`Delivery`] value; they are never retried and
//! never abort the run.

use crate::config::TelegramConfig;
use crate::models::JobRecord;
use crate::utils::{escape_html, truncate_for_log};
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

const HEADER: &str = "<b>New LinkedIn Job Alerts:</b>\n";

/// Outcome of a delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    /// The endpoint accepted the message.
    Sent,
    /// The endpoint answered with a non-success status.
    Rejected { status: u16, body: String },
    /// The request never got an answer.
    Failed(String),
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Sent => write!(f, "sent"),
            Delivery::Rejected { status, .. } => write!(f, "rejected with status {}", status),
            Delivery::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Something that can deliver a batch of postings.
pub trait Notifier {
    /// Deliver `jobs` as one message.
    async fn notify(&self, jobs: &[JobRecord]) -> Delivery;
}

/// Render the alert message.
///
/// Every posting contributes its title, company, location, posted label and
/// link, in the order given. The UID line is included when `show_uid` is set.
/// Field values are HTML-escaped; the surrounding tags are not.
pub fn format_message(jobs: &[JobRecord], show_uid: bool) -> String {
    let mut message = String::from(HEADER);
    for job in jobs {
        message.push_str(&format!("\n• <b>Title</b>: {}", escape_html(&job.title)));
        message.push_str(&format!("\n  <b>Company</b>: {}", escape_html(&job.company)));
        message.push_str(&format!("\n  <b>Location</b>: {}", escape_html(&job.location)));
        message.push_str(&format!("\n  <b>Posted</b>: {}", escape_html(&job.posted)));
        if show_uid {
            message.push_str(&format!("\n  <b>UID</b>: {}", job.uid));
        }
        message.push_str(&format!("\n  <b>Link</b>: {}\n", escape_html(&job.url)));
    }
    message
}

/// Sends alerts to one Telegram chat.
#[derive(Debug)]
pub struct TelegramNotifier {
    client: Client,
    config: TelegramConfig,
    show_uid: bool,
}

impl TelegramNotifier {
    pub fn new(
        config: TelegramConfig,
        show_uid: bool,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            config,
            show_uid,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.config.api_base, self.config.bot_token)
    }
}

impl Notifier for TelegramNotifier {
    #[instrument(level = "info", skip_all, fields(jobs = jobs.len(), chat_id = %self.config.chat_id))]
    async fn notify(&self, jobs: &[JobRecord]) -> Delivery {
        let text = format_message(jobs, self.show_uid);
        let chars = text.chars().count();
        if chars > TELEGRAM_MESSAGE_LIMIT {
            warn!(
                chars,
                limit = TELEGRAM_MESSAGE_LIMIT,
                "Message exceeds Telegram's length limit; it will likely be rejected"
            );
        }

        let form = [
            ("chat_id", self.config.chat_id.as_str()),
            ("text", text.as_str()),
            ("parse_mode", "HTML"),
        ];
        let response = match self.client.post(self.endpoint()).form(&form).send().await {
            Ok(response) => response,
            Err(e) => {
                // reqwest errors carry the URL, which carries the token.
                let reason = e.without_url().to_string();
                error!(error = %reason, "Failed to send Telegram message");
                return Delivery::Failed(reason);
            }
        };

        let status = response.status();
        if status.is_success() {
            info!(status = status.as_u16(), "Sent Telegram message");
            return Delivery::Sent;
        }

        let body = response.text().await.unwrap_or_default();
        error!(
            status = status.as_u16(),
            body = %truncate_for_log(&body, 300),
            "Failed to send Telegram message"
        );
        Delivery::Rejected {
            status: status.as_u16(),
            body,
        }
    }
}
