//! Data models for scraped job postings.
//!
//! This module defines the single domain entity of the application:
//! - [`JobRecord`]: one flat job posting extracted from a search result page
//!
//! Records are built once by the extractor and never mutated afterwards.
//! Every field is always populated: missing source nodes are mapped to the
//! [`MISSING`] sentinel (or an empty string for the link).

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Placeholder used when a text field could not be found on the listing card.
pub const MISSING: &str = "N/A";

/// A job posting as scraped from a listing card.
///
/// # Fields
///
/// * `uid` - Fingerprint of `title` + `company`, see [`job_uid`]
/// * `title` - The job title
/// * `company` - The hiring company
/// * `location` - Free-text location label
/// * `posted` - Relative posting date label such as "2 hours ago"
/// * `url` - Link to the posting; empty when the card has no link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Content fingerprint, 32 lowercase hex characters.
    pub uid: String,
    /// The job title.
    pub title: String,
    /// The hiring company.
    pub company: String,
    /// Location label as shown on the card.
    pub location: String,
    /// Relative date label as shown on the card.
    pub posted: String,
    /// Link to the posting.
    pub url: String,
}

impl JobRecord {
    /// Build a record, computing its `uid` from `title` and `company`.
    pub fn new(
        title: impl Into<String>,
        company: impl Into<String>,
        location: impl Into<String>,
        posted: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        let title = title.into();
        let company = company.into();
        Self {
            uid: job_uid(&title, &company),
            title,
            company,
            location: location.into(),
            posted: posted.into(),
            url: url.into(),
        }
    }
}

/// Compute the fingerprint of a posting.
///
/// The fingerprint is the first 128 bits of SHA-256 over `title` immediately
/// followed by `company`, rendered as lowercase hex. It is an opaque display
/// identifier, not a security primitive.
///
/// Only the title and company feed the digest, so two distinct postings that
/// share both collide to the same uid.
pub fn job_uid(title: &str, company: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(company.as_bytes());
    let digest = hasher.finalize();

    digest[..16].iter().map(|b| format!("{:02x}", b)).collect()
}
