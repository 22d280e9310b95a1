//! Job card extraction from search result HTML.
//!
//! LinkedIn's guest job search renders every posting as a "base search
//! card". This module walks a parsed document, locates each card and pulls
//! five fields out of it by CSS selector:
//!
//! | Field | Selector |
//! |-------|----------|
//! | title | `h3.base-search-card__title` |
//! | company | `h4.base-search-card__subtitle` |
//! | location | `span.job-search-card__location` |
//! | posted | `time` |
//! | link | `a.base-card__full-link` (`href`) |
//!
//! Missing fields degrade to [`MISSING`] (or an empty link when the card has
//! no link anchor). A card that cannot be turned into a record is reported in
//! [`Extraction::skipped`] and the rest of the document is still processed.

use crate::models::{JobRecord, MISSING};
use crate::utils::normalize_text;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

/// Selector matching a listing card.
pub const CARD_SELECTOR: &str = "li.base-search-card, div.base-search-card";

static CARD: Lazy<Selector> = Lazy::new(|| Selector::parse(CARD_SELECTOR).unwrap());
static TITLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h3.base-search-card__title").unwrap());
static COMPANY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h4.base-search-card__subtitle").unwrap());
static LOCATION: Lazy<Selector> =
    Lazy::new(|| Selector::parse("span.job-search-card__location").unwrap());
static POSTED: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.base-card__full-link").unwrap());

/// Why a card was left out of the results.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// The card has a link anchor but the anchor carries no `href`.
    #[error("link anchor has no href")]
    MissingHref,
}

/// A card that was found but could not be turned into a [`JobRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedCard {
    /// Zero-based position of the card in document order.
    pub index: usize,
    /// What went wrong.
    pub reason: SkipReason,
}

/// Result of extracting one document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Successfully extracted records, in document order.
    pub jobs: Vec<JobRecord>,
    /// Cards that were skipped, in document order.
    pub skipped: Vec<SkippedCard>,
}

/// Extract every job card from `html`.
///
/// `base_url` is the page the HTML came from and is used to resolve relative
/// links. Empty or malformed input yields an empty [`Extraction`]; this
/// function never fails as a whole.
#[instrument(level = "debug", skip_all, fields(bytes = html.len()))]
pub fn extract_jobs(html: &str, base_url: Option<&Url>) -> Extraction {
    let mut extraction = Extraction::default();
    if html.trim().is_empty() {
        return extraction;
    }

    let document = Html::parse_document(html);
    let cards = document.select(&CARD).filter(|card| !is_nested_card(card));

    for (index, card) in cards.enumerate() {
        match extract_card(&card, base_url) {
            Ok(job) => {
                debug!(index, title = %job.title, company = %job.company, "Extracted job card");
                extraction.jobs.push(job);
            }
            Err(reason) => {
                warn!(index, reason = %reason, "Failed to parse job card; skipping");
                extraction.skipped.push(SkippedCard { index, reason });
            }
        }
    }

    extraction
}

/// A `div` card inside an `li` card is the same posting; only the outer one counts.
fn is_nested_card(card: &ElementRef<'_>) -> bool {
    card.ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| CARD.matches(&ancestor))
}

fn extract_card(card: &ElementRef<'_>, base_url: Option<&Url>) -> Result<JobRecord, SkipReason> {
    let title = text_of(card, &TITLE);
    let company = text_of(card, &COMPANY);
    let location = text_of(card, &LOCATION);
    let posted = text_of(card, &POSTED);

    let url = match card.select(&LINK).next() {
        Some(anchor) => {
            let href = anchor.value().attr("href").ok_or(SkipReason::MissingHref)?;
            resolve_link(href.trim(), base_url)
        }
        None => String::new(),
    };

    Ok(JobRecord::new(title, company, location, posted, url))
}

fn text_of(card: &ElementRef<'_>, selector: &Selector) -> String {
    card.select(selector)
        .next()
        .map(|el| normalize_text(&el.text().collect::<String>()))
        .unwrap_or_else(|| MISSING.to_string())
}

/// Relative hrefs are joined onto `base_url`; anything else is kept as written.
fn resolve_link(href: &str, base_url: Option<&Url>) -> String {
    if href.is_empty() {
        return String::new();
    }
    match (Url::parse(href), base_url) {
        (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => match base.join(href) {
            Ok(joined) => joined.to_string(),
            Err(e) => {
                debug!(href, error = %e, "Could not resolve link; keeping it as is");
                href.to_string()
            }
        },
        _ => href.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job_uid;

    fn card(title: &str, company: &str, location: Option<&str>, posted: &str, href: &str) -> String {
        let location = location
            .map(|l| format!(r#"<span class="job-search-card__location">{}</span>"#, l))
            .unwrap_or_default();
        format!(
            r#"<li class="base-search-card">
                <a class="base-card__full-link" href="{href}"><span class="sr-only">{title}</span></a>
                <div class="base-search-card__info">
                    <h3 class="base-search-card__title">
                        {title}
                    </h3>
                    <h4 class="base-search-card__subtitle"><a href="/company">{company}</a></h4>
                    <div class="base-search-card__metadata">
                        {location}
                        <time class="job-search-card__listdate" datetime="2025-06-01">{posted}</time>
                    </div>
                </div>
            </li>"#
        )
    }

    fn page(cards: &[String]) -> String {
        format!(
            r#"<html><body><ul class="jobs-search__results-list">{}</ul></body></html>"#,
            cards.join("\n")
        )
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert_eq!(extract_jobs("", None), Extraction::default());
        assert_eq!(extract_jobs("   \n", None), Extraction::default());
    }

    #[test]
    fn test_document_without_cards_yields_nothing() {
        let html = "<html><body><ul><li class=\"other\">Sign in</li></ul></body></html>";
        let extraction = extract_jobs(html, None);
        assert!(extraction.jobs.is_empty());
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_malformed_html_does_not_panic() {
        let html = "<li class=\"base-search-card\"><h3 class=\"base-search-card__title\">Dev</h3>\
                    <span class=\"job-search-card__location\">Remote";
        let extraction = extract_jobs(html, None);
        assert_eq!(extraction.jobs.len(), 1);
        assert_eq!(extraction.jobs[0].title, "Dev");
        assert_eq!(extraction.jobs[0].location, "Remote");
    }

    #[test]
    fn test_extracts_cards_in_document_order() {
        let html = page(&[
            card("First", "A", Some("Dubai"), "1 hour ago", "https://example.com/job/1"),
            card("Second", "B", Some("Riyadh"), "2 hours ago", "https://example.com/job/2"),
            card("Third", "C", Some("Doha"), "3 hours ago", "https://example.com/job/3"),
        ]);
        let extraction = extract_jobs(&html, None);
        let titles: Vec<&str> = extraction.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Second", "Third"]);
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_missing_location_degrades_to_sentinel() {
        let html = page(&[
            card("Product Manager", "Acme Corp", Some("Dubai"), "2 hours ago", "https://example.com/job/1"),
            card("Product Owner", "Globex", None, "5 hours ago", "https://example.com/job/2"),
        ]);
        let extraction = extract_jobs(&html, None);
        assert_eq!(extraction.jobs.len(), 2);

        let first = &extraction.jobs[0];
        assert_eq!(first.title, "Product Manager");
        assert_eq!(first.company, "Acme Corp");
        assert_eq!(first.location, "Dubai");
        assert_eq!(first.posted, "2 hours ago");
        assert_eq!(first.url, "https://example.com/job/1");
        assert_eq!(first.uid, job_uid("Product Manager", "Acme Corp"));

        let second = &extraction.jobs[1];
        assert_eq!(second.title, "Product Owner");
        assert_eq!(second.company, "Globex");
        assert_eq!(second.location, MISSING);
        assert_eq!(second.posted, "5 hours ago");
    }

    #[test]
    fn test_bare_card_gets_all_sentinels() {
        let html = page(&[r#"<li class="base-search-card"><p>Promoted</p></li>"#.to_string()]);
        let extraction = extract_jobs(&html, None);
        assert_eq!(extraction.jobs.len(), 1);

        let job = &extraction.jobs[0];
        assert_eq!(job.title, MISSING);
        assert_eq!(job.company, MISSING);
        assert_eq!(job.location, MISSING);
        assert_eq!(job.posted, MISSING);
        assert_eq!(job.url, "");
        assert_eq!(job.uid, job_uid(MISSING, MISSING));
    }

    #[test]
    fn test_card_without_anchor_gives_empty_link() {
        let html = page(&[r#"<li class="base-search-card">
            <h3 class="base-search-card__title">Dev</h3>
        </li>"#
            .to_string()]);
        let extraction = extract_jobs(&html, None);
        assert_eq!(extraction.jobs[0].url, "");
        assert!(extraction.skipped.is_empty());
    }

    #[test]
    fn test_anchor_without_href_skips_only_that_card() {
        let html = page(&[
            card("Good", "A", Some("Dubai"), "now", "https://example.com/job/1"),
            r#"<li class="base-search-card">
                <a class="base-card__full-link">x</a>
                <h3 class="base-search-card__title">No href</h3>
            </li>"#
                .to_string(),
            card("Also good", "C", Some("Dubai"), "now", "https://example.com/job/3"),
        ]);
        let extraction = extract_jobs(&html, None);

        let titles: Vec<&str> = extraction.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Good", "Also good"]);
        assert_eq!(
            extraction.skipped,
            vec![SkippedCard {
                index: 1,
                reason: SkipReason::MissingHref,
            }]
        );
    }

    #[test]
    fn test_relative_link_resolved_against_page() {
        let base = Url::parse("https://www.linkedin.com/jobs/search/?keywords=pm").unwrap();
        let html = page(&[card("PM", "Acme", Some("Dubai"), "now", "/jobs/view/42")]);
        let extraction = extract_jobs(&html, Some(&base));
        assert_eq!(extraction.jobs[0].url, "https://www.linkedin.com/jobs/view/42");
    }

    #[test]
    fn test_relative_link_kept_without_base() {
        let html = page(&[card("PM", "Acme", Some("Dubai"), "now", "/jobs/view/42")]);
        let extraction = extract_jobs(&html, None);
        assert_eq!(extraction.jobs[0].url, "/jobs/view/42");
    }

    #[test]
    fn test_absolute_link_kept_verbatim() {
        let href = "https://ae.linkedin.com/jobs/view/product-manager-at-acme-42?refId=abc&amp;trackingId=x";
        let html = page(&[card("PM", "Acme", Some("Dubai"), "now", href)]);
        let extraction = extract_jobs(&html, None);
        assert_eq!(
            extraction.jobs[0].url,
            "https://ae.linkedin.com/jobs/view/product-manager-at-acme-42?refId=abc&trackingId=x"
        );
    }

    #[test]
    fn test_unparseable_link_kept_as_written() {
        let base = Url::parse("https://www.linkedin.com/jobs/search/").unwrap();
        let html = page(&[
            card("PM", "Acme", Some("Dubai"), "now", "  https://exa mple.com/job/1 "),
            card("Ops", "Acme", Some("Dubai"), "now", "http://[::1"),
        ]);
        let extraction = extract_jobs(&html, Some(&base));

        assert!(extraction.skipped.is_empty());
        assert_eq!(extraction.jobs.len(), 2);
        assert_eq!(extraction.jobs[0].title, "PM");
        assert_eq!(extraction.jobs[0].url, "https://exa mple.com/job/1");
        assert_eq!(extraction.jobs[1].url, "http://[::1");
    }

    #[test]
    fn test_nested_div_card_counted_once() {
        let html = r#"<ul>
            <li class="base-search-card">
                <div class="base-card base-search-card">
                    <h3 class="base-search-card__title">Nested</h3>
                </div>
            </li>
            <li><div class="base-card base-search-card">
                <h3 class="base-search-card__title">Div only</h3>
            </div></li>
        </ul>"#;
        let extraction = extract_jobs(html, None);
        let titles: Vec<&str> = extraction.jobs.iter().map(|j| j.title.as_str()).collect();
        assert_eq!(titles, vec!["Nested", "Div only"]);
    }

    #[test]
    fn test_uid_stable_across_extractions() {
        let a = page(&[card("PM", "Acme", Some("Dubai"), "1 hour ago", "https://example.com/1")]);
        let b = page(&[card("PM", "Acme", None, "1 week ago", "https://example.com/2")]);
        let first = extract_jobs(&a, None);
        let second = extract_jobs(&b, None);
        assert_eq!(first.jobs[0].uid, second.jobs[0].uid);
    }

    #[test]
    fn test_whitespace_inside_fields_is_normalized() {
        let html = page(&[r#"<li class="base-search-card">
            <h3 class="base-search-card__title">
                Senior
                <strong>Product</strong>   Manager
            </h3>
        </li>"#
            .to_string()]);
        let extraction = extract_jobs(&html, None);
        assert_eq!(extraction.jobs[0].title, "Senior Product Manager");
    }
}
