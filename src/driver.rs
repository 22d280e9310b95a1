//! The scrape-and-notify pipeline.
//!
//! Targets are processed strictly one after another:
//! 1. **Fetch** the page (a failure counts as an empty page)
//! 2. **Extract** job cards from it
//! 3. **Accumulate** the postings, in target order then document order
//!
//! Once every target is done the accumulated postings are handed to the
//! notifier in a single call, or not at all when nothing was found.

use crate::extract::extract_jobs;
use crate::fetch::PageFetcher;
use crate::models::JobRecord;
use crate::notify::{Delivery, Notifier};
use crate::seen::SeenStore;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// What happened during one run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of target URLs processed.
    pub targets: usize,
    /// Targets whose fetch failed and were treated as empty pages.
    pub fetch_failures: usize,
    /// Job cards that were found but could not be extracted.
    pub skipped_cards: usize,
    /// Postings dropped because the seen store already knew them.
    pub already_seen: usize,
    /// Postings passed to the notifier, in order.
    pub jobs: Vec<JobRecord>,
    /// Delivery outcome, `None` when there was nothing to send.
    pub delivery: Option<Delivery>,
}

/// Run the pipeline over `targets`.
#[instrument(level = "info", skip_all, fields(targets = targets.len()))]
pub async fn run<F, N, S>(targets: &[Url], fetcher: &F, notifier: &N, seen: &mut S) -> RunSummary
where
    F: PageFetcher,
    N: Notifier,
    S: SeenStore,
{
    let mut summary = RunSummary {
        targets: targets.len(),
        ..RunSummary::default()
    };

    for url in targets {
        info!(%url, "Fetching URL");
        let html = match fetcher.fetch(url).await {
            Ok(html) => html,
            Err(e) => {
                warn!(%url, error = %e, "Fetch failed; treating page as empty");
                summary.fetch_failures += 1;
                String::new()
            }
        };

        let extraction = extract_jobs(&html, Some(url));
        info!(
            %url,
            found = extraction.jobs.len(),
            skipped = extraction.skipped.len(),
            "Found jobs"
        );
        for skipped in &extraction.skipped {
            debug!(%url, index = skipped.index, reason = %skipped.reason, "Card skipped");
        }
        summary.skipped_cards += extraction.skipped.len();

        for job in extraction.jobs {
            if seen.has_seen(&job.uid) {
                debug!(uid = %job.uid, title = %job.title, "Already seen; dropping");
                summary.already_seen += 1;
                continue;
            }
            seen.mark_seen(&job.uid);
            summary.jobs.push(job);
        }
    }

    if summary.jobs.is_empty() {
        info!("No new jobs found");
        return summary;
    }

    info!(count = summary.jobs.len(), "Sending job alert");
    let delivery = notifier.notify(&summary.jobs).await;
    info!(%delivery, "Job alert delivery finished");
    summary.delivery = Some(delivery);
    summary
}
