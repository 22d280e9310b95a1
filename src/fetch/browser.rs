//! Rendered page fetching through headless Chromium.
//!
//! Signed-out LinkedIn pages load more cards as the visitor scrolls and
//! sometimes cover the list with a sign-in overlay. The rendered strategy
//! drives a real browser through that:
//!
//! 1. inject the configured session cookies
//! 2. navigate (bounded by the navigation timeout)
//! 3. wait for the network to go quiet, or a fixed delay if that can't be measured
//! 4. scroll to the bottom a few times with a jittered pause
//! 5. click away known overlays
//! 6. wait for the first job card to be attached
//! 7. snapshot the DOM
//!
//! The browser is launched on the first fetch and reused for the rest of the run.

use super::{FetchError, PageFetcher};
use crate::config::{BrowserOptions, SessionCookie};
use crate::extract::CARD_SELECTOR;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{CookieParam, TimeSinceEpoch};
use chromiumoxide::Page;
use futures::StreamExt;
use rand::{rng, Rng};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument, warn};
use url::Url;

const SETTLE_FALLBACK: Duration = Duration::from_secs(3);
const SCROLL_PAUSE_MS: std::ops::RangeInclusive<u64> = 1_000..=2_000;

struct BrowserSession {
    browser: Browser,
    handler_task: JoinHandle<()>,
}

/// Fetches pages by rendering them in headless Chromium.
pub struct BrowserFetcher {
    options: BrowserOptions,
    session: OnceCell<BrowserSession>,
}

impl BrowserFetcher {
    pub fn new(options: BrowserOptions) -> Self {
        Self {
            options,
            session: OnceCell::new(),
        }
    }

    /// Close the browser if it was ever started.
    pub async fn close(self) {
        if let Some(mut session) = self.session.into_inner() {
            info!("Closing browser");
            if let Err(e) = session.browser.close().await {
                debug!(error = %e, "Browser close failed");
            }
            let _ = session.browser.wait().await;
            session.handler_task.abort();
        }
    }

    async fn render(&self, page: &Page, url: &Url) -> Result<String, FetchError> {
        let opts = &self.options;

        if !opts.cookies.is_empty() {
            let cookies = opts
                .cookies
                .iter()
                .map(|c| cookie_param(c, url))
                .collect::<Vec<_>>();
            page.set_cookies(cookies).await?;
            debug!(count = opts.cookies.len(), "Injected session cookies");
        }

        timeout(opts.navigation_timeout, page.goto(url.as_str()))
            .await
            .map_err(|_| FetchError::Timeout(opts.navigation_timeout))??;
        info!("Navigation finished");

        wait_for_network_idle(page, opts.settle_timeout).await;

        for cycle in 1..=opts.scroll_cycles {
            if let Err(e) = page
                .evaluate("window.scrollTo(0, document.body.scrollHeight)")
                .await
            {
                warn!(cycle, error = %e, "Scroll failed");
                break;
            }
            let pause = Duration::from_millis(rng().random_range(SCROLL_PAUSE_MS));
            debug!(cycle, ?pause, "Scrolled; waiting for lazy content");
            sleep(pause).await;
        }

        for selector in &opts.modal_selectors {
            if let Ok(element) = page.find_element(selector.as_str()).await {
                match element.click().await {
                    Ok(_) => info!(%selector, "Dismissed overlay"),
                    Err(e) => debug!(%selector, error = %e, "Overlay click failed"),
                }
            }
        }

        if !wait_for_selector(page, CARD_SELECTOR, opts.selector_timeout).await {
            warn!(
                selector = CARD_SELECTOR,
                timeout = ?opts.selector_timeout,
                "Job cards never appeared; returning page as is"
            );
        }

        Ok(page.content().await?)
    }
}

impl PageFetcher for BrowserFetcher {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let session = self.session.get_or_try_init(launch).await?;
        let page = session.browser.new_page("about:blank").await?;

        let result = self.render(&page, url).await;
        if let Err(e) = page.close().await {
            debug!(error = %e, "Page close failed");
        }

        if let Ok(html) = &result {
            info!(bytes = html.len(), "Rendered page");
        }
        result
    }
}

#[instrument(level = "info")]
async fn launch() -> Result<BrowserSession, FetchError> {
    let config = BrowserConfig::builder()
        .arg("--no-sandbox")
        .arg("--disable-dev-shm-usage")
        .build()
        .map_err(FetchError::Launch)?;

    let (browser, mut handler) = Browser::launch(config).await?;
    let handler_task = tokio::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                warn!(error = %e, "chromiumoxide handler event error");
            }
        }
    });

    info!("Launched headless browser");
    Ok(BrowserSession {
        browser,
        handler_task,
    })
}

/// Cookies without a domain are scoped to the page being fetched.
fn cookie_param(cookie: &SessionCookie, url: &Url) -> CookieParam {
    let mut param = CookieParam::new(cookie.name.clone(), cookie.value.clone());
    param.domain = cookie.domain.clone();
    param.path = cookie.path.clone();
    param.secure = cookie.secure;
    param.http_only = cookie.http_only;
    param.expires = cookie
        .expires
        .filter(|secs| *secs > 0.0)
        .map(TimeSinceEpoch::new);
    if param.domain.is_none() {
        param.url = Some(url.to_string());
    }
    param
}

/// Poll until resource loading has been quiet for a second, bounded by `limit`.
async fn wait_for_network_idle(page: &Page, limit: Duration) {
    let js = format!(
        r#"(async () => {{
            const timeoutMs = {timeout_ms};
            const idleMs = 1000;
            const interval = 250;
            const start = Date.now();
            let last = performance.getEntriesByType('resource').length;
            let stable = 0;
            while (Date.now() - start < timeoutMs) {{
                await new Promise(r => setTimeout(r, interval));
                const cur = performance.getEntriesByType('resource').length;
                if (document.readyState === 'complete' && cur === last) {{
                    stable += interval;
                    if (stable >= idleMs) return true;
                }} else {{
                    stable = 0;
                }}
                last = cur;
            }}
            return false;
        }})()"#,
        timeout_ms = limit.as_millis()
    );

    let outcome = timeout(limit + Duration::from_secs(5), page.evaluate(js)).await;
    match outcome {
        Ok(Ok(value)) => match value.into_value::<bool>() {
            Ok(true) => debug!("Network idle"),
            _ => warn!(?limit, "Network never went idle"),
        },
        Ok(Err(e)) => {
            warn!(error = %e, fallback = ?SETTLE_FALLBACK, "Network idle check failed; sleeping instead");
            sleep(SETTLE_FALLBACK).await;
        }
        Err(_) => warn!(?limit, "Network idle check hung"),
    }
}

/// Poll for `selector` to be attached, bounded by `limit`. Returns whether it showed up.
async fn wait_for_selector(page: &Page, selector: &str, limit: Duration) -> bool {
    let quoted = match serde_json::to_string(selector) {
        Ok(q) => q,
        Err(_) => return false,
    };
    let js = format!(
        r#"(async () => {{
            const deadline = Date.now() + {timeout_ms};
            while (Date.now() < deadline) {{
                if (document.querySelector({quoted})) return true;
                await new Promise(r => setTimeout(r, 250));
            }}
            return false;
        }})()"#,
        timeout_ms = limit.as_millis(),
        quoted = quoted
    );

    match timeout(limit + Duration::from_secs(5), page.evaluate(js)).await {
        Ok(Ok(value)) => value.into_value::<bool>().unwrap_or(false),
        Ok(Err(e)) => {
            warn!(error = %e, "Selector wait failed");
            false
        }
        Err(_) => false,
    }
}
