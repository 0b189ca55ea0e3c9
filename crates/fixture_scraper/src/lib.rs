//! Odibets + Flashscore fixture scrapers
//!
//! Both listings are rendered client-side most of the time, so a plain GET
//! often returns a shell without a single fixture row. `FetchMode::Auto`
//! tries HTTP first and falls back to headless Chrome.

pub mod config;
pub mod listing;
pub mod sources;

pub use config::{FetchMode, ScrapeConfig};
pub use listing::{ListingLayout, ParsedListing};
pub use sources::{FixtureSource, FlashscoreSource, ListingScraper, OdibetsSource};

use anyhow::{Context, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use std::path::PathBuf;
use std::time::Duration;
use tokio::task;
use tracing::{debug, info, warn};

const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";
const COOKIE_BUTTON: &str = "#onetrust-accept-btn-handler";
const COOKIE_WAIT: Duration = Duration::from_secs(5);

/// Retrieves listing HTML over HTTP, headless Chrome, or both.
pub struct PageFetcher {
    client:       reqwest::Client,
    mode:         FetchMode,
    browser_wait: Duration,
    chrome_path:  Option<PathBuf>,
}

impl PageFetcher {
    pub fn new(config: &ScrapeConfig) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_UA));
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        Self {
            client: reqwest::Client::builder()
                .default_headers(headers)
                .timeout(Duration::from_secs(config.http_timeout_secs))
                .gzip(true)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            mode:         config.fetch_mode,
            browser_wait: Duration::from_secs(config.browser_wait_secs),
            chrome_path:  config.chrome_path.clone(),
        }
    }

    pub fn mode(&self) -> FetchMode {
        self.mode
    }

    pub async fn fetch_listing(&self, url: &str, layout: &ListingLayout) -> Result<String> {
        match self.mode {
            FetchMode::Http => self.fetch_html_http(url).await,
            FetchMode::Browser => self.fetch_html_browser(url, layout.row_css).await,
            FetchMode::Auto => match self.fetch_html_http(url).await {
                Ok(html) if layout.count_rows(&html) > 0 => Ok(html),
                Ok(_) => {
                    info!("{} has no {} rows over HTTP, rendering in Chrome", url, layout.row_css);
                    self.fetch_html_browser(url, layout.row_css).await
                }
                Err(err) => {
                    warn!("HTTP fetch of {} failed ({:#}), trying browser fallback", url, err);
                    self.fetch_html_browser(url, layout.row_css).await
                }
            },
        }
    }

    async fn fetch_html_http(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request failed for {}", url))?;

        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("{} HTTP {}", url, status);
        }

        Ok(resp.text().await?)
    }

    async fn fetch_html_browser(&self, url: &str, ready_selector: &'static str) -> Result<String> {
        let url = url.to_string();
        let wait = self.browser_wait;
        let chrome_path = self.chrome_path.clone();

        let html = task::spawn_blocking(move || -> Result<String> {
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .path(chrome_path)
                .build()
                .context("Failed to build Chrome launch options")?;

            let browser = Browser::new(options).context("Failed to launch Chrome")?;
            let tab = browser.new_tab().context("Failed to create browser tab")?;

            tab.navigate_to(&url).context("Chrome navigate failed")?;
            tab.wait_until_navigated().context("Chrome navigation never settled")?;
            dismiss_cookie_banner(&tab);

            if let Err(e) = tab.wait_for_element_with_custom_timeout(ready_selector, wait) {
                debug!("{} never showed up on {} ({})", ready_selector, url, e);
            }

            tab.get_content().context("Failed to read HTML from browser tab")
        })
        .await??;

        Ok(html)
    }
}

/// Click the cookie/GDPR banner if it shows up.
fn dismiss_cookie_banner(tab: &Tab) {
    match tab.wait_for_element_with_custom_timeout(COOKIE_BUTTON, COOKIE_WAIT) {
        Ok(button) => match button.click() {
            Ok(_) => debug!("cookie banner accepted"),
            Err(e) => debug!("cookie banner click failed: {}", e),
        },
        Err(_) => debug!("no cookie banner"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<div class="match-event"><div class="event-time">19:30</div><div class="event-title">Gor Mahia</div></div>"#;

    fn fetcher(mode: FetchMode) -> PageFetcher {
        PageFetcher::new(&ScrapeConfig {
            fetch_mode:        mode,
            http_timeout_secs: 5,
            browser_wait_secs: 1,
            // keeps the browser fallback from ever finding a real Chrome
            chrome_path:       Some(PathBuf::from("/nonexistent/fixture-watch/chrome")),
            ..ScrapeConfig::default()
        })
    }

    #[tokio::test]
    async fn auto_keeps_http_page_that_has_rows() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/ke/oditoday")
            .with_status(200)
            .with_body(LISTING)
            .expect(1)
            .create_async()
            .await;

        let html = fetcher(FetchMode::Auto)
            .fetch_listing(&format!("{}/ke/oditoday", server.url()), &ListingLayout::odibets())
            .await
            .unwrap();

        assert!(html.contains("Gor Mahia"));
        page.assert_async().await;
    }

    #[tokio::test]
    async fn auto_falls_back_to_browser_when_http_fails() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/ke/oditoday")
            .with_status(503)
            .expect(1)
            .create_async()
            .await;

        let err = fetcher(FetchMode::Auto)
            .fetch_listing(&format!("{}/ke/oditoday", server.url()), &ListingLayout::odibets())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("Failed to launch Chrome"), "{err:#}");
        page.assert_async().await;
    }

    #[tokio::test]
    async fn auto_falls_back_to_browser_when_http_page_has_no_rows() {
        let mut server = mockito::Server::new_async().await;
        let page = server
            .mock("GET", "/ke/oditoday")
            .with_status(200)
            .with_body("<html><body><div id=\"app\"></div></body></html>")
            .expect(1)
            .create_async()
            .await;

        let err = fetcher(FetchMode::Auto)
            .fetch_listing(&format!("{}/ke/oditoday", server.url()), &ListingLayout::odibets())
            .await
            .unwrap_err();

        assert!(format!("{err:#}").contains("Failed to launch Chrome"), "{err:#}");
        page.assert_async().await;
    }

    #[tokio::test]
    async fn http_mode_returns_empty_shell_without_fallback() {
        let mut server = mockito::Server::new_async().await;
        let _page = server
            .mock("GET", "/football/")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let html = fetcher(FetchMode::Http)
            .fetch_listing(&format!("{}/football/", server.url()), &ListingLayout::flashscore())
            .await
            .unwrap();

        assert_eq!(html, "<html></html>");
    }
}
