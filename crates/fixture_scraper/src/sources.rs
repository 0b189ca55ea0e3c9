use crate::{ListingLayout, PageFetcher, ScrapeConfig};
use anyhow::Result;
use chrono::NaiveDate;
use logger::{now_iso, EventLogger, SourceStatusEvent};
use reconciler::{FixtureRecord, TimeNormalizer};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// A site that lists fixtures for a given day.
#[allow(async_fn_in_trait)]
pub trait FixtureSource {
    fn name(&self) -> &'static str;

    /// `Err` when the listing page could not be retrieved at all. A page that
    /// loads but yields no rows is `Ok(vec![])`.
    async fn try_fetch(&self, reference_date: NaiveDate) -> Result<Vec<FixtureRecord>>;

    /// Never fails: problems are already logged by `try_fetch`, the source
    /// comes back empty.
    async fn fetch(&self, reference_date: NaiveDate) -> Vec<FixtureRecord> {
        self.try_fetch(reference_date).await.unwrap_or_default()
    }
}

/// Fetch + parse + status logging shared by both sites.
#[derive(Clone)]
pub struct ListingScraper {
    fetcher:    Arc<PageFetcher>,
    normalizer: TimeNormalizer,
    events:     Arc<EventLogger>,
}

impl ListingScraper {
    pub fn new(fetcher: Arc<PageFetcher>, normalizer: TimeNormalizer, events: Arc<EventLogger>) -> Self {
        Self { fetcher, normalizer, events }
    }

    pub async fn scrape(&self, source: &str, url: &str, layout: &ListingLayout, date: NaiveDate) -> Result<Vec<FixtureRecord>> {
        let started = Instant::now();

        let html = match self.fetcher.fetch_listing(url, layout).await {
            Ok(html) => html,
            Err(e) => {
                warn!("{} fetch failed for {}: {:#}", source, url, e);
                self.log_status(source, url, date, false, 0, 0, &format!("{e:#}"));
                return Err(e);
            }
        };

        let parsed = layout.parse(&html, date, &self.normalizer);
        info!(
            "{}: {} fixtures for {} ({} rows skipped, {} ms)",
            source,
            parsed.records.len(),
            date,
            parsed.skipped,
            started.elapsed().as_millis()
        );
        if parsed.records.is_empty() {
            warn!("{}: no fixtures parsed from {} ({} bytes), selectors may be stale", source, url, html.len());
        }

        self.log_status(source, url, date, true, parsed.records.len(), parsed.skipped, "ok");
        Ok(parsed.records)
    }

    #[allow(clippy::too_many_arguments)]
    fn log_status(&self, source: &str, url: &str, date: NaiveDate, ok: bool, records: usize, skipped: usize, message: &str) {
        let _ = self.events.log(&SourceStatusEvent {
            ts:      now_iso(),
            event:   "SOURCE_STATUS",
            source:  source.to_string(),
            url:     url.to_string(),
            date:    date.format("%Y-%m-%d").to_string(),
            ok,
            records,
            skipped,
            message: message.to_string(),
        });
    }
}

// ── Odibets ───────────────────────────────────────────────────────────────────

/// Betting-site listing. Only serves today's card, whatever date is asked.
pub struct OdibetsSource {
    scraper: ListingScraper,
    url:     String,
    layout:  ListingLayout,
}

impl OdibetsSource {
    pub fn new(config: &ScrapeConfig, scraper: ListingScraper) -> Self {
        Self {
            scraper,
            url:    config.odibets_url.clone(),
            layout: ListingLayout::odibets(),
        }
    }
}

impl FixtureSource for OdibetsSource {
    fn name(&self) -> &'static str {
        "odibets"
    }

    async fn try_fetch(&self, reference_date: NaiveDate) -> Result<Vec<FixtureRecord>> {
        self.scraper.scrape(self.name(), &self.url, &self.layout, reference_date).await
    }
}

// ── Flashscore ────────────────────────────────────────────────────────────────

/// Scores listing. Today from the football page, other days via `?d=`.
pub struct FlashscoreSource {
    scraper:   ListingScraper,
    today_url: String,
    dated_url: String,
    today:     NaiveDate,
    layout:    ListingLayout,
}

impl FlashscoreSource {
    pub fn new(config: &ScrapeConfig, scraper: ListingScraper, today: NaiveDate) -> Self {
        Self {
            scraper,
            today_url: config.flashscore_url.clone(),
            dated_url: config.flashscore_dated_url.clone(),
            today,
            layout:    ListingLayout::flashscore(),
        }
    }

    pub fn url_for(&self, date: NaiveDate) -> String {
        if date == self.today {
            self.today_url.clone()
        } else {
            self.dated_url.replace("{date}", &date.format("%Y-%m-%d").to_string())
        }
    }
}

impl FixtureSource for FlashscoreSource {
    fn name(&self) -> &'static str {
        "flashscore"
    }

    async fn try_fetch(&self, reference_date: NaiveDate) -> Result<Vec<FixtureRecord>> {
        let url = self.url_for(reference_date);
        self.scraper.scrape(self.name(), &url, &self.layout, reference_date).await
    }
}
