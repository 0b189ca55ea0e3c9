//! Probe binary for the fixture sources: fetch each listing once and dump what parsed.
//! Run: cargo run --bin source-probe

use anyhow::Result;
use dotenv::dotenv;
use fixture_scraper::config::parse_var;
use fixture_scraper::{
    FixtureSource, FlashscoreSource, ListingLayout, ListingScraper, OdibetsSource, PageFetcher, ScrapeConfig,
};
use logger::EventLogger;
use reconciler::FixtureRecord;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

const SHOW: usize = 5;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let config = ScrapeConfig::from_env();
    let normalizer = config.normalizer();
    let today = normalizer.today();
    info!("Source probe, fetch mode {:?}, today {}", config.fetch_mode, today);

    let fetcher = Arc::new(PageFetcher::new(&config));

    // Raw row counts first: tells selector drift apart from parse failures.
    for (name, url, layout) in [
        ("odibets", config.odibets_url.as_str(), ListingLayout::odibets()),
        ("flashscore", config.flashscore_url.as_str(), ListingLayout::flashscore()),
    ] {
        match fetcher.fetch_listing(url, &layout).await {
            Ok(html) => info!(
                "Probe {} -> html_len={}, rows={}",
                name,
                html.len(),
                layout.count_rows(&html)
            ),
            Err(e) => warn!("Probe {} failed: {:#}", name, e),
        }
    }

    let log_dir = parse_var(&|key: &str| env::var(key).ok(), "LOG_DIR", PathBuf::from("logs"));
    let scraper = ListingScraper::new(fetcher, normalizer, Arc::new(EventLogger::new(log_dir)));
    let odibets = OdibetsSource::new(&config, scraper.clone());
    let flashscore = FlashscoreSource::new(&config, scraper, today);

    show("Odibets today", &odibets.fetch(today).await);
    show("Flashscore today", &flashscore.fetch(today).await);
    if let Some(yesterday) = today.pred_opt() {
        show(
            &format!("Flashscore {}", yesterday),
            &flashscore.fetch(yesterday).await,
        );
    }

    Ok(())
}

fn show(title: &str, records: &[FixtureRecord]) {
    println!("\n── {} ({} fixtures) ──", title, records.len());
    for rec in records.iter().take(SHOW) {
        println!("  {:<40} {}", rec.label, rec.kickoff.format("%Y-%m-%d %H:%M %:z"));
    }
    if records.len() > SHOW {
        println!("  … {} more", records.len() - SHOW);
    }
}
