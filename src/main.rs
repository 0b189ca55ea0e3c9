//! fixture-watch: Odibets vs Flashscore time checker
//!
//! What it does:
//!   1. Scrapes today's Odibets card and Flashscore's today (+ yesterday) listings
//!   2. Flags Odibets fixtures Flashscore says already kicked off (late)
//!   3. Flags Odibets fixtures missing from Flashscore today (played yesterday?)
//!   4. Writes the report, Telegram/NTFY alert when something was found
//!
//! Run:
//!   cargo run --bin match-checker

mod config;
mod summary;

use anyhow::Result;
use config::CheckerConfig;
use dotenv::dotenv;
use fixture_scraper::{FixtureSource, FlashscoreSource, ListingScraper, OdibetsSource, PageFetcher};
use logger::{now_iso, DiscrepancyEvent, EventLogger, Notifier, RunSummaryEvent};
use reconciler::{reconcile, CaseFoldMatcher, ClassificationResult};
use report_writer::{stale_category, ReportWriter};
use std::env;
use std::fs::File;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let config = CheckerConfig::from_env();
    info!("=== fixture-watch: Odibets vs Flashscore ===");
    info!("Fetch mode: {:?}, prior-day check: {}", config.scrape.fetch_mode, config.check_prior_day);

    // Single instance lock (cron may overlap a slow browser run)
    let lock_file_path = env::temp_dir().join("fixture_watch_checker.lock");
    let lock_file = match File::create(&lock_file_path) {
        Ok(f) => f,
        Err(e) => {
            warn!("Failed to create lock file at {:?}: {}", lock_file_path, e);
            return Ok(());
        }
    };

    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => guard,
        Err(_) => {
            warn!("Another match-checker run is in progress. Exiting.");
            return Ok(());
        }
    };

    run(&config).await;
    Ok(())
}

async fn run(config: &CheckerConfig) {
    let normalizer = config.scrape.normalizer();
    let now = normalizer.now();
    let today = now.date_naive();
    let yesterday = today.pred_opt().filter(|_| config.check_prior_day);

    let events = Arc::new(EventLogger::new(&config.log_dir));
    let scraper = ListingScraper::new(
        Arc::new(PageFetcher::new(&config.scrape)),
        normalizer,
        events.clone(),
    );
    let odibets = OdibetsSource::new(&config.scrape, scraper.clone());
    let flashscore = FlashscoreSource::new(&config.scrape, scraper, today);

    println!("Fetching fixtures…\n");

    let (primary, secondary_today, secondary_prior) = tokio::join!(
        odibets.fetch(today),
        flashscore.fetch(today),
        async {
            // An unreachable prior-day page is no evidence either way.
            match yesterday {
                Some(date) => flashscore.try_fetch(date).await.ok(),
                None => None,
            }
        }
    );

    info!(
        "Scraped {} Odibets rows; {} Flashscore rows today{}",
        primary.len(),
        secondary_today.len(),
        secondary_prior
            .as_ref()
            .map(|p| format!(", {} yesterday", p.len()))
            .unwrap_or_default()
    );

    let result = reconcile(
        &primary,
        &secondary_today,
        secondary_prior.as_deref(),
        now,
        &CaseFoldMatcher,
    );

    println!("{}", summary::render_summary(&result));
    log_discrepancies(&events, &result);

    let report_path = match ReportWriter::new(&config.report_path, config.report_format).write(&result) {
        Ok(Some(path)) => {
            println!("[+] Report saved → {}", path.display());
            Some(path)
        }
        Ok(None) => {
            println!("[-] No discrepancies – report not generated.");
            None
        }
        Err(e) => {
            warn!("Report not written: {:#}", e);
            None
        }
    };

    let notifier = Notifier::new(config.notify.clone());
    let notified = if !result.is_empty() && notifier.is_enabled() {
        notifier.notify("Match Checker", &result.summary_text()).await
    } else {
        0
    };

    let _ = events.log(&RunSummaryEvent {
        ts:                   now_iso(),
        event:                "RUN_SUMMARY",
        primary_rows:         primary.len(),
        secondary_today_rows: secondary_today.len(),
        secondary_prior_rows: secondary_prior.as_ref().map(Vec::len),
        late:                 result.late.len(),
        possibly_stale:       result.possibly_stale.len(),
        confirmed_prior_day:  result.confirmed_prior_day(),
        report_path:          report_path.map(|p| p.display().to_string()),
        notified,
    });

    println!("{}", result.summary_text());
}

fn log_discrepancies(events: &EventLogger, result: &ClassificationResult) {
    for event in discrepancy_events(result) {
        let _ = events.log(&event);
    }
}

/// One `DISCREPANCY` event per flagged fixture, late ones first.
fn discrepancy_events(result: &ClassificationResult) -> Vec<DiscrepancyEvent> {
    let late = result.late.iter().map(|late| DiscrepancyEvent {
        ts:                now_iso(),
        event:             "DISCREPANCY",
        category:          "late_today".to_string(),
        label:             late.fixture.label.clone(),
        kickoff:           late.fixture.kickoff.to_rfc3339(),
        secondary_kickoff: Some(late.secondary_kickoff.to_rfc3339()),
    });
    let stale = result.possibly_stale.iter().map(|stale| DiscrepancyEvent {
        ts:                now_iso(),
        event:             "DISCREPANCY",
        category:          stale_category(stale).to_lowercase().replace(' ', "_"),
        label:             stale.fixture.label.clone(),
        kickoff:           stale.fixture.kickoff.to_rfc3339(),
        secondary_kickoff: None,
    });
    late.chain(stale).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use reconciler::{FixtureRecord, LateFixture, PriorDayEvidence, StaleFixture};

    fn rec(label: &str, h: u32) -> FixtureRecord {
        let kickoff = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, h, 0, 0)
            .unwrap();
        FixtureRecord::new(label, kickoff, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[test]
    fn discrepancy_events_carry_report_categories() {
        let result = ClassificationResult {
            late: vec![LateFixture { fixture: rec("Team A", 10), secondary_kickoff: rec("x", 9).kickoff }],
            possibly_stale: vec![
                StaleFixture { fixture: rec("Team B", 14), prior_day: PriorDayEvidence::Listed },
                StaleFixture { fixture: rec("Team C", 15), prior_day: PriorDayEvidence::NotListed },
                StaleFixture { fixture: rec("Team D", 16), prior_day: PriorDayEvidence::Unknown },
            ],
        };

        let events = discrepancy_events(&result);

        let categories: Vec<(&str, &str)> = events
            .iter()
            .map(|e| (e.label.as_str(), e.category.as_str()))
            .collect();
        assert_eq!(
            categories,
            vec![
                ("Team A", "late_today"),
                ("Team B", "played_yesterday"),
                ("Team C", "possibly_played_yesterday"),
                ("Team D", "possibly_played_yesterday"),
            ]
        );
        assert_eq!(events[0].secondary_kickoff.as_deref(), Some("2026-10-18T09:00:00+03:00"));
        assert!(events[1..].iter().all(|e| e.secondary_kickoff.is_none()));
        assert!(events.iter().all(|e| e.event == "DISCREPANCY"));
    }

    #[test]
    fn clean_run_logs_no_discrepancies() {
        assert!(discrepancy_events(&ClassificationResult::default()).is_empty());
    }
}
