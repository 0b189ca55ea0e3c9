//! fixture-watch logger
//! JSONL event stream, Telegram + NTFY alerts

mod notify;

pub use notify::{Notifier, NotifyConfig, TelegramTarget};

use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct EventLogger {
    log_dir: PathBuf,
}

impl EventLogger {
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        let dir = log_dir.into();
        fs::create_dir_all(&dir).ok();
        Self { log_dir: dir }
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Append one event as a line to `<log_dir>/<YYYY-MM-DD>.jsonl`.
    pub fn log<T: Serialize>(&self, event: &T) -> Result<()> {
        let date  = Utc::now().format("%Y-%m-%d").to_string();
        let path  = self.log_dir.join(format!("{date}.jsonl"));
        let line  = serde_json::to_string(event)?;
        let mut f = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(f, "{line}")?;
        Ok(())
    }
}

pub fn now_iso() -> String {
    Utc::now().to_rfc3339()
}

// ── Event types ───────────────────────────────────────────────────────────────

#[derive(Serialize, Debug)]
pub struct SourceStatusEvent {
    pub ts:       String,
    pub event:    &'static str,   // "SOURCE_STATUS"
    pub source:   String,         // "odibets" | "flashscore"
    pub url:      String,
    pub date:     String,         // listing date, YYYY-MM-DD
    pub ok:       bool,
    pub records:  usize,
    pub skipped:  usize,          // rows dropped (missing cells, bad time)
    pub message:  String,
}

#[derive(Serialize, Debug)]
pub struct DiscrepancyEvent {
    pub ts:                String,
    pub event:             &'static str,   // "DISCREPANCY"
    pub category:          String,         // "late_today" | "played_yesterday" | "possibly_played_yesterday"
    pub label:             String,
    pub kickoff:           String,
    pub secondary_kickoff: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct RunSummaryEvent {
    pub ts:                   String,
    pub event:                &'static str,   // "RUN_SUMMARY"
    pub primary_rows:         usize,
    pub secondary_today_rows: usize,
    pub secondary_prior_rows: Option<usize>,
    pub late:                 usize,
    pub possibly_stale:       usize,
    pub confirmed_prior_day:  usize,
    pub report_path:          Option<String>,
    pub notified:             usize,
}
