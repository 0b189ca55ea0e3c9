//! Discrepancy report on disk, CSV or XLSX.
//!
//! The report usually sits open in a spreadsheet app between runs. A target
//! we cannot open or lock is not an error: the next free `name_N.ext` is used.

use anyhow::{anyhow, bail, Result};
use reconciler::{ClassificationResult, StaleFixture};
use rust_xlsxwriter::{Format, Workbook};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

pub const LATE_TODAY: &str = "Late Today";
pub const PLAYED_YESTERDAY: &str = "Played Yesterday";
pub const POSSIBLY_PLAYED_YESTERDAY: &str = "Possibly Played Yesterday";

const HEADERS: [&str; 4] = ["Category", "Team", "Scheduled Time", "Flashscore Time"];
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const DEFAULT_MAX_ATTEMPTS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub category:  &'static str,
    pub team:      String,
    pub scheduled: String,
    /// Flashscore kickoff, late rows only.
    pub secondary: String,
}

pub fn stale_category(stale: &StaleFixture) -> &'static str {
    if stale.played_yesterday() {
        PLAYED_YESTERDAY
    } else {
        POSSIBLY_PLAYED_YESTERDAY
    }
}

/// Late rows first, then stale ones, each in listing order.
pub fn report_rows(result: &ClassificationResult) -> Vec<ReportRow> {
    let late = result.late.iter().map(|l| ReportRow {
        category:  LATE_TODAY,
        team:      l.fixture.label.clone(),
        scheduled: l.fixture.kickoff.format(TIME_FORMAT).to_string(),
        secondary: l.secondary_kickoff.format(TIME_FORMAT).to_string(),
    });
    let stale = result.possibly_stale.iter().map(|s| ReportRow {
        category:  stale_category(s),
        team:      s.fixture.label.clone(),
        scheduled: s.fixture.kickoff.format(TIME_FORMAT).to_string(),
        secondary: String::new(),
    });
    late.chain(stale).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Xlsx,
}

impl ReportFormat {
    /// `.xlsx` → Xlsx, anything else → Csv.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("xlsx") => ReportFormat::Xlsx,
            _ => ReportFormat::Csv,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Csv => "csv",
            ReportFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ReportFormat::Csv),
            "xlsx" | "excel" => Ok(ReportFormat::Xlsx),
            other => bail!("unknown report format {:?}", other),
        }
    }
}

pub struct ReportWriter {
    base_path:    PathBuf,
    format:       ReportFormat,
    max_attempts: usize,
}

impl ReportWriter {
    /// The extension of `base_path` is forced to match `format`.
    pub fn new(base_path: impl Into<PathBuf>, format: ReportFormat) -> Self {
        Self {
            base_path:    base_path.into().with_extension(format.extension()),
            format,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Persist `result`. `Ok(None)` when there is nothing to report.
    pub fn write(&self, result: &ClassificationResult) -> Result<Option<PathBuf>> {
        if result.is_empty() {
            info!("No discrepancies, report not generated");
            return Ok(None);
        }

        let payload = self.render(result)?;
        if let Some(parent) = self.base_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        for attempt in 0..self.max_attempts {
            let candidate = candidate_path(&self.base_path, attempt);
            match write_locked(&candidate, &payload) {
                Ok(()) => {
                    info!("Report saved → {}", candidate.display());
                    return Ok(Some(candidate));
                }
                Err(e) => warn!("{} not writable ({:#}), trying next name", candidate.display(), e),
            }
        }

        bail!(
            "no writable report file after {} attempts starting at {}",
            self.max_attempts,
            self.base_path.display()
        )
    }

    pub fn render(&self, result: &ClassificationResult) -> Result<Vec<u8>> {
        let rows = report_rows(result);
        match self.format {
            ReportFormat::Csv => render_csv(&rows),
            ReportFormat::Xlsx => render_xlsx(&rows),
        }
    }
}

/// `report.csv`, `report_1.csv`, `report_2.csv`, …
pub fn candidate_path(base: &Path, attempt: usize) -> PathBuf {
    if attempt == 0 {
        return base.to_path_buf();
    }
    let stem = base
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("match_report");
    let name = match base.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}_{attempt}.{ext}"),
        None => format!("{stem}_{attempt}"),
    };
    base.with_file_name(name)
}

/// Truncate and write only once we hold the lock, so a file someone else
/// has locked is left untouched.
fn write_locked(path: &Path, payload: &[u8]) -> Result<()> {
    let file = OpenOptions::new().write(true).create(true).truncate(false).open(path)?;
    let mut lock = fd_lock::RwLock::new(file);
    let mut guard = lock
        .try_write()
        .map_err(|_| anyhow!("locked by another process"))?;

    guard.set_len(0)?;
    guard.write_all(payload)?;
    guard.flush()?;
    Ok(())
}

fn render_csv(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(HEADERS)?;
    for row in rows {
        wtr.write_record([row.category, row.team.as_str(), row.scheduled.as_str(), row.secondary.as_str()])?;
    }
    wtr.into_inner()
        .map_err(|e| anyhow!("CSV flush failed: {}", e.error()))
}

fn render_xlsx(rows: &[ReportRow]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();

    let late: Vec<&ReportRow> = rows.iter().filter(|r| r.category == LATE_TODAY).collect();
    let stale: Vec<&ReportRow> = rows.iter().filter(|r| r.category != LATE_TODAY).collect();

    for (sheet_name, sheet_rows) in [("Today Discrepancies", late), ("Possibly Played Yesterday", stale)] {
        if sheet_rows.is_empty() {
            continue;
        }
        let sheet = workbook.add_worksheet();
        sheet.set_name(sheet_name)?;

        for (col, title) in HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, col as u16, *title, &bold)?;
        }
        for (i, row) in sheet_rows.iter().enumerate() {
            let r = i as u32 + 1;
            sheet.write_string(r, 0, row.category)?;
            sheet.write_string(r, 1, row.team.as_str())?;
            sheet.write_string(r, 2, row.scheduled.as_str())?;
            sheet.write_string(r, 3, row.secondary.as_str())?;
        }
        sheet.autofit();
    }

    Ok(workbook.save_to_buffer()?)
}
