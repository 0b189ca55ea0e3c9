use fixture_scraper::config::{parse_flag, parse_var};
use fixture_scraper::ScrapeConfig;
use logger::NotifyConfig;
use report_writer::ReportFormat;
use std::env;
use std::path::PathBuf;

/// Everything a run needs, read once in `main`.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    pub scrape:          ScrapeConfig,
    /// Also pull yesterday's Flashscore listing to confirm "played yesterday".
    pub check_prior_day: bool,
    pub report_path:     PathBuf,
    pub report_format:   ReportFormat,
    pub log_dir:         PathBuf,
    pub notify:          NotifyConfig,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            scrape:          ScrapeConfig::default(),
            check_prior_day: true,
            report_path:     PathBuf::from("match_report.csv"),
            report_format:   ReportFormat::Csv,
            log_dir:         PathBuf::from("logs"),
            notify:          NotifyConfig::default(),
        }
    }
}

impl CheckerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let report_path = lookup("REPORT_PATH")
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.report_path);
        let report_format = parse_var(&lookup, "REPORT_FORMAT", ReportFormat::from_path(&report_path));

        Self {
            scrape:          ScrapeConfig::from_lookup(&lookup),
            check_prior_day: parse_flag(&lookup, "CHECK_PRIOR_DAY", defaults.check_prior_day),
            report_path,
            report_format,
            log_dir:         lookup("LOG_DIR")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.log_dir),
            notify:          NotifyConfig::from_lookup(&lookup),
        }
    }
}
