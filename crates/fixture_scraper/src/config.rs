use anyhow::bail;
use reconciler::TimeNormalizer;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// How listing pages are retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Plain HTTP GET.
    Http,
    /// Headless Chrome render.
    Browser,
    /// HTTP first, browser when HTTP fails or the page holds no fixture rows.
    Auto,
}

impl FromStr for FetchMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(FetchMode::Http),
            "browser" | "chrome" => Ok(FetchMode::Browser),
            "auto" => Ok(FetchMode::Auto),
            other => bail!("unknown fetch mode {:?}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    pub odibets_url:             String,
    pub flashscore_url:          String,
    /// Flashscore listing for any other day, `{date}` → YYYY-MM-DD.
    pub flashscore_dated_url:    String,
    pub fetch_mode:              FetchMode,
    pub http_timeout_secs:       u64,
    pub browser_wait_secs:       u64,
    /// Chrome/Chromium executable, auto-detected when unset.
    pub chrome_path:             Option<PathBuf>,
    pub source_utc_offset_hours: i32,
    pub target_utc_offset_hours: i32,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            odibets_url:             "https://odibets.com/ke/oditoday".to_string(),
            flashscore_url:          "https://www.flashscore.com/football/".to_string(),
            flashscore_dated_url:    "https://www.flashscore.com/?d={date}".to_string(),
            fetch_mode:              FetchMode::Auto,
            http_timeout_secs:       15,
            browser_wait_secs:       10,
            chrome_path:             None,
            source_utc_offset_hours: 0,
            target_utc_offset_hours: 3,   // Africa/Nairobi (EAT)
        }
    }
}

impl ScrapeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        let text = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = text("ODIBETS_URL") {
            config.odibets_url = url;
        }
        if let Some(url) = text("FLASHSCORE_URL") {
            config.flashscore_url = url;
        }
        if let Some(url) = text("FLASHSCORE_DATED_URL") {
            config.flashscore_dated_url = url;
        }
        config.chrome_path = text("CHROME_PATH").map(PathBuf::from);

        config.fetch_mode        = parse_var(&lookup, "FETCH_MODE", config.fetch_mode);
        config.http_timeout_secs = parse_var(&lookup, "HTTP_TIMEOUT_SECS", config.http_timeout_secs);
        config.browser_wait_secs = parse_var(&lookup, "BROWSER_WAIT_SECS", config.browser_wait_secs);

        let source = parse_var(&lookup, "SOURCE_UTC_OFFSET_HOURS", config.source_utc_offset_hours);
        let target = parse_var(&lookup, "TARGET_UTC_OFFSET_HOURS", config.target_utc_offset_hours);
        if TimeNormalizer::from_hours(source, target).is_ok() {
            config.source_utc_offset_hours = source;
            config.target_utc_offset_hours = target;
        } else {
            warn!("UTC offsets {}h/{}h out of range, keeping defaults", source, target);
        }

        config
    }

    pub fn normalizer(&self) -> TimeNormalizer {
        TimeNormalizer::from_hours(self.source_utc_offset_hours, self.target_utc_offset_hours)
            .unwrap_or_default()
    }
}

/// Read `key` through `lookup` and parse it, falling back to `default` when
/// unset or malformed.
pub fn parse_var<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                warn!("Ignoring {}={:?}: not a valid value", key, raw);
                default
            }
        },
        _ => default,
    }
}

pub fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    let Some(raw) = lookup(key) else {
        return default;
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        "" => default,
        _ => {
            warn!("Ignoring {}={:?}: expected true/false", key, raw);
            default
        }
    }
}
