//! Kickoff time normalization
//!
//! Both sites print a bare clock time ("19:30") next to every fixture. The
//! date comes from the page we scraped, the zone from configuration.

use anyhow::{anyhow, bail, Result};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;

const EAT_OFFSET_SECS: i32 = 3 * 3600;

fn colon_clock() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "19:30", "7:05", "19h30", also buried in "18.03. 19:30" or "19:30FRO"
    RE.get_or_init(|| Regex::new(r"(?:^|\D)(\d{1,2})[:h](\d{2})(?:\D|$)").unwrap())
}

fn dotted_clock() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "19.30" only as the whole string, otherwise "18.03." dates would match
    RE.get_or_init(|| Regex::new(r"^(\d{1,2})\.(\d{2})$").unwrap())
}

fn twelve_hour_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\d\s*[ap]\.?m\b").unwrap())
}

/// Parse a 24h clock time out of a loosely formatted cell.
pub fn parse_clock(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        bail!("empty time cell");
    }
    if twelve_hour_marker().is_match(trimmed) {
        bail!("12-hour clock not supported: {:?}", raw);
    }

    let caps = colon_clock()
        .captures(trimmed)
        .or_else(|| dotted_clock().captures(trimmed))
        .ok_or_else(|| anyhow!("no clock time in {:?}", raw))?;

    let hour: u32 = caps[1].parse()?;
    let minute: u32 = caps[2].parse()?;

    NaiveTime::from_hms_opt(hour, minute, 0)
        .ok_or_else(|| anyhow!("clock time out of range: {:?}", raw))
}

/// Turns scraped clock times into absolute timestamps in one canonical zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeNormalizer {
    /// Zone the scraped pages render their clock times in.
    pub source_offset: FixedOffset,
    /// Zone every `FixtureRecord::kickoff` ends up in.
    pub target_offset: FixedOffset,
}

impl Default for TimeNormalizer {
    /// UTC pages, East Africa Time output.
    fn default() -> Self {
        Self {
            source_offset: FixedOffset::east_opt(0).unwrap(),
            target_offset: FixedOffset::east_opt(EAT_OFFSET_SECS).unwrap(),
        }
    }
}

impl TimeNormalizer {
    pub fn new(source_offset: FixedOffset, target_offset: FixedOffset) -> Self {
        Self { source_offset, target_offset }
    }

    pub fn from_hours(source_hours: i32, target_hours: i32) -> Result<Self> {
        let offset = |hours: i32| {
            hours
                .checked_mul(3600)
                .and_then(FixedOffset::east_opt)
                .ok_or_else(|| anyhow!("UTC offset out of range: {} h", hours))
        };
        Ok(Self::new(offset(source_hours)?, offset(target_hours)?))
    }

    /// Combine `reference_date` with the clock time in `raw`, read it in the
    /// source zone and express it in the target zone.
    pub fn normalize(&self, raw: &str, reference_date: NaiveDate) -> Result<DateTime<FixedOffset>> {
        let clock = parse_clock(raw)?;
        let wall_clock = reference_date.and_time(clock);

        let in_source = self
            .source_offset
            .from_local_datetime(&wall_clock)
            .single()
            .ok_or_else(|| anyhow!("ambiguous local time {}", wall_clock))?;

        Ok(in_source.with_timezone(&self.target_offset))
    }

    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.target_offset)
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn parses_plain_and_loose_clock_times() {
        let t = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        assert_eq!(parse_clock("19:30").unwrap(), t(19, 30));
        assert_eq!(parse_clock("  7:05 ").unwrap(), t(7, 5));
        assert_eq!(parse_clock("19.30").unwrap(), t(19, 30));
        assert_eq!(parse_clock("21h45").unwrap(), t(21, 45));
        assert_eq!(parse_clock("18.03. 19:30").unwrap(), t(19, 30));
        assert_eq!(parse_clock("19:30FRO").unwrap(), t(19, 30));
        assert_eq!(parse_clock("00:00").unwrap(), t(0, 0));
    }

    #[test]
    fn rejects_what_is_not_a_kickoff_time() {
        for raw in ["", "   ", "45'", "Postp.", "HT", "25:00", "19:75", "18.03.", "7:30 PM", "119:305"] {
            assert!(parse_clock(raw).is_err(), "{raw:?} should not parse");
        }
    }

    #[test]
    fn default_normalizer_shifts_utc_clock_to_eat() {
        let kickoff = TimeNormalizer::default().normalize("10:00", day()).unwrap();
        assert_eq!(kickoff.offset().local_minus_utc(), EAT_OFFSET_SECS);
        assert_eq!(kickoff.hour(), 13);
        assert_eq!(kickoff.date_naive(), day());
    }

    #[test]
    fn same_zone_keeps_wall_clock() {
        let normalizer = TimeNormalizer::from_hours(3, 3).unwrap();
        let kickoff = normalizer.normalize("16:00", day()).unwrap();
        assert_eq!((kickoff.hour(), kickoff.minute()), (16, 0));
        assert_eq!(kickoff.date_naive(), day());
    }

    #[test]
    fn late_evening_utc_rolls_into_next_eat_day() {
        let kickoff = TimeNormalizer::default().normalize("22:30", day()).unwrap();
        assert_eq!(kickoff.hour(), 1);
        assert_eq!(kickoff.date_naive(), day().succ_opt().unwrap());
    }

    #[test]
    fn normalized_instants_compare_across_offsets() {
        let eat = TimeNormalizer::from_hours(3, 3).unwrap();
        let from_utc = TimeNormalizer::default();
        // 09:30 UTC and 12:30 EAT are the same instant
        assert_eq!(
            from_utc.normalize("09:30", day()).unwrap(),
            eat.normalize("12:30", day()).unwrap()
        );
    }

    #[test]
    fn rejects_out_of_range_offsets() {
        assert!(TimeNormalizer::from_hours(0, 30).is_err());
        assert!(TimeNormalizer::from_hours(-5, 3).is_ok());
    }
}
