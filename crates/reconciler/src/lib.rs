//! fixture-watch reconciler
//! Odibets (primary) vs Flashscore (secondary) fixture listings.
//! Pure: gets parsed records and a pinned `now`, returns the discrepancy buckets.

pub mod matcher;
pub mod time;

pub use matcher::{CaseFoldMatcher, JoinKey, NameMatcher};
pub use time::{parse_clock, TimeNormalizer};

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// One scraped fixture, already timezone-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureRecord {
    pub label:       String,
    pub kickoff:     DateTime<FixedOffset>,
    pub source_date: NaiveDate,   // date of the listing it was scraped from
}

impl FixtureRecord {
    pub fn new(label: impl Into<String>, kickoff: DateTime<FixedOffset>, source_date: NaiveDate) -> Self {
        Self { label: label.into(), kickoff, source_date }
    }
}

/// Primary still shows it as upcoming, secondary kickoff has already passed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LateFixture {
    pub fixture:           FixtureRecord,
    pub secondary_kickoff: DateTime<FixedOffset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorDayEvidence {
    /// Found on the secondary's prior-day listing.
    Listed,
    NotListed,
    /// No prior-day listing was fetched.
    Unknown,
}

/// Primary lists it, secondary's same-day listing does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleFixture {
    pub fixture:   FixtureRecord,
    pub prior_day: PriorDayEvidence,
}

impl StaleFixture {
    pub fn played_yesterday(&self) -> bool {
        self.prior_day == PriorDayEvidence::Listed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub late:           Vec<LateFixture>,
    pub possibly_stale: Vec<StaleFixture>,
}

impl ClassificationResult {
    pub fn is_empty(&self) -> bool {
        self.late.is_empty() && self.possibly_stale.is_empty()
    }

    pub fn confirmed_prior_day(&self) -> usize {
        self.possibly_stale.iter().filter(|s| s.played_yesterday()).count()
    }

    /// Push notification body. Counts use the same categories as the report.
    pub fn summary_text(&self) -> String {
        let confirmed = self.confirmed_prior_day();
        format!(
            "Match Checker Alert\nLate Today: {}\nPlayed Yesterday: {}\nPossibly Played Yesterday: {}",
            self.late.len(),
            confirmed,
            self.possibly_stale.len() - confirmed
        )
    }
}

/// Classify every `primary` fixture against the secondary listings.
///
/// * key on today's secondary listing with kickoff before `now` → `late`
/// * key missing from today's secondary listing → `possibly_stale`, with the
///   prior-day listing (if any) as supporting evidence
/// * key present with kickoff still ahead → dropped
///
/// Output keeps `primary` order.
pub fn reconcile<M: NameMatcher + ?Sized>(
    primary:             &[FixtureRecord],
    secondary_today:     &[FixtureRecord],
    secondary_prior_day: Option<&[FixtureRecord]>,
    now:                 DateTime<FixedOffset>,
    matcher:             &M,
) -> ClassificationResult {
    // duplicate keys on one listing: last one wins
    let today: HashMap<JoinKey, DateTime<FixedOffset>> = secondary_today
        .iter()
        .map(|r| (matcher.join_key(&r.label), r.kickoff))
        .collect();

    let prior_day: Option<HashSet<JoinKey>> = secondary_prior_day
        .map(|records| records.iter().map(|r| matcher.join_key(&r.label)).collect());

    let mut result = ClassificationResult::default();

    for fixture in primary {
        let key = matcher.join_key(&fixture.label);
        match today.get(&key) {
            Some(&secondary_kickoff) if secondary_kickoff < now => {
                result.late.push(LateFixture { fixture: fixture.clone(), secondary_kickoff });
            }
            Some(_) => {}
            None => {
                let evidence = match &prior_day {
                    Some(keys) if keys.contains(&key) => PriorDayEvidence::Listed,
                    Some(_) => PriorDayEvidence::NotListed,
                    None => PriorDayEvidence::Unknown,
                };
                result.possibly_stale.push(StaleFixture { fixture: fixture.clone(), prior_day: evidence });
            }
        }
    }

    result
}
