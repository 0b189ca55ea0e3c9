//! Join keys for lining up the same fixture across two listings.

use serde::Serialize;
use std::fmt;

/// Normalized label used as the equality key between sources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct JoinKey(String);

impl JoinKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for JoinKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for JoinKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps a scraped label to its join key.
///
/// Odibets lists "Team A" where Flashscore lists "Team A vs Team B"; there is
/// no shared team id between the two, so any implementation is a heuristic.
pub trait NameMatcher {
    fn join_key(&self, label: &str) -> JoinKey;
}

/// Lower-case + trim. Nothing smarter.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaseFoldMatcher;

impl NameMatcher for CaseFoldMatcher {
    fn join_key(&self, label: &str) -> JoinKey {
        JoinKey(label.trim().to_lowercase())
    }
}
