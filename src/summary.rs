use reconciler::{ClassificationResult, PriorDayEvidence};
use std::fmt::Write;

const NONE: &str = "‒ none ‒";
const TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Human-readable listing of both buckets for stdout.
pub fn render_summary(result: &ClassificationResult) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== TODAY TIME DISCREPANCIES ===");
    if result.late.is_empty() {
        let _ = writeln!(out, "{NONE}");
    }
    for late in &result.late {
        let _ = writeln!(
            out,
            "{} — {} (flashscore {})",
            late.fixture.label,
            late.fixture.kickoff.format(TIME_FORMAT),
            late.secondary_kickoff.format("%H:%M"),
        );
    }

    let _ = writeln!(out, "\n=== POSSIBLY PLAYED YESTERDAY ===");
    if result.possibly_stale.is_empty() {
        let _ = writeln!(out, "{NONE}");
    }
    for stale in &result.possibly_stale {
        let note = match stale.prior_day {
            PriorDayEvidence::Listed => " [on yesterday's flashscore listing]",
            PriorDayEvidence::NotListed => " [not on yesterday's listing either]",
            PriorDayEvidence::Unknown => "",
        };
        let _ = writeln!(
            out,
            "{} — {}{}",
            stale.fixture.label,
            stale.fixture.kickoff.format(TIME_FORMAT),
            note
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use reconciler::{FixtureRecord, LateFixture, StaleFixture};

    fn rec(label: &str, h: u32) -> FixtureRecord {
        let kickoff = FixedOffset::east_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 18, h, 0, 0)
            .unwrap();
        FixtureRecord::new(label, kickoff, NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[test]
    fn empty_buckets_say_none() {
        assert_eq!(
            render_summary(&ClassificationResult::default()),
            "=== TODAY TIME DISCREPANCIES ===\n‒ none ‒\n\n=== POSSIBLY PLAYED YESTERDAY ===\n‒ none ‒\n"
        );
    }

    #[test]
    fn lists_fixtures_with_times_and_evidence() {
        let result = ClassificationResult {
            late: vec![LateFixture { fixture: rec("Team A", 10), secondary_kickoff: rec("x", 9).kickoff }],
            possibly_stale: vec![
                StaleFixture { fixture: rec("Team B", 14), prior_day: PriorDayEvidence::Listed },
                StaleFixture { fixture: rec("Team C", 15), prior_day: PriorDayEvidence::Unknown },
            ],
        };

        assert_eq!(
            render_summary(&result),
            "=== TODAY TIME DISCREPANCIES ===\n\
             Team A — 2026-10-18 10:00 (flashscore 09:00)\n\
             \n=== POSSIBLY PLAYED YESTERDAY ===\n\
             Team B — 2026-10-18 14:00 [on yesterday's flashscore listing]\n\
             Team C — 2026-10-18 15:00\n"
        );
    }
}
