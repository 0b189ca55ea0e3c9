//! Fixture listing markup
//!
//! Odibets oditoday:
//! <div class="match-event"> <div class="event-time">19:30</div> <div class="event-title">Gor Mahia</div> </div>
//!
//! Flashscore football:
//! <div class="event__match"> <div class="event__time">19:30</div>
//!   <div class="event__participant--home">..</div> <div class="event__participant--away">..</div> </div>

use chrono::NaiveDate;
use reconciler::{FixtureRecord, TimeNormalizer};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

enum LabelCells {
    Single(Selector),
    HomeAway { home: Selector, away: Selector },
}

/// Where the fixture rows, labels and kickoff times sit on a listing page.
pub struct ListingLayout {
    /// Row selector, also what the browser waits for.
    pub row_css: &'static str,
    row:         Selector,
    label:       LabelCells,
    time:        Selector,
}

#[derive(Debug, Default)]
pub struct ParsedListing {
    pub records: Vec<FixtureRecord>,
    pub skipped: usize,
}

impl ListingLayout {
    pub fn odibets() -> Self {
        Self {
            row_css: ".match-event",
            row:     Selector::parse(".match-event").unwrap(),
            label:   LabelCells::Single(Selector::parse(".event-title").unwrap()),
            time:    Selector::parse(".event-time").unwrap(),
        }
    }

    pub fn flashscore() -> Self {
        Self {
            row_css: ".event__match",
            row:     Selector::parse(".event__match").unwrap(),
            label:   LabelCells::HomeAway {
                home: Selector::parse(".event__participant--home").unwrap(),
                away: Selector::parse(".event__participant--away").unwrap(),
            },
            time:    Selector::parse(".event__time").unwrap(),
        }
    }

    pub fn count_rows(&self, html: &str) -> usize {
        Html::parse_document(html).select(&self.row).count()
    }

    /// Rows missing a label/time or with an unreadable time are skipped.
    pub fn parse(&self, html: &str, reference_date: NaiveDate, normalizer: &TimeNormalizer) -> ParsedListing {
        let document = Html::parse_document(html);
        let mut parsed = ParsedListing::default();

        for row in document.select(&self.row) {
            let Some(label) = self.label_of(row) else {
                parsed.skipped += 1;
                continue;
            };
            let Some(raw_time) = cell_text(row, &self.time) else {
                debug!("{}: no kickoff cell, skipped", label);
                parsed.skipped += 1;
                continue;
            };

            match normalizer.normalize(&raw_time, reference_date) {
                Ok(kickoff) => parsed.records.push(FixtureRecord::new(label, kickoff, reference_date)),
                Err(e) => {
                    debug!("{}: {:?} skipped ({})", label, raw_time, e);
                    parsed.skipped += 1;
                }
            }
        }

        parsed
    }

    fn label_of(&self, row: ElementRef<'_>) -> Option<String> {
        match &self.label {
            LabelCells::Single(title) => cell_text(row, title),
            LabelCells::HomeAway { home, away } => {
                Some(format!("{} vs {}", cell_text(row, home)?, cell_text(row, away)?))
            }
        }
    }
}

fn cell_text(row: ElementRef<'_>, selector: &Selector) -> Option<String> {
    row.select(selector)
        .next()
        .map(|e| e.text().collect::<String>())
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use pretty_assertions::assert_eq;

    const ODIBETS_HTML: &str = r#"
        <html><body><div class="events">
          <div class="match-event"><div class="event-time">19:30</div><div class="event-title">Gor Mahia</div></div>
          <div class="match-event"><div class="event-time">Live</div><div class="event-title">Tusker</div></div>
          <div class="match-event"><div class="event-time">21:00</div></div>
          <div class="match-event"><div class="event-time"> 13.00 </div><div class="event-title"> AFC
              Leopards </div></div>
        </div></body></html>"#;

    const FLASHSCORE_HTML: &str = r#"
        <html><body><div class="sportName soccer">
          <div class="event__match event__match--scheduled">
            <div class="event__time">18:00</div>
            <div class="event__participant event__participant--home">Arsenal</div>
            <div class="event__participant event__participant--away">Chelsea</div>
          </div>
          <div class="event__match event__match--live">
            <div class="event__time">45'</div>
            <div class="event__participant event__participant--home">Everton</div>
            <div class="event__participant event__participant--away">Fulham</div>
          </div>
          <div class="event__match">
            <div class="event__time">20:00</div>
            <div class="event__participant event__participant--home">Only Home</div>
          </div>
          <div class="event__match">
            <div class="event__time">20:45<span>FRO</span></div>
            <div class="event__participant event__participant--home"><span>Real</span> <span>Madrid</span></div>
            <div class="event__participant event__participant--away">Sevilla</div>
          </div>
        </div></body></html>"#;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    #[test]
    fn odibets_rows_become_records() {
        let parsed = ListingLayout::odibets().parse(ODIBETS_HTML, day(), &TimeNormalizer::default());

        let labels: Vec<_> = parsed.records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Gor Mahia", "AFC Leopards"]);
        assert_eq!(parsed.skipped, 2);

        // UTC page clock, EAT kickoff
        assert_eq!(parsed.records[0].kickoff.hour(), 22);
        assert_eq!(parsed.records[1].kickoff.hour(), 16);
        assert!(parsed.records.iter().all(|r| r.source_date == day()));
    }

    #[test]
    fn flashscore_rows_use_home_vs_away_label() {
        let normalizer = TimeNormalizer::from_hours(3, 3).unwrap();
        let parsed = ListingLayout::flashscore().parse(FLASHSCORE_HTML, day(), &normalizer);

        let labels: Vec<_> = parsed.records.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(labels, vec!["Arsenal vs Chelsea", "Real Madrid vs Sevilla"]);
        assert_eq!(parsed.skipped, 2);
        assert_eq!((parsed.records[1].kickoff.hour(), parsed.records[1].kickoff.minute()), (20, 45));
    }

    #[test]
    fn counts_rows_and_tolerates_foreign_pages() {
        assert_eq!(ListingLayout::flashscore().count_rows(FLASHSCORE_HTML), 4);
        assert_eq!(ListingLayout::odibets().count_rows(FLASHSCORE_HTML), 0);

        let parsed = ListingLayout::odibets().parse("<html>Just a moment...</html>", day(), &TimeNormalizer::default());
        assert!(parsed.records.is_empty());
        assert_eq!(parsed.skipped, 0);
    }

    #[test]
    fn adjacent_inline_tags_do_not_gain_a_space() {
        let html = r#"<div class="match-event"><div class="event-time"><b>19</b>:30</div><div class="event-title"><b>Gor</b>Mahia <i>FC</i></div></div>"#;

        let parsed = ListingLayout::odibets().parse(html, day(), &TimeNormalizer::default());

        assert_eq!(parsed.records.len(), 1);
        assert_eq!(parsed.records[0].label, "GorMahia FC");
        assert_eq!(parsed.records[0].kickoff.hour(), 22);
    }
}
