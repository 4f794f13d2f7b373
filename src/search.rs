//! Search-as-you-type: debounced dispatch, result panel and keyboard
//! navigation over its rows.

use crate::scripture::{PassageRequest, SearchEntry, SearchOutcome, VerseList};
use std::time::{Duration, Instant};

pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// A query ready to be sent, tagged with its sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchDispatch {
    pub seq: u64,
    pub query: String,
}

/// What activating a result row does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Open the selector with this book chosen.
    OpenBook(String),
    Load(PassageRequest),
    /// Render these verses as they are; nothing to fetch.
    Show(VerseList),
}

#[derive(Debug, Default)]
pub struct SearchPanel {
    input: String,
    pub visible: bool,
    outcome: SearchOutcome,
    highlighted: Option<usize>,
    dirty_since: Option<Instant>,
    latest_seq: u64,
}

impl SearchPanel {
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn outcome(&self) -> &SearchOutcome {
        &self.outcome
    }

    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn has_pending(&self) -> bool {
        self.dirty_since.is_some()
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.input.push(c);
        self.edited(now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        self.input.pop();
        self.edited(now);
    }

    /// Empty the input after a result was used. Searches still in flight
    /// belong to the old query and are dropped when they land.
    pub fn clear_input(&mut self) {
        self.input.clear();
        self.visible = false;
        self.highlighted = None;
        self.dirty_since = None;
        self.latest_seq += 1;
    }

    /// Restart the quiet window, or drop everything for a blank query.
    fn edited(&mut self, now: Instant) {
        if self.input.trim().is_empty() {
            self.visible = false;
            self.highlighted = None;
            self.dirty_since = None;
            // Whatever is still in flight belongs to an older query.
            self.latest_seq += 1;
        } else {
            self.dirty_since = Some(now);
        }
    }

    /// Dispatch the query once the input has been quiet for the debounce window.
    pub fn tick(&mut self, now: Instant) -> Option<SearchDispatch> {
        let since = self.dirty_since?;
        if now.saturating_duration_since(since) < SEARCH_DEBOUNCE {
            return None;
        }
        self.dirty_since = None;
        self.latest_seq += 1;
        Some(SearchDispatch {
            seq: self.latest_seq,
            query: self.input.trim().to_string(),
        })
    }

    /// Apply a response. Returns false if `seq` is not the latest dispatch.
    pub fn results_loaded(&mut self, seq: u64, outcome: SearchOutcome) -> bool {
        if seq != self.latest_seq {
            return false;
        }
        self.visible = outcome.row_count() > 0;
        self.outcome = outcome;
        self.highlighted = None;
        true
    }

    pub fn search_failed(&mut self, seq: u64) -> bool {
        self.results_loaded(seq, SearchOutcome::Empty)
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn row_count(&self) -> usize {
        self.outcome.row_count()
    }

    pub fn rows(&self) -> Vec<String> {
        self.outcome.labels()
    }

    fn navigable(&self) -> Option<usize> {
        let count = self.row_count();
        (self.visible && count > 0).then_some(count)
    }

    pub fn move_down(&mut self) {
        let Some(count) = self.navigable() else {
            return;
        };
        self.highlighted = Some(match self.highlighted {
            Some(i) => (i + 1) % count,
            None => 0,
        });
    }

    pub fn move_up(&mut self) {
        let Some(count) = self.navigable() else {
            return;
        };
        self.highlighted = Some(match self.highlighted {
            Some(i) => (i + count - 1) % count,
            None => count - 1,
        });
    }

    /// Enter: activate the highlighted row, if any.
    pub fn activate_highlighted(&self) -> Option<Activation> {
        self.navigable()?;
        self.activate(self.highlighted?)
    }

    pub fn activate(&self, index: usize) -> Option<Activation> {
        match &self.outcome {
            SearchOutcome::Empty => None,
            SearchOutcome::VerseList(list) => (index == 0).then(|| Activation::Show(list.clone())),
            SearchOutcome::Entries(entries) => {
                let entry = entries.get(index)?;
                Some(match entry {
                    SearchEntry::Book { book } => Activation::OpenBook(book.clone()),
                    _ => Activation::Load(entry.passage()?),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripture::{Verse, VerseRef};

    fn typed(panel: &mut SearchPanel, text: &str, at: Instant) {
        for c in text.chars() {
            panel.push_char(c, at);
        }
    }

    fn entries(n: u32) -> SearchOutcome {
        SearchOutcome::Entries(
            (1..=n)
                .map(|v| SearchEntry::Single(VerseRef::new("約翰福音", 3, v)))
                .collect(),
        )
    }

    fn loaded(n: u32) -> SearchPanel {
        let mut panel = SearchPanel::default();
        let start = Instant::now();
        typed(&mut panel, "約3", start);
        let dispatch = panel.tick(start + SEARCH_DEBOUNCE).unwrap();
        assert!(panel.results_loaded(dispatch.seq, entries(n)));
        panel
    }

    #[test]
    fn test_debounce_restarts_on_each_keystroke() {
        let mut panel = SearchPanel::default();
        let start = Instant::now();
        panel.push_char('約', start);
        panel.push_char('3', start + Duration::from_millis(200));

        // 300ms after the first key, but only 100ms after the last.
        assert_eq!(panel.tick(start + SEARCH_DEBOUNCE), None);
        assert!(panel.has_pending());

        let dispatch = panel
            .tick(start + Duration::from_millis(200) + SEARCH_DEBOUNCE)
            .unwrap();
        assert_eq!(dispatch.query, "約3");
        assert_eq!(dispatch.seq, 1);

        // Exactly one dispatch per quiet window.
        assert_eq!(panel.tick(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_query_is_trimmed() {
        let mut panel = SearchPanel::default();
        let start = Instant::now();
        typed(&mut panel, "  約翰福音 3:16 ", start);
        let dispatch = panel.tick(start + SEARCH_DEBOUNCE).unwrap();
        assert_eq!(dispatch.query, "約翰福音 3:16");
    }

    #[test]
    fn test_blank_input_hides_and_cancels() {
        let mut panel = loaded(3);
        panel.move_down();
        assert!(panel.visible);

        let now = Instant::now();
        while !panel.input().is_empty() {
            panel.pop_char(now);
        }
        panel.push_char(' ', now);
        assert!(!panel.visible);
        assert_eq!(panel.highlighted(), None);
        assert_eq!(panel.tick(now + SEARCH_DEBOUNCE), None);
    }

    #[test]
    fn test_stale_response_is_discarded() {
        let mut panel = SearchPanel::default();
        let start = Instant::now();
        typed(&mut panel, "約", start);
        let first = panel.tick(start + SEARCH_DEBOUNCE).unwrap();
        typed(&mut panel, "3", start + SEARCH_DEBOUNCE);
        let second = panel.tick(start + SEARCH_DEBOUNCE * 2).unwrap();
        assert!(second.seq > first.seq);

        assert!(panel.results_loaded(second.seq, entries(2)));
        assert!(!panel.results_loaded(first.seq, entries(5)));
        assert_eq!(panel.row_count(), 2);
    }

    #[test]
    fn test_response_after_clearing_is_discarded() {
        let mut panel = SearchPanel::default();
        let start = Instant::now();
        typed(&mut panel, "約", start);
        let dispatch = panel.tick(start + SEARCH_DEBOUNCE).unwrap();
        panel.pop_char(start + SEARCH_DEBOUNCE);
        assert!(!panel.results_loaded(dispatch.seq, entries(2)));
        assert!(!panel.visible);
    }

    #[test]
    fn test_clear_input_drops_in_flight_search() {
        let mut panel = loaded(2);
        panel.move_down();
        let start = Instant::now();
        panel.push_char(':', start);
        let pending = panel.tick(start + SEARCH_DEBOUNCE).unwrap();

        panel.clear_input();
        assert!(!panel.visible);
        assert_eq!(panel.highlighted(), None);
        assert!(!panel.has_pending());
        assert!(!panel.results_loaded(pending.seq, entries(1)));
        assert!(!panel.visible);
    }

    #[test]
    fn test_empty_results_hide_panel() {
        let mut panel = SearchPanel::default();
        let start = Instant::now();
        typed(&mut panel, "xyz", start);
        let dispatch = panel.tick(start + SEARCH_DEBOUNCE).unwrap();
        assert!(panel.results_loaded(dispatch.seq, SearchOutcome::Empty));
        assert!(!panel.visible);
    }

    #[test]
    fn test_navigation_wraps_both_ways() {
        let mut panel = loaded(3);
        panel.move_down();
        assert_eq!(panel.highlighted(), Some(0));
        panel.move_down();
        panel.move_down();
        assert_eq!(panel.highlighted(), Some(2));
        panel.move_down();
        assert_eq!(panel.highlighted(), Some(0));
        panel.move_up();
        assert_eq!(panel.highlighted(), Some(2));

        let mut panel = loaded(3);
        panel.move_up();
        assert_eq!(panel.highlighted(), Some(2));
    }

    #[test]
    fn test_index_stays_in_bounds() {
        for n in 1..=5 {
            let mut panel = loaded(n);
            for step in 0..(3 * n as usize) {
                if step % 3 == 0 {
                    panel.move_up();
                } else {
                    panel.move_down();
                }
                let i = panel.highlighted().unwrap();
                assert!(i < n as usize);
            }
        }
    }

    #[test]
    fn test_keys_are_noops_when_hidden() {
        let mut panel = loaded(3);
        panel.hide();
        panel.move_down();
        panel.move_up();
        assert_eq!(panel.highlighted(), None);
        assert_eq!(panel.activate_highlighted(), None);
    }

    #[test]
    fn test_enter_without_highlight_is_noop() {
        let panel = loaded(3);
        assert_eq!(panel.activate_highlighted(), None);
    }

    #[test]
    fn test_enter_activates_highlighted_row() {
        let mut panel = loaded(3);
        panel.move_down();
        panel.move_down();
        assert_eq!(
            panel.activate_highlighted(),
            Some(Activation::Load(PassageRequest::Single(VerseRef::new(
                "約翰福音", 3, 2
            ))))
        );
    }

    #[test]
    fn test_verse_list_is_one_row() {
        let mut panel = SearchPanel::default();
        let start = Instant::now();
        typed(&mut panel, "詩23:1-2", start);
        let dispatch = panel.tick(start + SEARCH_DEBOUNCE).unwrap();
        let list = VerseList {
            book: "詩篇".into(),
            chapter: 23,
            verses: vec![
                Verse {
                    book: "詩篇".into(),
                    chapter: 23,
                    verse: 1,
                    text: "耶和華是我的牧者".into(),
                },
                Verse {
                    book: "詩篇".into(),
                    chapter: 23,
                    verse: 2,
                    text: "他使我躺臥在青草地上".into(),
                },
            ],
        };
        panel.results_loaded(dispatch.seq, SearchOutcome::VerseList(list.clone()));
        assert_eq!(panel.rows(), vec!["詩篇 23:1-2".to_string()]);
        panel.move_down();
        assert_eq!(panel.activate_highlighted(), Some(Activation::Show(list)));
    }

    #[test]
    fn test_book_row_opens_selector() {
        let mut panel = SearchPanel::default();
        let start = Instant::now();
        typed(&mut panel, "約翰", start);
        let dispatch = panel.tick(start + SEARCH_DEBOUNCE).unwrap();
        panel.results_loaded(
            dispatch.seq,
            SearchOutcome::Entries(vec![SearchEntry::Book {
                book: "約翰福音".into(),
            }]),
        );
        assert_eq!(
            panel.activate(0),
            Some(Activation::OpenBook("約翰福音".into()))
        );
    }
}
