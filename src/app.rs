use anyhow::Result;
use ratatui::layout::Rect;
use std::time::Instant;

use crate::api::describe_error;
use crate::content::{ContentRegion, ContentView, Passage, CHOOSE_CHAPTER_FIRST, LOAD_FAILED};
use crate::handler::point_in_rect;
use crate::scripture::{PassageRequest, SearchOutcome};
use crate::search::{Activation, SearchDispatch, SearchPanel};
use crate::selector::{Confirm, OptionsRequest, Selector};
use crate::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Content,
}

/// Where a passage load was started from; decides what closes when it lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Search,
    Selector,
    Retry,
}

/// Side effects requested by the app. The runtime carries them out and
/// reports back with [`Loaded`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    LoadBooks,
    LoadOptions(OptionsRequest),
    Search(SearchDispatch),
    LoadPassage {
        seq: u64,
        origin: Origin,
        request: PassageRequest,
    },
    CopyText(String),
    SaveTheme(Theme),
}

/// Completion of an [`Action`].
#[derive(Debug)]
pub enum Loaded {
    Books(Result<Vec<String>>),
    Chapters {
        book: String,
        result: Result<Vec<u32>>,
    },
    VerseNumbers {
        book: String,
        chapter: u32,
        result: Result<Vec<u32>>,
    },
    Search {
        seq: u64,
        result: Result<SearchOutcome>,
    },
    Passage {
        seq: u64,
        origin: Origin,
        request: PassageRequest,
        result: Result<ContentView>,
    },
    Copied(Result<()>),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub focus: Focus,
    pub theme: Theme,

    // Workflows
    pub search: SearchPanel,
    pub selector: Selector,
    pub content: ContentRegion,

    // Latest passage load; older completions are dropped
    passage_seq: u64,

    // Panel areas for mouse hit-testing (updated during render)
    pub search_area: Option<Rect>,
    pub results_area: Option<Rect>,
    pub results_offset: usize,
    pub content_area: Option<Rect>,
    pub copy_area: Option<Rect>,
    pub theme_area: Option<Rect>,
}

impl App {
    pub fn new(theme: Theme) -> Self {
        Self {
            should_quit: false,
            focus: Focus::Search,
            theme,

            search: SearchPanel::default(),
            selector: Selector::default(),
            content: ContentRegion::default(),

            passage_seq: 0,

            search_area: None,
            results_area: None,
            results_offset: 0,
            content_area: None,
            copy_area: None,
            theme_area: None,
        }
    }

    pub fn startup(&self) -> Vec<Action> {
        vec![Action::LoadBooks]
    }

    pub fn tick(&mut self, now: Instant) -> Vec<Action> {
        self.content.expire_copy_feedback(now);
        self.search.tick(now).map(Action::Search).into_iter().collect()
    }

    // Search input
    pub fn type_char(&mut self, c: char, now: Instant) {
        self.focus = Focus::Search;
        self.search.push_char(c, now);
    }

    pub fn backspace(&mut self, now: Instant) {
        self.search.pop_char(now);
    }

    pub fn search_enter(&mut self) -> Vec<Action> {
        match self.search.activate_highlighted() {
            Some(activation) => self.activate(activation),
            None => Vec::new(),
        }
    }

    pub fn activate_result(&mut self, index: usize) -> Vec<Action> {
        match self.search.activate(index) {
            Some(activation) => self.activate(activation),
            None => Vec::new(),
        }
    }

    /// A used result empties the input right away, so anything typed while
    /// its passage loads is a new query.
    fn activate(&mut self, activation: Activation) -> Vec<Action> {
        self.search.clear_input();
        match activation {
            Activation::OpenBook(book) => {
                let request = self.selector.open_with_book(&book);
                vec![Action::LoadOptions(request)]
            }
            Activation::Load(request) => self.request_passage(Origin::Search, request),
            Activation::Show(list) => {
                self.content
                    .replace(ContentView::Passage(Passage::from_verse_list(&list)));
                self.finish(Origin::Search);
                Vec::new()
            }
        }
    }

    fn request_passage(&mut self, origin: Origin, request: PassageRequest) -> Vec<Action> {
        self.passage_seq += 1;
        vec![Action::LoadPassage {
            seq: self.passage_seq,
            origin,
            request,
        }]
    }

    /// Close whatever started a passage load once its result is shown.
    fn finish(&mut self, origin: Origin) {
        match origin {
            // Keep the keyboard on a query typed while the passage loaded.
            Origin::Search => {
                if self.search.input().is_empty() {
                    self.focus = Focus::Content;
                }
            }
            Origin::Selector => self.selector.close(),
            Origin::Retry => {}
        }
    }

    // Selector modal
    pub fn open_selector(&mut self) -> Vec<Action> {
        self.search.hide();
        self.selector.open();
        if self.selector.books().is_empty() {
            vec![Action::LoadBooks]
        } else {
            Vec::new()
        }
    }

    pub fn close_selector(&mut self) {
        self.selector.close();
    }

    pub fn selector_step(&mut self, delta: isize) -> Vec<Action> {
        self.selector
            .step(delta)
            .map(Action::LoadOptions)
            .into_iter()
            .collect()
    }

    pub fn confirm_selection(&mut self) -> Vec<Action> {
        match self.selector.confirm() {
            Confirm::NeedChapter => {
                self.content
                    .replace(ContentView::Notice(CHOOSE_CHAPTER_FIRST.to_string()));
                Vec::new()
            }
            Confirm::Load(request) => self.request_passage(Origin::Selector, request),
        }
    }

    // Content actions
    pub fn toggle_theme(&mut self) -> Vec<Action> {
        self.theme = self.theme.toggled();
        vec![Action::SaveTheme(self.theme)]
    }

    pub fn copy(&self) -> Vec<Action> {
        if !self.content.copy_visible() {
            return Vec::new();
        }
        vec![Action::CopyText(self.content.plain_text())]
    }

    pub fn retry(&mut self) -> Vec<Action> {
        match self.content.retry_request().cloned() {
            Some(request) => self.request_passage(Origin::Retry, request),
            None => Vec::new(),
        }
    }

    /// Left click at a terminal cell.
    pub fn click(&mut self, x: u16, y: u16) -> Vec<Action> {
        let inside = |area: Option<Rect>| area.is_some_and(|r| point_in_rect(x, y, r));

        if self.search.visible && inside(self.results_area) {
            if let Some(area) = self.results_area {
                // One row per result inside a bordered block, scrolled by the list offset.
                if y > area.y {
                    let row = (y - area.y - 1) as usize;
                    return self.activate_result(self.results_offset + row);
                }
            }
            return Vec::new();
        }

        if inside(self.search_area) {
            self.focus = Focus::Search;
            return Vec::new();
        }

        // Anywhere else hides the result panel; the query is kept.
        self.search.hide();

        if inside(self.theme_area) {
            return self.toggle_theme();
        }
        if inside(self.copy_area) {
            return self.copy();
        }
        if inside(self.content_area) {
            self.focus = Focus::Content;
        }
        Vec::new()
    }

    pub fn apply_loaded(&mut self, loaded: Loaded, now: Instant) -> Vec<Action> {
        match loaded {
            Loaded::Books(Ok(books)) => {
                tracing::info!(count = books.len(), "loaded book list");
                self.selector.set_books(books);
            }
            Loaded::Books(Err(err)) => {
                tracing::warn!(error = %err, "failed to load book list");
                self.show_failure("無法載入書卷列表", &err, None);
            }
            Loaded::Chapters { book, result } => match result {
                Ok(chapters) => {
                    if !self.selector.chapters_loaded(&book, chapters) {
                        tracing::debug!(%book, "dropping chapters for a book no longer chosen");
                    }
                }
                Err(err) => {
                    tracing::warn!(%book, error = %err, "failed to load chapters");
                    self.show_failure("無法載入章數", &err, None);
                }
            },
            Loaded::VerseNumbers {
                book,
                chapter,
                result,
            } => match result {
                Ok(verses) => {
                    if !self.selector.verses_loaded(&book, chapter, verses) {
                        tracing::debug!(%book, chapter, "dropping verse numbers for a stale chapter");
                    }
                }
                Err(err) => {
                    tracing::warn!(%book, chapter, error = %err, "failed to load verse numbers");
                    self.show_failure("無法載入節數", &err, None);
                }
            },
            Loaded::Search { seq, result } => match result {
                Ok(outcome) => {
                    if !self.search.results_loaded(seq, outcome) {
                        tracing::debug!(seq, "dropping stale search response");
                    }
                }
                Err(err) => {
                    tracing::warn!(seq, error = %err, "search failed");
                    if self.search.search_failed(seq) {
                        self.show_failure("搜尋失敗", &err, None);
                    }
                }
            },
            Loaded::Passage {
                seq,
                origin,
                request,
                result,
            } => {
                if seq != self.passage_seq {
                    tracing::debug!(seq, latest = self.passage_seq, "dropping stale passage");
                    return Vec::new();
                }
                match result {
                    Ok(view) => self.content.replace(view),
                    Err(err) => {
                        tracing::warn!(passage = %request.heading(), error = %err, "failed to load passage");
                        self.show_failure(LOAD_FAILED, &err, Some(request));
                    }
                }
                self.finish(origin);
            }
            Loaded::Copied(Ok(())) => self.content.mark_copied(now),
            Loaded::Copied(Err(err)) => {
                tracing::warn!(error = %err, "clipboard write failed");
            }
        }
        Vec::new()
    }

    fn show_failure(&mut self, what: &str, err: &anyhow::Error, retry: Option<PassageRequest>) {
        self.content.replace(ContentView::Failed {
            message: format!("{}：{}", what, describe_error(err)),
            retry,
        });
    }
}
