//! The content region: the one place a passage is shown.
//!
//! Every render replaces the whole view. Copy visibility is derived from the
//! current view on demand, so no render path can leave it out of date.

use crate::scripture::{PassageRequest, Verse, VerseList};
use std::time::{Duration, Instant};

pub const PLACEHOLDER_PROMPT: &str = "請選擇或搜尋經文";
pub const NO_VERSES_FOUND: &str = "查無經文";
pub const CHOOSE_CHAPTER_FIRST: &str = "請先選擇章";
pub const LOAD_FAILED: &str = "讀取經文失敗";

/// How long the copy icon shows a check mark after a successful copy.
pub const COPY_FEEDBACK: Duration = Duration::from_millis(1200);

/// A heading followed by numbered verse lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Passage {
    pub reference: String,
    pub verses: Vec<(u32, String)>,
}

impl Passage {
    pub fn new(reference: impl Into<String>, verses: impl IntoIterator<Item = Verse>) -> Self {
        Self {
            reference: reference.into(),
            verses: verses.into_iter().map(|v| (v.verse, v.text)).collect(),
        }
    }

    pub fn single(verse: Verse) -> Self {
        Self::new(verse.reference().to_string(), [verse])
    }

    pub fn from_verse_list(list: &VerseList) -> Self {
        Self::new(list.label(), list.verses.iter().cloned())
    }

    pub fn plain_text(&self) -> String {
        let mut text = self.reference.clone();
        for (number, line) in &self.verses {
            text.push('\n');
            text.push_str(&format!("{} {}", number, line));
        }
        text
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ContentView {
    #[default]
    Placeholder,
    Passage(Passage),
    Notice(String),
    Failed {
        message: String,
        retry: Option<PassageRequest>,
    },
}

impl ContentView {
    pub fn plain_text(&self) -> String {
        match self {
            ContentView::Placeholder => PLACEHOLDER_PROMPT.to_string(),
            ContentView::Passage(passage) => passage.plain_text(),
            ContentView::Notice(message) => message.clone(),
            ContentView::Failed { message, .. } => message.clone(),
        }
    }
}

#[derive(Debug, Default)]
pub struct ContentRegion {
    view: ContentView,
    pub scroll: u16,
    copied_at: Option<Instant>,
}

impl ContentRegion {
    pub fn view(&self) -> &ContentView {
        &self.view
    }

    pub fn replace(&mut self, view: ContentView) {
        self.view = view;
        self.scroll = 0;
    }

    pub fn plain_text(&self) -> String {
        self.view.plain_text()
    }

    /// The copy control is shown only for real content.
    pub fn copy_visible(&self) -> bool {
        let text = self.plain_text();
        let text = text.trim();
        !text.is_empty() && text != PLACEHOLDER_PROMPT
    }

    pub fn mark_copied(&mut self, now: Instant) {
        self.copied_at = Some(now);
    }

    pub fn copy_feedback_active(&self, now: Instant) -> bool {
        self.copied_at
            .is_some_and(|at| now.saturating_duration_since(at) < COPY_FEEDBACK)
    }

    /// Drop an expired check mark. Returns true if the icon changed.
    pub fn expire_copy_feedback(&mut self, now: Instant) -> bool {
        if self.copied_at.is_some() && !self.copy_feedback_active(now) {
            self.copied_at = None;
            return true;
        }
        false
    }

    pub fn retry_request(&self) -> Option<&PassageRequest> {
        match &self.view {
            ContentView::Failed { retry, .. } => retry.as_ref(),
            _ => None,
        }
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_add(lines);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.scroll = self.scroll.saturating_sub(lines);
    }
}
