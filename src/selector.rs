//! Cascading book → chapter → verse picker shown in the selector modal.
//!
//! Choosing a book clears chapter and verse options right away and asks for
//! the book's chapters; choosing a chapter clears the verse options and asks
//! for the chapter's verse numbers. Option lists that arrive for a choice
//! that is no longer current are dropped.

use crate::scripture::{PassageRequest, VerseRef};

pub const BOOK_PLACEHOLDER: &str = "（請選擇書卷）";
pub const CHAPTER_PLACEHOLDER: &str = "（請選擇章）";
pub const VERSE_PLACEHOLDER: &str = "（全部）";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorStage {
    NoBook,
    BookChosen,
    ChapterChosen,
    VerseChosen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectorField {
    #[default]
    Book,
    Chapter,
    Verse,
}

impl SelectorField {
    pub fn next(self) -> Self {
        match self {
            SelectorField::Book => SelectorField::Chapter,
            SelectorField::Chapter => SelectorField::Verse,
            SelectorField::Verse => SelectorField::Book,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            SelectorField::Book => SelectorField::Verse,
            SelectorField::Chapter => SelectorField::Book,
            SelectorField::Verse => SelectorField::Chapter,
        }
    }
}

/// Option list the selector needs from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionsRequest {
    Chapters { book: String },
    VerseNumbers { book: String, chapter: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirm {
    /// No chapter chosen; nothing is fetched.
    NeedChapter,
    Load(PassageRequest),
}

#[derive(Debug, Default)]
pub struct Selector {
    pub visible: bool,
    pub focus: SelectorField,
    books: Vec<String>,
    chapters: Vec<u32>,
    verses: Vec<u32>,
    book: Option<String>,
    chapter: Option<u32>,
    verse: Option<u32>,
}

impl Selector {
    pub fn set_books(&mut self, books: Vec<String>) {
        self.books = books;
    }

    pub fn books(&self) -> &[String] {
        &self.books
    }

    pub fn chapters(&self) -> &[u32] {
        &self.chapters
    }

    pub fn verses(&self) -> &[u32] {
        &self.verses
    }

    pub fn book(&self) -> Option<&str> {
        self.book.as_deref()
    }

    pub fn chapter(&self) -> Option<u32> {
        self.chapter
    }

    pub fn verse(&self) -> Option<u32> {
        self.verse
    }

    pub fn stage(&self) -> SelectorStage {
        match (&self.book, self.chapter, self.verse) {
            (None, _, _) => SelectorStage::NoBook,
            (Some(_), None, _) => SelectorStage::BookChosen,
            (Some(_), Some(_), None) => SelectorStage::ChapterChosen,
            (Some(_), Some(_), Some(_)) => SelectorStage::VerseChosen,
        }
    }

    /// Show the modal with every field cleared.
    pub fn open(&mut self) {
        self.book = None;
        self.clear_chapters();
        self.focus = SelectorField::Book;
        self.visible = true;
    }

    /// Show the modal with `book` already chosen.
    pub fn open_with_book(&mut self, book: &str) -> OptionsRequest {
        self.visible = true;
        self.focus = SelectorField::Chapter;
        self.choose_book(book)
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    fn clear_chapters(&mut self) {
        self.chapters.clear();
        self.chapter = None;
        self.clear_verses();
    }

    fn clear_verses(&mut self) {
        self.verses.clear();
        self.verse = None;
    }

    pub fn choose_book(&mut self, book: &str) -> OptionsRequest {
        self.book = Some(book.to_string());
        self.clear_chapters();
        OptionsRequest::Chapters {
            book: book.to_string(),
        }
    }

    /// Returns false when the list belongs to a book that is no longer chosen.
    pub fn chapters_loaded(&mut self, book: &str, chapters: Vec<u32>) -> bool {
        if self.book.as_deref() != Some(book) {
            return false;
        }
        self.chapters = chapters;
        self.chapter = None;
        self.clear_verses();
        true
    }

    /// `None` is the placeholder option: verses are cleared and nothing is fetched.
    pub fn choose_chapter(&mut self, chapter: Option<u32>) -> Option<OptionsRequest> {
        self.chapter = chapter;
        self.clear_verses();
        let book = self.book.clone()?;
        let chapter = chapter?;
        Some(OptionsRequest::VerseNumbers { book, chapter })
    }

    pub fn verses_loaded(&mut self, book: &str, chapter: u32, verses: Vec<u32>) -> bool {
        if self.book.as_deref() != Some(book) || self.chapter != Some(chapter) {
            return false;
        }
        self.verses = verses;
        self.verse = None;
        true
    }

    pub fn choose_verse(&mut self, verse: Option<u32>) {
        self.verse = verse;
    }

    pub fn confirm(&self) -> Confirm {
        let (Some(book), Some(chapter)) = (self.book.clone(), self.chapter) else {
            return Confirm::NeedChapter;
        };
        match self.verse {
            None => Confirm::Load(PassageRequest::Chapter { book, chapter }),
            Some(verse) => Confirm::Load(PassageRequest::Single(VerseRef::new(book, chapter, verse))),
        }
    }

    pub fn focus_next(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.prev();
    }

    /// Labels of the options in `field`, placeholder first.
    pub fn option_labels(&self, field: SelectorField) -> Vec<String> {
        let (placeholder, rest): (&str, Vec<String>) = match field {
            SelectorField::Book => (BOOK_PLACEHOLDER, self.books.clone()),
            SelectorField::Chapter => (
                CHAPTER_PLACEHOLDER,
                self.chapters.iter().map(u32::to_string).collect(),
            ),
            SelectorField::Verse => (
                VERSE_PLACEHOLDER,
                self.verses.iter().map(u32::to_string).collect(),
            ),
        };
        // Empty option lists show nothing at all, like a cleared <select>.
        if field != SelectorField::Book && rest.is_empty() {
            return Vec::new();
        }
        std::iter::once(placeholder.to_string()).chain(rest).collect()
    }

    /// Index into `option_labels(field)` of the current choice.
    pub fn selected_index(&self, field: SelectorField) -> usize {
        let position = match field {
            SelectorField::Book => self
                .book
                .as_ref()
                .and_then(|b| self.books.iter().position(|x| x == b)),
            SelectorField::Chapter => self
                .chapter
                .and_then(|c| self.chapters.iter().position(|&x| x == c)),
            SelectorField::Verse => self
                .verse
                .and_then(|v| self.verses.iter().position(|&x| x == v)),
        };
        position.map(|p| p + 1).unwrap_or(0)
    }

    /// Step the focused field's choice by `delta` options and run its change
    /// cascade. Returns the option list that must now be fetched, if any.
    pub fn step(&mut self, delta: isize) -> Option<OptionsRequest> {
        let count = self.option_labels(self.focus).len();
        if count == 0 {
            return None;
        }
        let current = self.selected_index(self.focus) as isize;
        let target = (current + delta).clamp(0, count as isize - 1) as usize;
        if target as isize == current {
            return None;
        }
        // Index 0 is the placeholder in every field.
        let pick = target.checked_sub(1);
        match self.focus {
            SelectorField::Book => match pick.and_then(|i| self.books.get(i).cloned()) {
                Some(book) => Some(self.choose_book(&book)),
                None => {
                    self.book = None;
                    self.clear_chapters();
                    None
                }
            },
            SelectorField::Chapter => {
                let chapter = pick.and_then(|i| self.chapters.get(i).copied());
                self.choose_chapter(chapter)
            }
            SelectorField::Verse => {
                let verse = pick.and_then(|i| self.verses.get(i).copied());
                self.choose_verse(verse);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn selector_with_chapter() -> Selector {
        let mut selector = Selector::default();
        selector.set_books(vec!["創世記".into(), "約翰福音".into()]);
        selector.open();
        selector.choose_book("約翰福音");
        selector.chapters_loaded("約翰福音", vec![1, 2, 3]);
        selector.choose_chapter(Some(3));
        selector.verses_loaded("約翰福音", 3, vec![1, 2, 16]);
        selector
    }

    #[test]
    fn test_open_resets_everything() {
        let mut selector = selector_with_chapter();
        selector.choose_verse(Some(16));
        assert_eq!(selector.stage(), SelectorStage::VerseChosen);

        selector.open();
        assert!(selector.visible);
        assert_eq!(selector.stage(), SelectorStage::NoBook);
        assert!(selector.chapters().is_empty());
        assert!(selector.verses().is_empty());
    }

    #[test]
    fn test_book_change_clears_before_fetch_resolves() {
        let mut selector = selector_with_chapter();
        let request = selector.choose_book("創世記");
        assert_eq!(
            request,
            OptionsRequest::Chapters {
                book: "創世記".into()
            }
        );
        assert!(selector.chapters().is_empty());
        assert!(selector.verses().is_empty());
        assert_eq!(selector.stage(), SelectorStage::BookChosen);
    }

    #[test]
    fn test_stale_chapter_list_is_dropped() {
        let mut selector = Selector::default();
        selector.choose_book("創世記");
        selector.choose_book("出埃及記");
        assert!(!selector.chapters_loaded("創世記", vec![1, 2]));
        assert!(selector.chapters().is_empty());
        assert!(selector.chapters_loaded("出埃及記", vec![1]));
        assert_eq!(selector.chapters(), &[1]);
        assert!(selector.verses().is_empty());
    }

    #[test]
    fn test_placeholder_chapter_clears_verses_without_fetch() {
        let mut selector = selector_with_chapter();
        assert_eq!(selector.choose_chapter(None), None);
        assert!(selector.verses().is_empty());
        assert_eq!(selector.stage(), SelectorStage::BookChosen);
    }

    #[test]
    fn test_chapter_change_requests_verses() {
        let mut selector = selector_with_chapter();
        let request = selector.choose_chapter(Some(2));
        assert_eq!(
            request,
            Some(OptionsRequest::VerseNumbers {
                book: "約翰福音".into(),
                chapter: 2
            })
        );
        assert!(selector.verses().is_empty());
        assert!(!selector.verses_loaded("約翰福音", 3, vec![1]));
        assert!(selector.verses_loaded("約翰福音", 2, vec![1, 2]));
    }

    #[test]
    fn test_confirm_paths() {
        let mut selector = Selector::default();
        selector.choose_book("約翰福音");
        assert_eq!(selector.confirm(), Confirm::NeedChapter);

        let mut selector = selector_with_chapter();
        assert_eq!(
            selector.confirm(),
            Confirm::Load(PassageRequest::Chapter {
                book: "約翰福音".into(),
                chapter: 3
            })
        );
        selector.choose_verse(Some(16));
        assert_eq!(
            selector.confirm(),
            Confirm::Load(PassageRequest::Single(VerseRef::new("約翰福音", 3, 16)))
        );
    }

    #[test]
    fn test_option_labels_have_placeholders() {
        let selector = selector_with_chapter();
        assert_eq!(
            selector.option_labels(SelectorField::Chapter),
            vec!["（請選擇章）", "1", "2", "3"]
        );
        assert_eq!(
            selector.option_labels(SelectorField::Verse),
            vec!["（全部）", "1", "2", "16"]
        );
        assert_eq!(selector.selected_index(SelectorField::Chapter), 3);
        assert_eq!(selector.selected_index(SelectorField::Verse), 0);
    }

    #[test]
    fn test_step_runs_cascade() {
        let mut selector = Selector::default();
        selector.set_books(vec!["創世記".into(), "約翰福音".into()]);
        selector.open();

        assert_eq!(
            selector.step(1),
            Some(OptionsRequest::Chapters {
                book: "創世記".into()
            })
        );
        selector.chapters_loaded("創世記", vec![1, 2]);

        selector.focus_next();
        assert_eq!(
            selector.step(1),
            Some(OptionsRequest::VerseNumbers {
                book: "創世記".into(),
                chapter: 1
            })
        );
        selector.verses_loaded("創世記", 1, vec![1, 2, 3]);

        // Back to the placeholder: no fetch, verses cleared.
        assert_eq!(selector.step(-1), None);
        assert!(selector.verses().is_empty());

        selector.focus_next();
        assert_eq!(selector.step(1), None);
        assert_eq!(selector.verse(), None);
    }

    #[test]
    fn test_open_with_book_focuses_chapter() {
        let mut selector = Selector::default();
        let request = selector.open_with_book("羅馬書");
        assert!(selector.visible);
        assert_eq!(selector.focus, SelectorField::Chapter);
        assert_eq!(selector.book(), Some("羅馬書"));
        assert_eq!(
            request,
            OptionsRequest::Chapters {
                book: "羅馬書".into()
            }
        );
    }
}
