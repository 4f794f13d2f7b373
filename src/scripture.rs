use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one verse: book, chapter and verse number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerseRef {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseRef {
    pub fn new(book: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self {
            book: book.into(),
            chapter,
            verse,
        }
    }
}

impl fmt::Display for VerseRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}:{}", self.book, self.chapter, self.verse)
    }
}

/// Payload of `/api/verse/{book}/{chapter}/{verse}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub book: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
}

impl Verse {
    pub fn reference(&self) -> VerseRef {
        VerseRef::new(self.book.clone(), self.chapter, self.verse)
    }
}

/// Chapter and verse numbers come back as JSON numbers from the reference
/// backend, but other deployments send numeric strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum NumberOrText {
    Number(u32),
    Text(String),
}

impl NumberOrText {
    fn into_number(self) -> Option<u32> {
        match self {
            NumberOrText::Number(n) => Some(n),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }
}

pub(crate) fn numbers_from(items: Vec<NumberOrText>) -> Vec<u32> {
    items.into_iter().filter_map(NumberOrText::into_number).collect()
}

/// One raw item from `/api/search`, before classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub book: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_start: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verse_end: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A server-declared search result shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEntry {
    Book {
        book: String,
    },
    Range {
        book: String,
        chapter: u32,
        verse_start: u32,
        verse_end: u32,
    },
    Single(VerseRef),
    Chapter {
        book: String,
        chapter: u32,
    },
}

impl SearchEntry {
    fn from_hit(hit: SearchHit) -> Option<Self> {
        let kind = hit.kind.as_deref()?;
        let book = hit.book?;
        match kind {
            "book" => Some(SearchEntry::Book { book }),
            "range" => Some(SearchEntry::Range {
                book,
                chapter: hit.chapter?,
                verse_start: hit.verse_start?,
                verse_end: hit.verse_end?,
            }),
            "single" => Some(SearchEntry::Single(VerseRef::new(book, hit.chapter?, hit.verse?))),
            "chapter" => Some(SearchEntry::Chapter {
                book,
                chapter: hit.chapter?,
            }),
            other => {
                tracing::debug!(kind = other, "skipping search hit with unknown type");
                None
            }
        }
    }

    /// Text of the result row.
    pub fn label(&self) -> String {
        match self {
            SearchEntry::Book { book } => book.clone(),
            SearchEntry::Range {
                book,
                chapter,
                verse_start,
                verse_end,
            } => format!("{} {}:{}-{}", book, chapter, verse_start, verse_end),
            SearchEntry::Single(reference) => reference.to_string(),
            SearchEntry::Chapter { book, chapter } => format!("{} {}章", book, chapter),
        }
    }

    /// The passage this entry loads, or `None` for a bare book hit.
    pub fn passage(&self) -> Option<PassageRequest> {
        match self {
            SearchEntry::Book { .. } => None,
            SearchEntry::Range {
                book,
                chapter,
                verse_start,
                verse_end,
            } => Some(PassageRequest::Range {
                book: book.clone(),
                chapter: *chapter,
                start: *verse_start,
                end: *verse_end,
            }),
            SearchEntry::Single(reference) => Some(PassageRequest::Single(reference.clone())),
            SearchEntry::Chapter { book, chapter } => Some(PassageRequest::Chapter {
                book: book.clone(),
                chapter: *chapter,
            }),
        }
    }
}

/// Several verses returned inline by the search endpoint, without a `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseList {
    pub book: String,
    pub chapter: u32,
    pub verses: Vec<Verse>,
}

impl VerseList {
    fn from_hits(hits: &[SearchHit]) -> Option<Self> {
        let first = hits.first()?;
        let book = first.book.clone()?;
        let chapter = first.chapter?;
        let verses = hits
            .iter()
            .filter_map(|hit| {
                Some(Verse {
                    book: hit.book.clone().unwrap_or_else(|| book.clone()),
                    chapter: hit.chapter.unwrap_or(chapter),
                    verse: hit.verse?,
                    text: hit.text.clone().unwrap_or_default(),
                })
            })
            .collect();
        Some(Self {
            book,
            chapter,
            verses,
        })
    }

    /// First and last verse numbers, in server order.
    pub fn range(&self) -> (u32, u32) {
        let first = self.verses.first().map(|v| v.verse).unwrap_or_default();
        let last = self.verses.last().map(|v| v.verse).unwrap_or(first);
        (first, last)
    }

    pub fn label(&self) -> String {
        let (first, last) = self.range();
        format!("{} {}:{}-{}", self.book, self.chapter, first, last)
    }
}

/// Classified response of `/api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchOutcome {
    #[default]
    Empty,
    VerseList(VerseList),
    Entries(Vec<SearchEntry>),
}

impl SearchOutcome {
    pub fn from_hits(hits: Vec<SearchHit>) -> Self {
        if hits.is_empty() {
            return SearchOutcome::Empty;
        }

        let untyped_verses =
            hits.len() > 1 && hits.iter().all(|h| h.verse.is_some() && h.kind.is_none());
        if untyped_verses {
            if let Some(list) = VerseList::from_hits(&hits) {
                return SearchOutcome::VerseList(list);
            }
        }

        let entries: Vec<SearchEntry> = hits.into_iter().filter_map(SearchEntry::from_hit).collect();
        if entries.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Entries(entries)
        }
    }

    /// Number of rows the result panel shows.
    pub fn row_count(&self) -> usize {
        match self {
            SearchOutcome::Empty => 0,
            SearchOutcome::VerseList(_) => 1,
            SearchOutcome::Entries(entries) => entries.len(),
        }
    }

    pub fn labels(&self) -> Vec<String> {
        match self {
            SearchOutcome::Empty => Vec::new(),
            SearchOutcome::VerseList(list) => vec![list.label()],
            SearchOutcome::Entries(entries) => entries.iter().map(SearchEntry::label).collect(),
        }
    }
}

/// What the content region should fetch and show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassageRequest {
    Single(VerseRef),
    Range {
        book: String,
        chapter: u32,
        start: u32,
        end: u32,
    },
    Chapter {
        book: String,
        chapter: u32,
    },
}

impl PassageRequest {
    /// Heading shown above the verses.
    pub fn heading(&self) -> String {
        match self {
            PassageRequest::Single(reference) => reference.to_string(),
            PassageRequest::Range {
                book,
                chapter,
                start,
                end,
            } => format!("{} {}:{}-{}", book, chapter, start, end),
            PassageRequest::Chapter { book, chapter } => format!("{} 第{}章", book, chapter),
        }
    }
}
