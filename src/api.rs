use anyhow::{anyhow, Context, Result};
use futures_util::future::try_join_all;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;

use crate::content::{ContentView, Passage, NO_VERSES_FOUND};
use crate::scripture::{numbers_from, NumberOrText, PassageRequest, SearchHit, SearchOutcome, Verse};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

/// A non-success HTTP status from the scripture API.
#[derive(Debug)]
pub struct StatusError {
    pub status: StatusCode,
    pub url: String,
}

impl fmt::Display for StatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request to {} failed with status: {}", self.url, self.status)
    }
}

impl std::error::Error for StatusError {}

/// Turn a fetch failure into a line fit for the content region.
pub fn describe_error(err: &anyhow::Error) -> String {
    for cause in err.chain() {
        if let Some(status) = cause.downcast_ref::<StatusError>() {
            if status.status == StatusCode::NOT_FOUND {
                return "找不到經文".to_string();
            }
            return format!("伺服器錯誤 ({})", status.status);
        }
        if let Some(e) = cause.downcast_ref::<reqwest::Error>() {
            return if e.is_connect() || e.is_request() {
                "無法連線到經文伺服器".to_string()
            } else if e.is_timeout() {
                "連線逾時".to_string()
            } else if e.is_decode() {
                "伺服器回應格式錯誤".to_string()
            } else {
                "網路錯誤".to_string()
            };
        }
    }
    err.to_string()
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid API base URL: {}", base_url))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API base URL cannot hold paths: {}", base_url));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/seg/seg/...` with each segment percent-escaped.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        tracing::debug!(%url, "GET");

        let response = self.client.get(url.clone()).send().await?;

        if !response.status().is_success() {
            tracing::warn!(%url, status = %response.status(), "scripture API request failed");
            return Err(StatusError {
                status: response.status(),
                url: url.to_string(),
            }
            .into());
        }

        let value = response
            .json::<T>()
            .await
            .with_context(|| format!("unexpected response from {}", url))?;
        Ok(value)
    }

    pub async fn list_books(&self) -> Result<Vec<String>> {
        self.get_json(self.endpoint(&["api", "books"])).await
    }

    pub async fn list_chapters(&self, book: &str) -> Result<Vec<u32>> {
        let items: Vec<NumberOrText> = self.get_json(self.endpoint(&["api", "chapters", book])).await?;
        Ok(numbers_from(items))
    }

    pub async fn list_verse_numbers(&self, book: &str, chapter: u32) -> Result<Vec<u32>> {
        let url = self.endpoint(&["api", "verses", book, &chapter.to_string()]);
        let items: Vec<NumberOrText> = self.get_json(url).await?;
        Ok(numbers_from(items))
    }

    pub async fn get_verse(&self, book: &str, chapter: u32, verse: u32) -> Result<Verse> {
        let url = self.endpoint(&["api", "verse", book, &chapter.to_string(), &verse.to_string()]);
        self.get_json(url).await
    }

    /// Blank queries never reach the server.
    pub async fn search(&self, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchOutcome::Empty);
        }

        let mut url = self.endpoint(&["api", "search"]);
        url.query_pairs_mut().append_pair("q", query);

        let hits: Vec<SearchHit> = self.get_json(url).await?;
        Ok(SearchOutcome::from_hits(hits))
    }

    /// Fetch the given verses concurrently. One failure fails the whole set.
    async fn fetch_verses(&self, book: &str, chapter: u32, numbers: &[u32]) -> Result<Vec<Verse>> {
        try_join_all(numbers.iter().map(|&n| self.get_verse(book, chapter, n)))
            .await
            .with_context(|| format!("failed to load {} {}", book, chapter))
    }

    pub async fn load_passage(&self, request: &PassageRequest) -> Result<ContentView> {
        match request {
            PassageRequest::Single(reference) => {
                let verse = self
                    .get_verse(&reference.book, reference.chapter, reference.verse)
                    .await?;
                Ok(ContentView::Passage(Passage::single(verse)))
            }
            PassageRequest::Range {
                book,
                chapter,
                start,
                end,
            } => {
                let wanted: Vec<u32> = self
                    .list_verse_numbers(book, *chapter)
                    .await?
                    .into_iter()
                    .filter(|n| (*start..=*end).contains(n))
                    .collect();
                let verses = self.fetch_verses(book, *chapter, &wanted).await?;
                Ok(ContentView::Passage(Passage::new(request.heading(), verses)))
            }
            PassageRequest::Chapter { book, chapter } => {
                let numbers = self.list_verse_numbers(book, *chapter).await?;
                if numbers.is_empty() {
                    return Ok(ContentView::Notice(NO_VERSES_FOUND.to_string()));
                }
                let verses = self.fetch_verses(book, *chapter, &numbers).await?;
                Ok(ContentView::Passage(Passage::new(request.heading(), verses)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_escapes_segments() {
        let client = ApiClient::new("http://localhost:5000").unwrap();
        let url = client.endpoint(&["api", "verse", "約翰福音", "3", "16"]);
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/api/verse/%E7%B4%84%E7%BF%B0%E7%A6%8F%E9%9F%B3/3/16"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ApiClient::new("http://example.com/bible/").unwrap();
        let url = client.endpoint(&["api", "books"]);
        assert_eq!(url.as_str(), "http://example.com/bible/api/books");
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_describe_not_found() {
        let err: anyhow::Error = StatusError {
            status: StatusCode::NOT_FOUND,
            url: "http://x/api/verse/a/1/1".into(),
        }
        .into();
        assert_eq!(describe_error(&err.context("wrapped")), "找不到經文");
    }

    #[tokio::test]
    async fn test_blank_search_skips_network() {
        // Port 9 is discard; a real request would fail.
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let outcome = client.search("   ").await.unwrap();
        assert_eq!(outcome, SearchOutcome::Empty);
    }
}
