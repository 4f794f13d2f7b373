use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use scripture_lookup::api::{describe_error, ApiClient};
use scripture_lookup::content::{ContentView, NO_VERSES_FOUND};
use scripture_lookup::scripture::{PassageRequest, SearchEntry, SearchOutcome, VerseRef};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::net::TcpListener;

const JOHN: &str = "約翰福音";

fn verse_text(book: &str, chapter: u32, verse: u32) -> Option<&'static str> {
    match (book, chapter, verse) {
        (JOHN, 3, 1) => Some("有一個法利賽人，名叫尼哥底母"),
        (JOHN, 3, 2) => Some("這人夜裡來見耶穌"),
        (JOHN, 3, 16) => Some("神愛世人，甚至將他的獨生子賜給他們"),
        (JOHN, 5, 1) => Some("這事以後，到了猶太人的一個節期"),
        _ => None,
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Verse not found" }))).into_response()
}

async fn books() -> Json<Value> {
    Json(json!([JOHN, "詩篇"]))
}

async fn chapters(Path(book): Path<String>) -> Response {
    match book.as_str() {
        JOHN => Json(json!([3, 4, 5])).into_response(),
        // Some backends send chapter numbers as strings.
        "詩篇" => Json(json!(["1", "23"])).into_response(),
        _ => not_found(),
    }
}

async fn verses(Path((book, chapter)): Path<(String, u32)>) -> Response {
    match (book.as_str(), chapter) {
        (JOHN, 3) => Json(json!([1, 2, 16])).into_response(),
        (JOHN, 4) => Json(json!([])).into_response(),
        // Verse 2 is listed but cannot be fetched.
        (JOHN, 5) => Json(json!([1, 2])).into_response(),
        _ => not_found(),
    }
}

async fn verse(Path((book, chapter, verse)): Path<(String, u32, u32)>) -> Response {
    match verse_text(&book, chapter, verse) {
        Some(text) => Json(json!({
            "book": book,
            "chapter": chapter,
            "verse": verse,
            "text": text,
        }))
        .into_response(),
        None => not_found(),
    }
}

#[derive(Deserialize)]
struct SearchParams {
    q: String,
}

async fn search(Query(params): Query<SearchParams>) -> Json<Value> {
    Json(match params.q.as_str() {
        "約翰 3:16" => json!([{ "type": "single", "book": JOHN, "chapter": 3, "verse": 16 }]),
        "約翰" => json!([{ "type": "book", "book": JOHN }]),
        "約翰 3:1-2" => json!([
            { "book": JOHN, "chapter": 3, "verse": 1, "text": "有一個法利賽人" },
            { "book": JOHN, "chapter": 3, "verse": 2, "text": "這人夜裡來見耶穌" },
        ]),
        "a&b=c" => json!([{ "type": "chapter", "book": JOHN, "chapter": 3 }]),
        _ => json!([]),
    })
}

async fn spawn_backend() -> ApiClient {
    let router = Router::new()
        .route("/api/books", get(books))
        .route("/api/chapters/:book", get(chapters))
        .route("/api/verses/:book/:chapter", get(verses))
        .route("/api/verse/:book/:chapter/:verse", get(verse))
        .route("/api/search", get(search));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    ApiClient::new(&format!("http://{}", addr)).unwrap()
}

#[tokio::test]
async fn test_lists_books_and_chapters() {
    let client = spawn_backend().await;
    assert_eq!(client.list_books().await.unwrap(), vec![JOHN, "詩篇"]);
    assert_eq!(client.list_chapters(JOHN).await.unwrap(), vec![3, 4, 5]);
    assert_eq!(client.list_chapters("詩篇").await.unwrap(), vec![1, 23]);
    assert_eq!(client.list_verse_numbers(JOHN, 3).await.unwrap(), vec![1, 2, 16]);
}

#[tokio::test]
async fn test_get_verse_with_escaped_book() {
    let client = spawn_backend().await;
    let verse = client.get_verse(JOHN, 3, 16).await.unwrap();
    assert_eq!(verse.reference(), VerseRef::new(JOHN, 3, 16));
    assert!(verse.text.starts_with("神愛世人"));
}

#[tokio::test]
async fn test_missing_verse_is_not_found() {
    let client = spawn_backend().await;
    let err = client.get_verse(JOHN, 3, 99).await.unwrap_err();
    assert_eq!(describe_error(&err), "找不到經文");
}

#[tokio::test]
async fn test_search_shapes() {
    let client = spawn_backend().await;

    assert_eq!(
        client.search("約翰 3:16").await.unwrap(),
        SearchOutcome::Entries(vec![SearchEntry::Single(VerseRef::new(JOHN, 3, 16))])
    );
    assert_eq!(
        client.search("約翰").await.unwrap(),
        SearchOutcome::Entries(vec![SearchEntry::Book { book: JOHN.into() }])
    );
    match client.search("約翰 3:1-2").await.unwrap() {
        SearchOutcome::VerseList(list) => assert_eq!(list.label(), "約翰福音 3:1-2"),
        other => panic!("expected verse list, got {:?}", other),
    }
    assert_eq!(client.search("nothing").await.unwrap(), SearchOutcome::Empty);
}

#[tokio::test]
async fn test_search_query_is_encoded() {
    let client = spawn_backend().await;
    assert_eq!(
        client.search("  a&b=c ").await.unwrap(),
        SearchOutcome::Entries(vec![SearchEntry::Chapter {
            book: JOHN.into(),
            chapter: 3
        }])
    );
}

#[tokio::test]
async fn test_load_single_passage() {
    let client = spawn_backend().await;
    let view = client
        .load_passage(&PassageRequest::Single(VerseRef::new(JOHN, 3, 16)))
        .await
        .unwrap();
    assert_eq!(
        view.plain_text(),
        "約翰福音 3:16\n16 神愛世人，甚至將他的獨生子賜給他們"
    );
}

#[tokio::test]
async fn test_load_range_keeps_bounds() {
    let client = spawn_backend().await;
    let view = client
        .load_passage(&PassageRequest::Range {
            book: JOHN.into(),
            chapter: 3,
            start: 2,
            end: 16,
        })
        .await
        .unwrap();
    match view {
        ContentView::Passage(passage) => {
            assert_eq!(passage.reference, "約翰福音 3:2-16");
            let numbers: Vec<u32> = passage.verses.iter().map(|(n, _)| *n).collect();
            assert_eq!(numbers, vec![2, 16]);
        }
        other => panic!("expected passage, got {:?}", other),
    }
}

#[tokio::test]
async fn test_load_chapter_in_order() {
    let client = spawn_backend().await;
    let view = client
        .load_passage(&PassageRequest::Chapter {
            book: JOHN.into(),
            chapter: 3,
        })
        .await
        .unwrap();
    let text = view.plain_text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "約翰福音 第3章");
    assert!(lines[1].starts_with("1 "));
    assert!(lines[2].starts_with("2 "));
    assert!(lines[3].starts_with("16 "));
}

#[tokio::test]
async fn test_empty_chapter_is_notice() {
    let client = spawn_backend().await;
    let view = client
        .load_passage(&PassageRequest::Chapter {
            book: JOHN.into(),
            chapter: 4,
        })
        .await
        .unwrap();
    assert_eq!(view, ContentView::Notice(NO_VERSES_FOUND.into()));
}

#[tokio::test]
async fn test_one_failed_verse_fails_the_chapter() {
    let client = spawn_backend().await;
    let err = client
        .load_passage(&PassageRequest::Chapter {
            book: JOHN.into(),
            chapter: 5,
        })
        .await
        .unwrap_err();
    assert_eq!(describe_error(&err), "找不到經文");
}

#[tokio::test]
async fn test_unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{}", addr)).unwrap();
    let err = client.list_books().await.unwrap_err();
    assert_eq!(describe_error(&err), "無法連線到經文伺服器");
}
