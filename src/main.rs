use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::time::Instant;

use scripture_lookup::api::ApiClient;
use scripture_lookup::app::App;
use scripture_lookup::config::{Config, ThemeStore};
use scripture_lookup::content::ContentView;
use scripture_lookup::handler::handle_event;
use scripture_lookup::runtime::Runtime;
use scripture_lookup::scripture::{PassageRequest, SearchOutcome, VerseRef};
use scripture_lookup::tui::{self, EventHandler};
use scripture_lookup::{logging, ui};

#[derive(Parser)]
#[command(name = "scriptures")]
#[command(version, about = "Look up and search Bible verses from a scripture API")]
struct Cli {
    /// Base URL of the scripture API
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List every book
    Books,
    /// List the chapters of a book
    Chapters { book: String },
    /// List the verse numbers of a chapter
    Verses { book: String, chapter: u32 },
    /// Show one verse
    Verse {
        book: String,
        chapter: u32,
        verse: u32,
    },
    /// Search by reference or keyword
    Search { query: String },
    /// Show a chapter, or part of one
    Passage {
        book: String,
        chapter: u32,
        /// First verse of the range
        #[arg(long, requires = "to")]
        from: Option<u32>,
        /// Last verse of the range
        #[arg(long, requires = "from")]
        to: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{} {:#}", "warning:".yellow(), err);
            Config::new()
        }
    };
    let client = ApiClient::new(&config.resolve_api_url(cli.api_url.as_deref()))?;

    match cli.command {
        None => run_tui(client).await,
        Some(command) => {
            logging::init_stderr();
            run_command(&client, command).await
        }
    }
}

async fn run_tui(client: ApiClient) -> Result<()> {
    // The client still runs without a log file.
    if let Some(path) = logging::default_log_path() {
        if let Err(err) = logging::init_file(&path) {
            eprintln!("{} {:#}", "warning:".yellow(), err);
        }
    }
    tracing::info!(api = %client.base_url(), "starting");

    let themes = Config::get_config_path().ok().map(ThemeStore::new);
    let theme = themes.as_ref().map(ThemeStore::load).unwrap_or_default();

    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut events = EventHandler::new();
    let mut runtime = Runtime::new(client, events.sender(), themes);
    let mut app = App::new(theme);

    runtime.dispatch_all(app.startup());

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            let Some(event) = events.next().await else {
                break;
            };
            let actions = handle_event(&mut app, event, Instant::now());
            runtime.dispatch_all(actions);
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    tracing::info!("exiting");
    result
}

async fn run_command(client: &ApiClient, command: Commands) -> Result<()> {
    match command {
        Commands::Books => {
            for book in client.list_books().await? {
                println!("{}", book);
            }
        }
        Commands::Chapters { book } => {
            let chapters = client.list_chapters(&book).await?;
            println!("{}", book.bold().green());
            println!("{}", join_numbers(&chapters));
        }
        Commands::Verses { book, chapter } => {
            let verses = client.list_verse_numbers(&book, chapter).await?;
            println!("{}", format!("{} 第{}章", book, chapter).bold().green());
            println!("{}", join_numbers(&verses));
        }
        Commands::Verse {
            book,
            chapter,
            verse,
        } => {
            let request = PassageRequest::Single(VerseRef::new(book, chapter, verse));
            print_view(&client.load_passage(&request).await?);
        }
        Commands::Search { query } => search(client, &query).await?,
        Commands::Passage {
            book,
            chapter,
            from,
            to,
        } => {
            let request = match (from, to) {
                (Some(start), Some(end)) if start > end => {
                    return Err(anyhow!("--from {} is after --to {}", start, end));
                }
                (Some(start), Some(end)) => PassageRequest::Range {
                    book,
                    chapter,
                    start,
                    end,
                },
                _ => PassageRequest::Chapter { book, chapter },
            };
            print_view(&client.load_passage(&request).await?);
        }
    }
    Ok(())
}

async fn search(client: &ApiClient, query: &str) -> Result<()> {
    println!("🔍 Searching for: {}", query.bold().cyan());

    match client.search(query).await? {
        SearchOutcome::Empty => println!("{}", "No results found".red()),
        SearchOutcome::VerseList(list) => {
            println!("\n{}", list.label().bold().yellow());
            for verse in &list.verses {
                println!("{} {}", verse.verse.to_string().dimmed(), verse.text);
            }
        }
        SearchOutcome::Entries(entries) => {
            println!("\n{} results found:\n", entries.len().to_string().bold().green());
            for (i, entry) in entries.iter().enumerate() {
                println!("{}. {}", (i + 1).to_string().bold().blue(), entry.label().yellow());
            }
        }
    }
    Ok(())
}

fn print_view(view: &ContentView) {
    match view {
        ContentView::Passage(passage) => {
            println!("\n{}", passage.reference.bold().green());
            println!("{}", "=".repeat(50).dimmed());
            for (number, text) in &passage.verses {
                println!("{} {}", number.to_string().bold().yellow(), text);
            }
        }
        other => println!("{}", other.plain_text().yellow()),
    }
}

fn join_numbers(numbers: &[u32]) -> String {
    numbers
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}
