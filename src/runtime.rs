//! Carries out [`Action`]s. Network work runs on spawned tasks that report
//! back through the event channel as [`AppEvent::Loaded`].

use anyhow::{anyhow, Result};
use arboard::Clipboard;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::ApiClient;
use crate::app::{Action, Loaded};
use crate::config::ThemeStore;
use crate::selector::OptionsRequest;
use crate::tui::AppEvent;

pub struct Runtime {
    client: ApiClient,
    tx: UnboundedSender<AppEvent>,
    themes: Option<ThemeStore>,
    // Opened on first copy; some terminals have no clipboard at all.
    clipboard: Option<Clipboard>,
}

impl Runtime {
    pub fn new(client: ApiClient, tx: UnboundedSender<AppEvent>, themes: Option<ThemeStore>) -> Self {
        Self {
            client,
            tx,
            themes,
            clipboard: None,
        }
    }

    pub fn dispatch_all(&mut self, actions: Vec<Action>) {
        for action in actions {
            self.dispatch(action);
        }
    }

    pub fn dispatch(&mut self, action: Action) {
        match action {
            Action::LoadBooks => {
                self.spawn(|client| async move { Loaded::Books(client.list_books().await) });
            }
            Action::LoadOptions(OptionsRequest::Chapters { book }) => {
                self.spawn(move |client| async move {
                    let result = client.list_chapters(&book).await;
                    Loaded::Chapters { book, result }
                });
            }
            Action::LoadOptions(OptionsRequest::VerseNumbers { book, chapter }) => {
                self.spawn(move |client| async move {
                    let result = client.list_verse_numbers(&book, chapter).await;
                    Loaded::VerseNumbers {
                        book,
                        chapter,
                        result,
                    }
                });
            }
            Action::Search(dispatch) => {
                tracing::debug!(seq = dispatch.seq, query = %dispatch.query, "searching");
                self.spawn(move |client| async move {
                    let result = client.search(&dispatch.query).await;
                    Loaded::Search {
                        seq: dispatch.seq,
                        result,
                    }
                });
            }
            Action::LoadPassage {
                seq,
                origin,
                request,
            } => {
                tracing::info!(passage = %request.heading(), "loading passage");
                self.spawn(move |client| async move {
                    let result = client.load_passage(&request).await;
                    Loaded::Passage {
                        seq,
                        origin,
                        request,
                        result,
                    }
                });
            }
            Action::CopyText(text) => {
                let result = self.copy(text);
                self.send(Loaded::Copied(result));
            }
            Action::SaveTheme(theme) => {
                let Some(store) = &self.themes else {
                    return;
                };
                match store.save(theme) {
                    Ok(()) => tracing::info!(theme = theme.as_str(), "saved theme"),
                    Err(err) => {
                        tracing::warn!(error = %err, path = %store.path().display(), "failed to save theme");
                    }
                }
            }
        }
    }

    fn spawn<F, Fut>(&self, job: F)
    where
        F: FnOnce(ApiClient) -> Fut,
        Fut: std::future::Future<Output = Loaded> + Send + 'static,
    {
        let future = job(self.client.clone());
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let loaded = future.await;
            // The receiver is gone only while shutting down.
            let _ = tx.send(AppEvent::Loaded(loaded));
        });
    }

    fn send(&self, loaded: Loaded) {
        let _ = self.tx.send(AppEvent::Loaded(loaded));
    }

    fn copy(&mut self, text: String) -> Result<()> {
        if self.clipboard.is_none() {
            self.clipboard = Some(Clipboard::new()?);
        }
        let clipboard = self
            .clipboard
            .as_mut()
            .ok_or_else(|| anyhow!("clipboard unavailable"))?;
        clipboard.set_text(text)?;
        Ok(())
    }
}
