//! Terminal client for a scripture lookup API: cascading book/chapter/verse
//! selection, debounced search, and a single content region for passages.

pub mod api;
pub mod app;
pub mod config;
pub mod content;
pub mod handler;
pub mod logging;
pub mod runtime;
pub mod scripture;
pub mod search;
pub mod selector;
pub mod theme;
pub mod tui;
pub mod ui;
