use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use std::time::Instant;

use crate::app::{Action, App, Focus};
use crate::tui::AppEvent;

const SCROLL_LINES: u16 = 3;
const PAGE_LINES: u16 = 10;

pub fn handle_event(app: &mut App, event: AppEvent, now: Instant) -> Vec<Action> {
    match event {
        AppEvent::Key(key) => handle_key(app, key, now),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => Vec::new(),
        AppEvent::Tick => app.tick(now),
        AppEvent::Loaded(loaded) => app.apply_loaded(loaded, now),
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) -> Vec<Action> {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return Vec::new();
    }

    if app.selector.visible {
        return handle_selector_key(app, key);
    }

    match app.focus {
        Focus::Search => handle_search_key(app, key, now),
        Focus::Content => handle_content_key(app, key),
    }
}

fn handle_selector_key(app: &mut App, key: KeyEvent) -> Vec<Action> {
    match key.code {
        KeyCode::Esc => {
            app.close_selector();
            Vec::new()
        }
        KeyCode::Tab => {
            app.selector.focus_next();
            Vec::new()
        }
        KeyCode::BackTab => {
            app.selector.focus_prev();
            Vec::new()
        }
        KeyCode::Up | KeyCode::Char('k') => app.selector_step(-1),
        KeyCode::Down | KeyCode::Char('j') => app.selector_step(1),
        KeyCode::PageUp => app.selector_step(-(PAGE_LINES as isize)),
        KeyCode::PageDown => app.selector_step(PAGE_LINES as isize),
        KeyCode::Enter => app.confirm_selection(),
        _ => Vec::new(),
    }
}

fn handle_search_key(app: &mut App, key: KeyEvent, now: Instant) -> Vec<Action> {
    match key.code {
        KeyCode::Esc => {
            app.search.hide();
            app.focus = Focus::Content;
            Vec::new()
        }
        KeyCode::Tab => {
            app.focus = Focus::Content;
            Vec::new()
        }
        KeyCode::Down => {
            app.search.move_down();
            Vec::new()
        }
        KeyCode::Up => {
            app.search.move_up();
            Vec::new()
        }
        KeyCode::Enter => app.search_enter(),
        KeyCode::Backspace => {
            app.backspace(now);
            Vec::new()
        }
        KeyCode::Char(c) => {
            app.type_char(c, now);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

fn handle_content_key(app: &mut App, key: KeyEvent) -> Vec<Action> {
    match key.code {
        // Quit
        KeyCode::Char('q') => {
            app.should_quit = true;
            Vec::new()
        }

        KeyCode::Char('/') | KeyCode::Tab => {
            app.focus = Focus::Search;
            Vec::new()
        }
        KeyCode::Char('o') => app.open_selector(),
        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('c') => app.copy(),
        KeyCode::Char('r') => app.retry(),

        // Scrolling
        KeyCode::Char('j') | KeyCode::Down => {
            app.content.scroll_down(1);
            Vec::new()
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.content.scroll_up(1);
            Vec::new()
        }
        KeyCode::PageDown => {
            app.content.scroll_down(PAGE_LINES);
            Vec::new()
        }
        KeyCode::PageUp => {
            app.content.scroll_up(PAGE_LINES);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Check if a point is within a rectangle
pub fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Vec<Action> {
    let x = mouse.column;
    let y = mouse.row;

    // The modal takes the keyboard; mouse input under it is ignored.
    if app.selector.visible {
        return Vec::new();
    }

    let in_results = app.search.visible
        && app.results_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_content = app.content_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.click(x, y),
        MouseEventKind::ScrollDown => {
            if in_results {
                app.search.move_down();
            } else if in_content {
                app.content.scroll_down(SCROLL_LINES);
            }
            Vec::new()
        }
        MouseEventKind::ScrollUp => {
            if in_results {
                app.search.move_up();
            } else if in_content {
                app.content.scroll_up(SCROLL_LINES);
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}
