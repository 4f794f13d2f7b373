use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::Modifier,
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, List, ListItem, ListState, Paragraph, Scrollbar,
        ScrollbarOrientation, ScrollbarState, Wrap,
    },
};
use std::time::Instant;

use crate::app::{App, Focus};
use crate::content::{ContentView, PLACEHOLDER_PROMPT};
use crate::selector::{SelectorField, SelectorStage};
use crate::theme::Palette;

const TITLE: &str = " 經文查詢 ";
const COPY_ICON: &str = "⧉";
const COPIED_ICON: &str = "✓";

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.theme.palette();

    frame.render_widget(Block::default().style(palette.base), area);

    // Main layout: header, search input, content, footer
    let [header_area, search_area, content_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, &palette);
    render_search_input(app, frame, search_area, &palette);
    render_content(app, frame, content_area, &palette);
    render_footer(app, frame, footer_area, &palette);

    // Overlays: the result panel floats over the content, the modal over everything
    render_results(app, frame, search_area, content_area, &palette);
    if app.selector.visible {
        render_selector(app, frame, area, &palette);
    }
}

fn render_header(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let title = Line::from(vec![
        Span::styled(TITLE, palette.header.add_modifier(Modifier::BOLD)),
        Span::styled(format!("v{}", env!("CARGO_PKG_VERSION")), palette.header),
    ]);
    frame.render_widget(Paragraph::new(title).style(palette.header), area);

    let icon = format!(" {} ", app.theme.toggle_icon());
    let width = Span::raw(icon.as_str()).width() as u16;
    let theme_area = Rect::new(
        area.x + area.width.saturating_sub(width),
        area.y,
        width.min(area.width),
        1,
    );
    frame.render_widget(
        Paragraph::new(icon).style(palette.header).alignment(Alignment::Right),
        theme_area,
    );
    app.theme_area = Some(theme_area);
}

fn render_search_input(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let editing = app.focus == Focus::Search && !app.selector.visible;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if editing { palette.focus_border } else { palette.border })
        .title(if app.search.has_pending() { " 搜尋… " } else { " 搜尋 " });

    let input = if app.search.input().is_empty() && !editing {
        Paragraph::new(Span::styled("例如：約翰福音 3:16", palette.muted))
    } else {
        Paragraph::new(app.search.input())
    };
    frame.render_widget(input.block(block), area);

    // Show cursor when editing
    if editing {
        let width = Span::raw(app.search.input()).width() as u16;
        frame.set_cursor_position((
            (area.x + width + 1).min(area.x + area.width.saturating_sub(2)),
            area.y + 1,
        ));
    }

    app.search_area = Some(area);
}

fn render_results(
    app: &mut App,
    frame: &mut Frame,
    search_area: Rect,
    content_area: Rect,
    palette: &Palette,
) {
    let rows = app.search.rows();
    if !app.search.visible || rows.is_empty() {
        app.results_area = None;
        app.results_offset = 0;
        return;
    }

    let height = (rows.len() as u16 + 2).min(content_area.height);
    let popup_area = Rect::new(search_area.x, content_area.y, search_area.width, height);

    // Clear the area behind the panel
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.focus_border)
        .style(palette.base)
        .title(format!(" 結果 ({}) ", rows.len()));

    let items: Vec<ListItem> = rows
        .into_iter()
        .map(|row| ListItem::new(format!(" {} ", row)))
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(palette.highlight)
        .highlight_symbol("> ");

    let mut state = ListState::default().with_selected(app.search.highlighted());
    frame.render_stateful_widget(list, popup_area, &mut state);

    app.results_area = Some(popup_area);
    app.results_offset = state.offset();
}

fn content_text(view: &ContentView, palette: &Palette) -> Text<'static> {
    match view {
        ContentView::Placeholder => {
            Text::from(Line::from(Span::styled(PLACEHOLDER_PROMPT, palette.muted)))
        }
        ContentView::Passage(passage) => {
            let mut lines = vec![
                Line::from(Span::styled(passage.reference.clone(), palette.reference)),
                Line::default(),
            ];
            for (number, text) in &passage.verses {
                lines.push(Line::from(vec![
                    Span::styled(format!("{}  ", number), palette.verse_number),
                    Span::raw(text.clone()),
                ]));
            }
            Text::from(lines)
        }
        ContentView::Notice(message) => Text::from(message.clone()),
        ContentView::Failed { message, retry } => {
            let mut lines = vec![Line::from(Span::styled(message.clone(), palette.error))];
            if retry.is_some() {
                lines.push(Line::default());
                lines.push(Line::from(Span::styled("按 r 重試", palette.muted)));
            }
            Text::from(lines)
        }
    }
}

fn render_content(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let focused = app.focus == Focus::Content && !app.selector.visible;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if focused { palette.focus_border } else { palette.border })
        .title(" 經文 ");

    let inner_area = block.inner(area);
    let text = content_text(app.content.view(), palette);
    let total_lines = text.lines.len() as u16;

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.content.scroll, 0));
    frame.render_widget(paragraph, area);

    // Copy control sits on the top border, right-aligned.
    if app.content.copy_visible() && area.width > 6 {
        let icon = if app.content.copy_feedback_active(Instant::now()) {
            COPIED_ICON
        } else {
            COPY_ICON
        };
        let copy_area = Rect::new(area.x + area.width - 5, area.y, 3, 1);
        frame.render_widget(
            Paragraph::new(format!(" {} ", icon)).style(palette.reference),
            copy_area,
        );
        app.copy_area = Some(copy_area);
    } else {
        app.copy_area = None;
    }

    // Render scrollbar
    if total_lines > inner_area.height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));

        let mut scrollbar_state =
            ScrollbarState::new(total_lines as usize).position(app.content.scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }

    app.content_area = Some(area);
}

fn render_selector(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    // Calculate popup size and position (centered)
    let popup_width = 60.min(area.width.saturating_sub(4));
    let popup_height = 20.min(area.height.saturating_sub(4));
    let popup_x = area.x + (area.width.saturating_sub(popup_width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(popup_height)) / 2;
    let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(palette.focus_border)
        .style(palette.base)
        .title(" 選擇經文 (Enter 顯示, Esc 取消) ");
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [book_area, chapter_area, verse_area] = Layout::horizontal([
        Constraint::Percentage(50),
        Constraint::Percentage(25),
        Constraint::Percentage(25),
    ])
    .areas(inner);

    for (field, column, title) in [
        (SelectorField::Book, book_area, " 書卷 "),
        (SelectorField::Chapter, chapter_area, " 章 "),
        (SelectorField::Verse, verse_area, " 節 "),
    ] {
        let focused = app.selector.focus == field;
        let labels = app.selector.option_labels(field);
        let selected = (!labels.is_empty()).then(|| app.selector.selected_index(field));

        let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(if focused { palette.focus_border } else { palette.border })
                    .title(title),
            )
            .highlight_style(if focused { palette.highlight } else { palette.reference })
            .highlight_symbol("> ");

        let mut state = ListState::default().with_selected(selected);
        frame.render_stateful_widget(list, column, &mut state);
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let key_style = palette.key;
    let label_style = palette.label;

    let mut hints = Vec::new();
    let mut hint = |key: &'static str, label: &'static str| {
        hints.push(Span::styled(format!(" {} ", key), key_style));
        hints.push(Span::styled(format!(" {} ", label), label_style));
    };

    if app.selector.visible {
        hint("Tab", "欄位");
        hint("↑/↓", "選擇");
        let confirm = match app.selector.stage() {
            SelectorStage::NoBook | SelectorStage::BookChosen => "請先選擇章",
            SelectorStage::ChapterChosen => "顯示全章",
            SelectorStage::VerseChosen => "顯示經文",
        };
        hint("Enter", confirm);
        hint("Esc", "取消");
    } else if app.focus == Focus::Search {
        hint("↑/↓", "結果");
        hint("Enter", "開啟");
        hint("Esc", "離開搜尋");
        hint("Ctrl+C", "結束");
    } else {
        hint("/", "搜尋");
        hint("o", "選擇經文");
        hint("j/k", "捲動");
        if app.content.copy_visible() {
            hint("c", "複製");
        }
        if app.content.retry_request().is_some() {
            hint("r", "重試");
        }
        hint("t", "主題");
        hint("q", "結束");
    }

    frame.render_widget(Paragraph::new(Line::from(hints)).style(label_style), area);
}
