use ratatui::style::{Color, Modifier, Style};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Icon of the toggle: it shows the mode you would switch to.
    pub fn toggle_icon(&self) -> &'static str {
        match self {
            Theme::Light => "☾",
            Theme::Dark => "☀",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Light => Palette {
                base: Style::default().fg(Color::Black).bg(Color::White),
                border: Style::default().fg(Color::Gray),
                focus_border: Style::default().fg(Color::Blue),
                header: Style::default().fg(Color::White).bg(Color::Blue),
                reference: Style::default()
                    .fg(Color::Blue)
                    .add_modifier(Modifier::BOLD),
                verse_number: Style::default().fg(Color::Gray),
                muted: Style::default().fg(Color::DarkGray),
                error: Style::default().fg(Color::Red),
                highlight: Style::default()
                    .bg(Color::LightBlue)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD),
                key: Style::default().bg(Color::Gray).fg(Color::Black),
                label: Style::default().bg(Color::White).fg(Color::Black),
            },
            Theme::Dark => Palette {
                base: Style::default().fg(Color::White).bg(Color::Black),
                border: Style::default().fg(Color::DarkGray),
                focus_border: Style::default().fg(Color::Cyan),
                header: Style::default().fg(Color::Cyan).bg(Color::DarkGray),
                reference: Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
                verse_number: Style::default().fg(Color::DarkGray),
                muted: Style::default().fg(Color::Gray),
                error: Style::default().fg(Color::LightRed),
                highlight: Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
                key: Style::default().bg(Color::DarkGray).fg(Color::White),
                label: Style::default().bg(Color::Black).fg(Color::White),
            },
        }
    }
}

/// Styles every widget draws with.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub base: Style,
    pub border: Style,
    pub focus_border: Style,
    pub header: Style,
    pub reference: Style,
    pub verse_number: Style,
    pub muted: Style,
    pub error: Style,
    pub highlight: Style,
    pub key: Style,
    pub label: Style,
}
