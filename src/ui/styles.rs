use ratatui::style::{Color, Modifier, Style};

use crate::config::ThemeMode;

// ── Background colors ──
pub const BG: Color = Color::Rgb(12, 12, 12);
pub const SURFACE: Color = Color::Rgb(20, 20, 20);
pub const PANEL: Color = Color::Rgb(26, 26, 26);
pub const BORDER: Color = Color::Rgb(42, 42, 42);

// ── Text colors ──
pub const TEXT: Color = Color::Rgb(200, 200, 200);
pub const DIM: Color = Color::Rgb(102, 102, 102);
pub const MUTED: Color = Color::Rgb(136, 136, 136);
pub const BRIGHT: Color = Color::Rgb(232, 232, 232);

// ── Accent colors ──
pub const BLUE: Color = Color::Rgb(96, 165, 250);
pub const CYAN: Color = Color::Rgb(34, 211, 238);
pub const GREEN: Color = Color::Rgb(74, 222, 128);
pub const YELLOW: Color = Color::Rgb(250, 204, 21);
pub const RED: Color = Color::Rgb(248, 113, 113);
pub const PURPLE: Color = Color::Rgb(167, 139, 250);

// ── Code viewer (follows the theme toggle) ──
const LIGHT_CODE_BG: Color = Color::Rgb(250, 250, 250);
const LIGHT_CODE_TEXT: Color = Color::Rgb(36, 41, 46);
const LIGHT_GUTTER: Color = Color::Rgb(160, 160, 160);

// ── Composed styles ──

pub fn default_style() -> Style {
    Style::default().fg(TEXT).bg(BG)
}

pub fn panel_style() -> Style {
    Style::default().bg(PANEL)
}

pub fn selected_style() -> Style {
    Style::default().fg(BLUE).bg(Color::Rgb(26, 42, 58))
}

pub fn key_hint_style() -> Style {
    Style::default().fg(MUTED).add_modifier(Modifier::BOLD)
}

pub fn title_style() -> Style {
    Style::default().fg(CYAN).add_modifier(Modifier::BOLD)
}

/// Border of a pane; highlighted when it has focus
pub fn border_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(BLUE)
    } else {
        Style::default().fg(BORDER)
    }
}

pub fn badge_style(color: Color) -> Style {
    Style::default()
        .fg(BG)
        .bg(color)
        .add_modifier(Modifier::BOLD)
}

pub fn code_style(theme: ThemeMode) -> Style {
    match theme {
        ThemeMode::Dark => default_style(),
        ThemeMode::Light => Style::default().fg(LIGHT_CODE_TEXT).bg(LIGHT_CODE_BG),
    }
}

pub fn gutter_style(theme: ThemeMode) -> Style {
    match theme {
        ThemeMode::Dark => Style::default().fg(DIM).bg(BG),
        ThemeMode::Light => Style::default().fg(LIGHT_GUTTER).bg(LIGHT_CODE_BG),
    }
}
