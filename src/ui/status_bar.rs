use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::styles;
use super::utils::spinner;
use crate::app::{App, HomeTab, InputMode, NoticeLevel, Pane, Screen};
use crate::config::ThemeMode;

/// Compute the display width of a list of spans
fn spans_width(spans: &[Span]) -> usize {
    spans.iter().map(|s| s.content.chars().count()).sum()
}

/// Render the top status bar
///
///   rx · owner/name ★ 12 · Rust                 dark
pub fn render_top_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut left: Vec<Span> = vec![Span::styled(" rx ", styles::badge_style(styles::CYAN))];

    match app.screen {
        Screen::Home => {
            left.push(Span::styled(
                "  GitHub repository explorer",
                Style::default().fg(styles::MUTED),
            ));
        }
        Screen::Explorer => match app.nav.repo() {
            Some(repo) => {
                left.push(Span::styled(
                    format!("  {}", repo.slug()),
                    styles::title_style(),
                ));
                left.push(Span::styled(
                    format!("  ★ {}", repo.stargazers_count),
                    Style::default().fg(styles::YELLOW),
                ));
                if let Some(lang) = &repo.language {
                    left.push(Span::styled(" · ", Style::default().fg(styles::BORDER)));
                    left.push(Span::styled(lang.as_str(), Style::default().fg(styles::PURPLE)));
                }
            }
            None => {
                left.push(Span::styled(
                    format!("  {} Opening repository…", spinner(app.ticks)),
                    Style::default().fg(styles::YELLOW),
                ));
            }
        },
    }

    let mut right: Vec<Span> = Vec::new();
    if app.explorer.split.is_dragging() {
        right.push(Span::styled("⇔ resizing  ", Style::default().fg(styles::BLUE)));
    }
    if app.nav.is_loading() && app.nav.repo().is_some() {
        right.push(Span::styled(
            format!("{} loading  ", spinner(app.ticks)),
            Style::default().fg(styles::YELLOW),
        ));
    }
    let theme = match app.config.display.theme {
        ThemeMode::Dark => "dark ",
        ThemeMode::Light => "light ",
    };
    right.push(Span::styled(theme, Style::default().fg(styles::DIM)));

    let gap = (area.width as usize).saturating_sub(spans_width(&left) + spans_width(&right));
    left.push(Span::raw(" ".repeat(gap)));
    left.extend(right);

    f.render_widget(Paragraph::new(Line::from(left)).style(styles::panel_style()), area);
}

/// A key-label hint pair, e.g. ("/", " filter ")
struct Hint {
    key: &'static str,
    label: &'static str,
}

impl Hint {
    const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// Build the normal-mode hint list
fn build_hints(app: &App) -> Vec<Hint> {
    let mut hints = Vec::new();
    match app.screen {
        Screen::Home => {
            hints.push(Hint::new("1-3", " tabs "));
            hints.push(Hint::new("i", " edit "));
            if !app.home.cards().is_empty() {
                hints.push(Hint::new("j/k", " nav "));
                hints.push(Hint::new("Enter", " open "));
            }
            if app.home.tab == HomeTab::User && !app.home.user_repos.is_empty() {
                hints.push(Hint::new("/", " filter "));
            }
            if app.creds.last_repo().is_some() {
                hints.push(Hint::new("L", " last repo "));
            }
        }
        Screen::Explorer => {
            hints.push(Hint::new("Tab", " focus "));
            match app.explorer.focus {
                Pane::Tree => {
                    hints.push(Hint::new("j/k", " nav "));
                    hints.push(Hint::new("Enter", " open "));
                    hints.push(Hint::new("h", " up "));
                    hints.push(Hint::new("~", " root "));
                    hints.push(Hint::new("/", " filter "));
                }
                Pane::Viewer => {
                    hints.push(Hint::new("j/k", " scroll "));
                    hints.push(Hint::new("h/l", " pan "));
                    hints.push(Hint::new("g/G", " top/bottom "));
                }
                Pane::Chat => {
                    hints.push(Hint::new("i", " ask "));
                    hints.push(Hint::new("p", " provider "));
                    hints.push(Hint::new("m", " model "));
                    hints.push(Hint::new("j/k", " scroll "));
                }
            }
            hints.push(Hint::new("Esc", " home "));
        }
    }
    hints.push(Hint::new("t", " theme "));
    hints.push(Hint::new("S", " settings "));
    hints.push(Hint::new("q", " quit "));
    hints
}

fn hint_spans(hints: &[Hint]) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(" ")];
    for hint in hints {
        spans.push(Span::styled(hint.key, styles::key_hint_style()));
        spans.push(Span::styled(hint.label, Style::default().fg(styles::DIM)));
    }
    spans
}

/// Prompt line for the text-entry modes
fn prompt_spans(label: &'static str, accent: ratatui::style::Color, action: &'static str) -> Vec<Span<'static>> {
    vec![
        Span::styled(label, styles::badge_style(accent)),
        Span::raw("  "),
        Span::styled("Enter", styles::key_hint_style()),
        Span::styled(action, Style::default().fg(styles::DIM)),
        Span::styled("Esc", styles::key_hint_style()),
        Span::styled(" cancel", Style::default().fg(styles::DIM)),
    ]
}

/// Render the bottom bar: the current notice, or key hints
pub fn render_bottom_bar(f: &mut Frame, area: Rect, app: &App) {
    if let Some(notice) = &app.notice {
        let (badge, color) = match notice.level {
            NoticeLevel::Info => (" ● ", styles::GREEN),
            NoticeLevel::Error => (" ✗ ", styles::RED),
        };
        let line = Line::from(vec![
            Span::styled(badge, Style::default().fg(color)),
            Span::styled(notice.text.as_str(), Style::default().fg(color)),
        ]);
        f.render_widget(Paragraph::new(line).style(styles::panel_style()), area);
        return;
    }

    let spans = match app.input_mode {
        InputMode::Normal => hint_spans(&build_hints(app)),
        InputMode::Editing => {
            let action = match app.home.tab {
                HomeTab::Search => " search  ",
                HomeTab::User => " list  ",
                HomeTab::Direct => " open  ",
            };
            prompt_spans(" input ", styles::BLUE, action)
        }
        InputMode::Filter => prompt_spans(" filter ", styles::YELLOW, " apply  "),
        InputMode::Chat => prompt_spans(" ask ", styles::CYAN, " send  "),
        InputMode::SettingsEdit => prompt_spans(" edit ", styles::PURPLE, " keep  "),
    };
    f.render_widget(
        Paragraph::new(Line::from(spans)).style(styles::panel_style()),
        area,
    );
}
