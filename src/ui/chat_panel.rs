use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use super::styles;
use super::utils::{spinner, word_wrap};
use crate::ai::provider::display_model;
use crate::ai::session::MessageRole;
use crate::app::{App, InputMode, Pane};

/// Render the assistant panel (right side)
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chat = &app.chat;
    let focused = app.explorer.focus == Pane::Chat;
    let title = Line::from(vec![
        Span::styled(format!(" {} ", chat.provider.name()), styles::title_style()),
        Span::styled(
            format!("{} ", display_model(&chat.model)),
            Style::default().fg(styles::DIM),
        ),
    ]);
    let block = Block::default()
        .title(title)
        .borders(Borders::NONE)
        .style(styles::default_style())
        .padding(Padding::horizontal(1));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    render_transcript(f, chunks[0], app);
    render_input(f, chunks[1], app, focused);
}

fn render_transcript(f: &mut Frame, area: Rect, app: &App) {
    let chat = &app.chat;
    let max_w = area.width.saturating_sub(1) as usize;
    let mut lines: Vec<Line> = Vec::new();

    for entry in &chat.entries {
        let (label, color) = match entry.role {
            MessageRole::User => ("You", styles::CYAN),
            MessageRole::Assistant => ("Assistant", styles::GREEN),
            MessageRole::Note => {
                lines.push(Line::from(Span::styled(
                    format!("· {}", entry.text),
                    Style::default().fg(styles::DIM),
                )));
                lines.push(Line::from(""));
                continue;
            }
        };
        lines.push(Line::from(vec![
            Span::styled(label, Style::default().fg(color).add_modifier(Modifier::BOLD)),
            Span::styled(format!("  {}", entry.timestamp), Style::default().fg(styles::DIM)),
        ]));
        for wrapped in word_wrap(&entry.text, max_w) {
            lines.push(Line::from(Span::styled(wrapped, Style::default().fg(styles::TEXT))));
        }
        lines.push(Line::from(""));
    }

    if chat.waiting {
        lines.push(Line::from(Span::styled(
            format!("{} Thinking…", spinner(app.ticks)),
            Style::default().fg(styles::YELLOW),
        )));
    }

    // Pinned to the bottom; `scroll` counts lines up from there
    let total = lines.len();
    let height = area.height as usize;
    let offset = total
        .saturating_sub(height)
        .saturating_sub(chat.scroll as usize);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(lines).scroll((offset, 0)), area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App, focused: bool) {
    let editing = app.input_mode == InputMode::Chat;
    let input = &app.chat.input;

    let mut spans = Vec::new();
    if input.is_empty() && !editing {
        let hint = if app.nav.file().is_some() {
            "Ask about this file (i)"
        } else {
            "Ask a question (i)"
        };
        spans.push(Span::styled(hint, Style::default().fg(styles::DIM)));
    } else {
        // keep the tail visible when the input is wider than the box
        let room = area.width.saturating_sub(4) as usize;
        let count = input.chars().count();
        let shown: String = input.chars().skip(count.saturating_sub(room)).collect();
        spans.push(Span::styled(shown, Style::default().fg(styles::BRIGHT)));
    }
    if editing {
        spans.push(Span::styled("█", Style::default().fg(styles::CYAN)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused || editing));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}
