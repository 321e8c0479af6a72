use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph},
    Frame,
};

use super::highlight::Highlighter;
use super::styles;
use super::utils::{expand_tabs, spinner};
use crate::app::{App, Pane};
use crate::content::{language_for, FileBody, DECODE_ERROR_PLACEHOLDER};

/// Render the file viewer panel (center)
pub fn render(f: &mut Frame, area: Rect, app: &App, hl: &mut Highlighter) {
    let focused = app.explorer.focus == Pane::Viewer;
    let theme = app.config.display.theme;

    let Some(file) = app.nav.file() else {
        let msg = if app.nav.file_loading() {
            format!("  {} Loading file…", spinner(app.ticks))
        } else {
            "  Select a file from the tree to view it".to_string()
        };
        render_message(f, area, app, " No file selected ", &msg, styles::MUTED);
        return;
    };

    let title = format!(" {} · {} ", file.path, language_for(&file.content.name));
    let text = match &file.body {
        FileBody::Text(text) => text,
        FileBody::Binary => {
            render_message(f, area, app, &title, "  Binary file not shown", styles::MUTED);
            return;
        }
        FileBody::Empty => {
            render_message(f, area, app, &title, "  No content", styles::MUTED);
            return;
        }
        FileBody::Undecodable => {
            let msg = format!("  {DECODE_ERROR_PLACEHOLDER}");
            render_message(f, area, app, &title, &msg, styles::RED);
            return;
        }
    };

    let code_style = styles::code_style(theme);
    let gutter_style = styles::gutter_style(theme);
    let tab_width = app.config.display.tab_width;
    let expanded = if text.contains('\t') {
        text.lines()
            .map(|l| expand_tabs(l, tab_width))
            .collect::<Vec<_>>()
            .join("\n")
    } else {
        text.clone()
    };
    let highlighted = hl.highlight_file(&file.path, &file.content.name, &expanded, theme, code_style);

    let digits = highlighted.len().max(1).to_string().len();
    let lines: Vec<Line> = highlighted
        .iter()
        .enumerate()
        .map(|(i, spans)| {
            let mut line = Vec::with_capacity(spans.len() + 1);
            if app.config.display.line_numbers {
                line.push(Span::styled(format!(" {:>digits$} ", i + 1), gutter_style));
            }
            line.extend(spans.iter().cloned());
            Line::from(line)
        })
        .collect();

    let mut title_spans = vec![Span::styled(title, Style::default().fg(styles::BRIGHT))];
    if app.nav.file_loading() {
        title_spans.push(Span::styled(
            format!("{} ", spinner(app.ticks)),
            Style::default().fg(styles::YELLOW),
        ));
    }

    let block = Block::default()
        .title(Line::from(title_spans))
        .borders(Borders::RIGHT)
        .border_style(styles::border_style(focused))
        .style(code_style)
        .padding(Padding::new(0, 1, 0, 0));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .scroll((app.explorer.scroll, app.explorer.h_scroll));
    f.render_widget(paragraph, area);
}

/// Placeholder content for the non-text states
fn render_message(f: &mut Frame, area: Rect, app: &App, title: &str, msg: &str, color: ratatui::style::Color) {
    let block = Block::default()
        .title(Span::styled(title.to_string(), Style::default().fg(styles::BRIGHT)))
        .borders(Borders::RIGHT)
        .border_style(styles::border_style(app.explorer.focus == Pane::Viewer))
        .style(styles::default_style());

    let text = Paragraph::new(vec![
        Line::from(""),
        Line::from(""),
        Line::from(Span::styled(msg.to_string(), Style::default().fg(color))),
    ])
    .block(block);

    f.render_widget(text, area);
}
