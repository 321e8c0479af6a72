use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::styles;
use super::utils::spinner;
use crate::app::{App, InputMode, Pane, Screen, TreeRow};
use crate::github::EntryKind;

/// Render the file tree panel (left side)
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let focused = app.explorer.focus == Pane::Tree;
    let title = if app.nav.name().is_empty() {
        " FILES ".to_string()
    } else {
        format!(" {} ", app.nav.name())
    };
    let block = Block::default()
        .title(Span::styled(title, styles::title_style()))
        .borders(Borders::RIGHT)
        .border_style(styles::border_style(focused))
        .style(styles::default_style());
    let inner = block.inner(area);
    f.render_widget(block, area);

    let filtering = app.screen == Screen::Explorer && app.input_mode == InputMode::Filter;
    let show_filter = filtering || !app.explorer.filter.is_empty();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                           // breadcrumbs
            Constraint::Length(u16::from(show_filter)),      // filter
            Constraint::Min(0),                              // entries
        ])
        .split(inner);

    render_breadcrumbs(f, chunks[0], app);
    if show_filter {
        let mut spans = vec![
            Span::styled(" / ", styles::key_hint_style()),
            Span::styled(
                app.explorer.filter.as_str(),
                Style::default().fg(styles::YELLOW),
            ),
        ];
        if filtering {
            spans.push(Span::styled("█", Style::default().fg(styles::YELLOW)));
        }
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
    }
    render_entries(f, chunks[2], app, focused);
}

fn render_breadcrumbs(f: &mut Frame, area: Rect, app: &App) {
    let crumbs = app.nav.breadcrumbs();
    let last = crumbs.len().saturating_sub(1);
    let mut spans = vec![Span::raw(" ")];
    for (i, crumb) in crumbs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" / ", Style::default().fg(styles::BORDER)));
        }
        let style = if i == last {
            Style::default().fg(styles::BRIGHT)
        } else {
            Style::default().fg(styles::MUTED)
        };
        spans.push(Span::styled(crumb.label.clone(), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_entries(f: &mut Frame, area: Rect, app: &App, focused: bool) {
    let rows = app.tree_rows();

    if app.nav.listing_loading() && app.nav.listing().is_empty() {
        let text = Paragraph::new(Line::from(Span::styled(
            format!(" {} Loading…", spinner(app.ticks)),
            Style::default().fg(styles::YELLOW),
        )));
        f.render_widget(text, area);
        return;
    }

    let has_entries = rows.iter().any(|r| matches!(r, TreeRow::Entry(_)));
    let mut items: Vec<ListItem> = rows
        .iter()
        .map(|row| match row {
            TreeRow::Parent => ListItem::new(Line::from(vec![
                Span::styled("  ↰ ", Style::default().fg(styles::DIM)),
                Span::styled("..", Style::default().fg(styles::MUTED)),
            ])),
            TreeRow::Entry(entry) => {
                let (icon, style) = match entry.kind {
                    EntryKind::Dir => (
                        "▸ ",
                        Style::default().fg(styles::BLUE).add_modifier(Modifier::BOLD),
                    ),
                    EntryKind::Submodule => ("⊙ ", Style::default().fg(styles::PURPLE)),
                    EntryKind::Symlink => ("↪ ", Style::default().fg(styles::CYAN)),
                    EntryKind::File | EntryKind::Other => ("  ", Style::default().fg(styles::TEXT)),
                };
                let name = if entry.is_dir() {
                    format!("{}/", entry.name)
                } else {
                    entry.name.clone()
                };
                let open = app.nav.file().is_some_and(|f| f.path == entry.path);
                let style = if open { style.fg(styles::GREEN) } else { style };
                ListItem::new(Line::from(vec![
                    Span::styled(format!("  {icon}"), style),
                    Span::styled(name, style),
                ]))
            }
        })
        .collect();

    if !has_entries {
        let msg = if app.explorer.filter.is_empty() {
            "  Empty directory"
        } else {
            "  No matching files"
        };
        items.push(ListItem::new(Line::from(Span::styled(
            msg,
            Style::default().fg(styles::DIM),
        ))));
    }

    let highlight = if focused {
        styles::selected_style()
    } else {
        Style::default().bg(styles::SURFACE)
    };
    let list = List::new(items).highlight_style(highlight);
    let selected = (!rows.is_empty()).then_some(app.explorer.selected);
    let mut state = ListState::default().with_selected(selected);
    f.render_stateful_widget(list, area, &mut state);

    if app.nav.listing_loading() {
        // reloading over an existing listing: small indicator in the corner
        let w = 3u16.min(area.width);
        let corner = Rect::new(area.x + area.width - w, area.y, w, 1);
        f.render_widget(
            Paragraph::new(Span::styled(spinner(app.ticks), Style::default().fg(styles::YELLOW))),
            corner,
        );
    }
}
