use chrono::Utc;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

use super::styles;
use super::utils::{relative_time, spinner};
use crate::app::{App, HomeTab, InputMode};
use crate::github::RepoInfo;

/// Render the home screen: tab row, input line, repository cards
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // tabs
            Constraint::Length(3), // input
            Constraint::Length(1), // summary
            Constraint::Min(1),    // cards
        ])
        .split(area);

    render_tabs(f, chunks[0], app);
    render_input(f, chunks[1], app);
    render_summary(f, chunks[2], app);
    match app.home.tab {
        HomeTab::Direct => render_direct_help(f, chunks[3], app),
        _ => render_cards(f, chunks[3], app),
    }
}

fn render_tabs(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in HomeTab::ALL.into_iter().enumerate() {
        let label = format!(" {} {} ", i + 1, tab.label());
        if tab == app.home.tab {
            spans.push(Span::styled(label, styles::badge_style(styles::BLUE)));
        } else {
            spans.push(Span::styled(label, Style::default().fg(styles::MUTED)));
        }
        spans.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_input(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.input_mode == InputMode::Editing;
    let text = app.home.input();
    let mut spans = Vec::new();
    if text.is_empty() && !editing {
        spans.push(Span::styled(
            app.home.tab.placeholder(),
            Style::default().fg(styles::DIM),
        ));
    } else {
        spans.push(Span::styled(text, Style::default().fg(styles::BRIGHT)));
    }
    if editing {
        spans.push(Span::styled("█", Style::default().fg(styles::BLUE)));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(editing))
        .title(Span::styled(
            format!(" {} ", app.home.tab.placeholder()),
            Style::default().fg(styles::DIM),
        ))
        .padding(Padding::horizontal(1));
    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let home = &app.home;
    let line = if home.loading {
        Line::from(Span::styled(
            format!(" {} Loading…", spinner(app.ticks)),
            Style::default().fg(styles::YELLOW),
        ))
    } else {
        match home.tab {
            HomeTab::Search => match &home.search {
                Some(found) => Line::from(Span::styled(
                    format!(" {} repositories", found.total_count),
                    Style::default().fg(styles::MUTED),
                )),
                None => Line::from(""),
            },
            HomeTab::User => {
                let mut spans = Vec::new();
                if let Some(login) = &home.user_login {
                    spans.push(Span::styled(
                        format!(" {login} · {} repositories", home.user_repos.len()),
                        Style::default().fg(styles::MUTED),
                    ));
                }
                if app.input_mode == InputMode::Filter || !home.user_filter.is_empty() {
                    spans.push(Span::styled("   filter: ", Style::default().fg(styles::DIM)));
                    spans.push(Span::styled(
                        home.user_filter.as_str(),
                        Style::default().fg(styles::YELLOW),
                    ));
                    if app.input_mode == InputMode::Filter {
                        spans.push(Span::styled("█", Style::default().fg(styles::YELLOW)));
                    }
                }
                Line::from(spans)
            }
            HomeTab::Direct => Line::from(""),
        }
    };
    f.render_widget(Paragraph::new(line), area);
}

fn card<'a>(repo: &'a RepoInfo, width: usize) -> ListItem<'a> {
    let mut title = vec![
        Span::styled(
            format!(" {}", repo.slug()),
            Style::default().fg(styles::BRIGHT).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  ★ {}  ⑂ {}", repo.stargazers_count, repo.forks_count),
            Style::default().fg(styles::YELLOW),
        ),
    ];
    if let Some(lang) = &repo.language {
        title.push(Span::styled(format!("  {lang}"), Style::default().fg(styles::PURPLE)));
    }

    let description = repo.description.as_deref().unwrap_or("No description");
    let max = width.saturating_sub(4);
    let description = if description.chars().count() > max {
        format!("{}…", description.chars().take(max.saturating_sub(1)).collect::<String>())
    } else {
        description.to_string()
    };

    let updated = relative_time(&repo.updated_at, Utc::now())
        .map(|age| format!("   updated {age}"))
        .unwrap_or_default();

    ListItem::new(vec![
        Line::from(title),
        Line::from(Span::styled(format!("   {description}"), Style::default().fg(styles::TEXT))),
        Line::from(Span::styled(updated, Style::default().fg(styles::DIM))),
    ])
}

fn render_cards(f: &mut Frame, area: Rect, app: &App) {
    let cards = app.home.cards();
    if cards.is_empty() {
        let hint = match app.home.tab {
            HomeTab::Search => "  Type a query and press Enter to search GitHub",
            _ => "  Enter a username and press Enter (empty uses the saved username)",
        };
        let text = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(hint, Style::default().fg(styles::DIM))),
        ]);
        f.render_widget(text, area);
        return;
    }

    let items: Vec<ListItem> = cards
        .iter()
        .map(|repo| card(repo, area.width as usize))
        .collect();
    let highlight = if app.input_mode == InputMode::Normal {
        styles::selected_style()
    } else {
        Style::default()
    };
    let list = List::new(items)
        .highlight_style(highlight)
        .block(Block::default().padding(Padding::vertical(1)));
    let mut state = ListState::default().with_selected(Some(app.home.selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn render_direct_help(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "  Open a repository directly, e.g. rust-lang/rust",
            Style::default().fg(styles::DIM),
        )),
    ];
    if let Some(last) = app.creds.last_repo() {
        lines.push(Line::from(""));
        lines.push(Line::from(vec![
            Span::styled("  L", styles::key_hint_style()),
            Span::styled(" reopen ", Style::default().fg(styles::DIM)),
            Span::styled(last, Style::default().fg(styles::CYAN)),
        ]));
    }
    f.render_widget(Paragraph::new(lines), area);
}
