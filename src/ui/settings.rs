use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem},
    Frame,
};

use super::styles;
use super::utils::centered_rect;
use crate::app::App;
use crate::config::{self, mask_secret, SettingsItem};
use crate::credentials::Credentials;

/// Render the settings overlay
pub fn render_settings(
    f: &mut Frame,
    area: Rect,
    app: &App,
    selected: usize,
    draft: &Credentials,
    editing: Option<&str>,
) {
    let items = config::settings_items();

    let content_height = u16::try_from(items.len()).unwrap_or(u16::MAX).saturating_add(4);
    let popup_height = content_height.min(area.height.saturating_sub(2)).max(10);
    let popup_width = 60u16.min(area.width.saturating_sub(4));
    let popup = centered_rect(popup_width, popup_height, area);

    f.render_widget(Clear, popup);

    let row_style = |is_sel: bool| {
        if is_sel {
            styles::selected_style()
        } else {
            styles::panel_style()
        }
    };
    let label_style = |is_sel: bool| {
        if is_sel {
            Style::default().fg(styles::BRIGHT)
        } else {
            Style::default().fg(styles::TEXT)
        }
    };

    let mut list_items: Vec<ListItem> = Vec::new();

    for (idx, item) in items.iter().enumerate() {
        let is_sel = idx == selected;
        let marker = Span::styled(
            if is_sel { "▸ " } else { "  " },
            Style::default().fg(styles::CYAN),
        );

        match item {
            SettingsItem::SectionHeader(title) => {
                let line = Line::from(Span::styled(
                    format!("  {title}"),
                    Style::default().fg(styles::CYAN).add_modifier(Modifier::BOLD),
                ));
                list_items.push(ListItem::new(line).style(styles::panel_style()));
            }
            SettingsItem::BoolToggle { label, get, .. } => {
                let value = get(&app.config);
                let checkbox = if value { "[x]" } else { "[ ]" };
                let line = Line::from(vec![
                    marker,
                    Span::styled(
                        format!("{checkbox} "),
                        Style::default().fg(if value { styles::GREEN } else { styles::DIM }),
                    ),
                    Span::styled(label.as_str(), label_style(is_sel)),
                ]);
                list_items.push(ListItem::new(line).style(row_style(is_sel)));
            }
            SettingsItem::Credential { label, key, secret } => {
                let value = match (is_sel, editing) {
                    (true, Some(buf)) => Span::styled(
                        format!("{buf}█"),
                        Style::default().fg(styles::YELLOW),
                    ),
                    _ => match draft.get(key) {
                        Some(v) if *secret => {
                            Span::styled(mask_secret(v), Style::default().fg(styles::MUTED))
                        }
                        Some(v) => Span::styled(v.to_string(), Style::default().fg(styles::TEXT)),
                        None => Span::styled("not set", Style::default().fg(styles::DIM)),
                    },
                };
                let line = Line::from(vec![
                    marker,
                    Span::styled(format!("{label}: "), label_style(is_sel)),
                    value,
                ]);
                list_items.push(ListItem::new(line).style(row_style(is_sel)));
            }
            SettingsItem::Action { label, .. } => {
                let line = Line::from(vec![
                    marker,
                    Span::styled(
                        label.as_str(),
                        label_style(is_sel).add_modifier(Modifier::BOLD),
                    ),
                ]);
                list_items.push(ListItem::new(line).style(row_style(is_sel)));
            }
        }
    }

    let help = if editing.is_some() {
        vec![
            Span::styled(" Enter", styles::key_hint_style()),
            Span::styled(" keep  ", Style::default().fg(styles::DIM)),
            Span::styled("Esc", styles::key_hint_style()),
            Span::styled(" discard", Style::default().fg(styles::DIM)),
        ]
    } else {
        vec![
            Span::styled(" j/k", styles::key_hint_style()),
            Span::styled(" nav  ", Style::default().fg(styles::DIM)),
            Span::styled("Enter", styles::key_hint_style()),
            Span::styled(" edit/toggle  ", Style::default().fg(styles::DIM)),
            Span::styled("s", styles::key_hint_style()),
            Span::styled(" save  ", Style::default().fg(styles::DIM)),
            Span::styled("Esc", styles::key_hint_style()),
            Span::styled(" cancel", Style::default().fg(styles::DIM)),
        ]
    };
    list_items.push(ListItem::new(Line::from("")).style(styles::panel_style()));
    list_items.push(ListItem::new(Line::from(help)).style(styles::panel_style()));

    let block = Block::default()
        .title(Span::styled(" Settings ", styles::title_style()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(styles::CYAN))
        .style(styles::panel_style());

    f.render_widget(List::new(list_items).block(block), popup);
}
