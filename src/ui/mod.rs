mod chat_panel;
mod file_tree;
mod file_view;
pub mod highlight;
mod home;
mod settings;
mod status_bar;
mod styles;
mod utils;

use crate::app::{App, OverlayData, Screen};
use highlight::Highlighter;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::widgets::Block;
use ratatui::Frame;

fn rows(area: Rect) -> [Rect; 3] {
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // top bar
            Constraint::Min(1),    // main content
            Constraint::Length(1), // bottom bar
        ])
        .split(area);
    [outer[0], outer[1], outer[2]]
}

/// The area between the status bars; the explorer panes tile it
pub fn body_area(area: Rect) -> Rect {
    rows(area)[1]
}

/// Render the entire UI
pub fn draw(f: &mut Frame, app: &App, hl: &mut Highlighter) {
    let [top, body, bottom] = rows(f.area());
    f.render_widget(Block::default().style(styles::default_style()), f.area());

    status_bar::render_top_bar(f, top, app);

    match app.screen {
        Screen::Home => home::render(f, body, app),
        Screen::Explorer => {
            let [left, center, right] = app.explorer.split.split(body);
            file_tree::render(f, left, app);
            file_view::render(f, center, app, hl);
            chat_panel::render(f, right, app);
        }
    }

    status_bar::render_bottom_bar(f, bottom, app);

    if let Some(OverlayData::Settings {
        selected,
        draft,
        editing,
        ..
    }) = &app.overlay
    {
        settings::render_settings(f, f.area(), app, *selected, draft, editing.as_deref());
    }
}
