mod ai;
mod app;
mod config;
mod content;
mod credentials;
mod error;
mod github;
mod logging;
mod ui;

use anyhow::{Context, Result};
use app::{App, AppPaths, Executor, HomeTab, InputMode, OverlayData, Pane, Screen};
use clap::Parser;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::ai::chat::OpenAiCompatClient;
use crate::ai::provider::Provider;
use crate::config::RxConfig;
use crate::credentials::CredentialStore;
use crate::error::FetchResult;
use crate::github::{GitHubClient, RepoHost};

/// Browse GitHub repositories in the terminal and ask an AI assistant about the code
#[derive(Parser)]
#[command(name = "rx", version, about)]
struct Cli {
    /// Repository to open, as owner/name or a github.com URL
    repo: Option<String>,

    /// List a user's repositories
    #[arg(long, conflicts_with_all = ["repo", "search", "last"])]
    user: Option<String>,

    /// Search GitHub repositories
    #[arg(long, conflicts_with_all = ["repo", "last"])]
    search: Option<String>,

    /// Reopen the last loaded repository
    #[arg(long, conflicts_with = "repo")]
    last: bool,

    /// Chat provider (openai, gemini, claude, deepseek, perplexity)
    #[arg(long)]
    provider: Option<String>,

    /// Log file path (defaults to the user cache directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn github_host(config: &RxConfig, token: Option<&str>) -> FetchResult<Arc<dyn RepoHost>> {
    let client = GitHubClient::new(
        &config.github.api_url,
        token.map(str::to_string),
        Duration::from_secs(config.github.timeout_secs),
    )?;
    Ok(Arc::new(client))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = logging::init_tracing(cli.log_file.as_deref())?;

    let cwd = std::env::current_dir().context("Failed to read the working directory")?;
    let mut config = config::load_config(&cwd);
    if let Some(tag) = &cli.provider {
        config.chat.provider = Provider::from_tag(tag)
            .with_context(|| format!("Unknown chat provider '{tag}'"))?;
        config.chat.model = config.chat.provider.default_model().to_string();
    }

    let store = CredentialStore::default_location()?;
    let paths = AppPaths {
        config: config::global_config_path().unwrap_or_else(|| cwd.join(".rx.toml")),
        credentials: store.path().to_path_buf(),
    };
    let chat_backend = OpenAiCompatClient::new(Duration::from_secs(config.chat.timeout_secs))
        .context("Failed to create the chat client")?;
    tracing::info!(log = %log_path.display(), "starting rx");

    let mut app = App::new(config, paths, github_host, Arc::new(chat_backend), Executor::Threaded)?;

    if let Some(user) = &cli.user {
        app.list_user(user);
    } else if let Some(query) = &cli.search {
        app.search_for(query);
    } else if let Some(repo) = &cli.repo {
        app.open_link(repo);
    } else if cli.last {
        app.open_last_repo();
    }

    // Load syntax highlighting (once, reused for all files)
    let mut highlighter = ui::highlight::Highlighter::new();

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run event loop
    let result = run_app(&mut terminal, &mut app, &mut highlighter);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!("{err:#}");
        eprintln!("Error: {:?}", err);
    }
    tracing::info!("exiting");

    Ok(())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    hl: &mut ui::highlight::Highlighter,
) -> Result<()> {
    loop {
        let size = terminal.size()?;
        app.explorer.area = ui::body_area(Rect::new(0, 0, size.width, size.height));

        // Draw
        terminal.draw(|f| ui::draw(f, app, hl))?;

        // Poll for events with a timeout (lets worker results land too)
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => handle_key(app, key),
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                _ => {}
            }
        }

        // Apply finished background loads and replies
        app.poll_workers();

        // Tick: auto-clears notifications and drives spinners
        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Route keys: overlay takes priority, then the text-entry modes, then screens
fn handle_key(app: &mut App, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
    {
        app.should_quit = true;
        return;
    }

    if app.overlay.is_some() {
        handle_overlay_input(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Editing => handle_editing_input(app, key),
        InputMode::Filter => handle_filter_input(app, key),
        InputMode::Chat => handle_chat_input(app, key),
        // only reachable with the overlay open
        InputMode::SettingsEdit => app.input_mode = InputMode::Normal,
        InputMode::Normal => match app.screen {
            Screen::Home => handle_home_input(app, key),
            Screen::Explorer => handle_explorer_input(app, key),
        },
    }
}

/// Keys shared by both screens in normal mode; true when handled
fn handle_global_key(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('S') => app.open_settings(),
        KeyCode::Char('t') => app.toggle_theme(),
        _ => return false,
    }
    true
}

fn handle_overlay_input(app: &mut App, key: KeyEvent) {
    if !matches!(app.overlay, Some(OverlayData::Settings { .. })) {
        return;
    }
    if app.input_mode == InputMode::SettingsEdit {
        match key.code {
            KeyCode::Enter => app.settings_edit_commit(),
            KeyCode::Esc => app.settings_edit_cancel(),
            KeyCode::Backspace => app.settings_edit_pop(),
            KeyCode::Char(c) => app.settings_edit_push(c),
            _ => {}
        }
        return;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => app.overlay_next(),
        KeyCode::Char('k') | KeyCode::Up => app.overlay_prev(),
        KeyCode::Char(' ') | KeyCode::Enter => app.settings_activate(),
        KeyCode::Char('s') => app.settings_save(),
        KeyCode::Esc | KeyCode::Char('q') => app.overlay_close(),
        _ => {}
    }
}

fn handle_home_input(app: &mut App, key: KeyEvent) {
    if handle_global_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Char('1') => app.home_switch_tab(HomeTab::Search),
        KeyCode::Char('2') => app.home_switch_tab(HomeTab::User),
        KeyCode::Char('3') => app.home_switch_tab(HomeTab::Direct),
        KeyCode::Tab => app.home_switch_tab(app.home.tab.next()),
        KeyCode::BackTab => app.home_switch_tab(app.home.tab.prev()),
        KeyCode::Char('i') => app.input_mode = InputMode::Editing,
        KeyCode::Char('/') if app.home.tab == HomeTab::User => app.start_filter(),
        KeyCode::Char('j') | KeyCode::Down => app.home_next(),
        KeyCode::Char('k') | KeyCode::Up => app.home_prev(),
        KeyCode::Enter => app.home_open_selected(),
        KeyCode::Char('L') => app.open_last_repo(),
        _ => {}
    }
}

fn handle_editing_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.home_submit(),
        KeyCode::Esc | KeyCode::Down => app.input_mode = InputMode::Normal,
        KeyCode::Tab => app.home_switch_tab(app.home.tab.next()),
        KeyCode::BackTab => app.home_switch_tab(app.home.tab.prev()),
        KeyCode::Backspace => app.home_input_pop(),
        KeyCode::Char(c) => app.home_input_push(c),
        _ => {}
    }
}

fn handle_filter_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => app.filter_clear(),
        KeyCode::Backspace => app.filter_pop(),
        KeyCode::Char(c) => app.filter_push(c),
        _ => {}
    }
}

fn handle_chat_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.chat_submit(),
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.chat.input.pop();
        }
        KeyCode::Char(c) => app.chat.input.push(c),
        _ => {}
    }
}

fn handle_explorer_input(app: &mut App, key: KeyEvent) {
    if handle_global_key(app, key) {
        return;
    }
    match key.code {
        KeyCode::Tab => {
            app.cycle_focus();
            return;
        }
        KeyCode::Esc => {
            app.go_home();
            return;
        }
        _ => {}
    }

    match app.explorer.focus {
        Pane::Tree => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.tree_next(),
            KeyCode::Char('k') | KeyCode::Up => app.tree_prev(),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => app.tree_open(),
            KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => app.tree_up(),
            KeyCode::Char('~') | KeyCode::Home => app.open_crumb(0),
            KeyCode::Char('/') => app.start_filter(),
            _ => {}
        },
        Pane::Viewer => match key.code {
            KeyCode::Char('j') | KeyCode::Down => app.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => app.scroll_by(-1),
            KeyCode::PageDown => app.scroll_by(20),
            KeyCode::PageUp => app.scroll_by(-20),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.scroll_by(20)
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                app.scroll_by(-20)
            }
            KeyCode::Char('g') => app.scroll_by(i32::MIN),
            KeyCode::Char('G') => app.scroll_by(i32::MAX),
            KeyCode::Char('h') | KeyCode::Left => app.h_scroll_by(-4),
            KeyCode::Char('l') | KeyCode::Right => app.h_scroll_by(4),
            _ => {}
        },
        Pane::Chat => match key.code {
            KeyCode::Char('i') | KeyCode::Enter => app.start_chat_input(),
            KeyCode::Char('p') => app.chat_cycle_provider(),
            KeyCode::Char('m') => app.chat_cycle_model(),
            KeyCode::Char('k') | KeyCode::Up => app.chat_scroll_by(1),
            KeyCode::Char('j') | KeyCode::Down => app.chat_scroll_by(-1),
            _ => {}
        },
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => app.mouse_down(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.mouse_drag(mouse.column),
        MouseEventKind::Up(_) => app.mouse_up(),
        MouseEventKind::ScrollDown if app.screen == Screen::Explorer => match app.explorer.focus {
            Pane::Viewer => app.scroll_by(3),
            Pane::Chat => app.chat_scroll_by(-3),
            Pane::Tree => app.tree_next(),
        },
        MouseEventKind::ScrollUp if app.screen == Screen::Explorer => match app.explorer.focus {
            Pane::Viewer => app.scroll_by(-3),
            Pane::Chat => app.chat_scroll_by(3),
            Pane::Tree => app.tree_prev(),
        },
        _ => {}
    }
}
