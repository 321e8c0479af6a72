use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;

use anyhow::{Context, Result};
use ratatui::layout::{Position, Rect};

use super::filter::{filter_user_repos, visible_entries};
use super::nav::{Applied, LoadOutcome, LoadRequest, Navigator, PendingLoad};
use super::split::SplitLayout;
use crate::ai::chat::ChatBackend;
use crate::ai::session::ChatSession;
use crate::config::{self, RxConfig, SettingsAction, SettingsItem};
use crate::credentials::{CredentialStore, Credentials, LAST_REPO};
use crate::error::{FetchError, FetchResult};
use crate::github::{
    parse_direct_input, parse_repo_link, DirEntry, RepoHost, RepoInfo, SearchResult,
};

// ── Enums ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Home,
    Explorer,
}

/// The three ways into a repository from the home screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HomeTab {
    #[default]
    Search,
    User,
    Direct,
}

impl HomeTab {
    pub const ALL: [HomeTab; 3] = [HomeTab::Search, HomeTab::User, HomeTab::Direct];

    pub fn label(self) -> &'static str {
        match self {
            HomeTab::Search => "Search",
            HomeTab::User => "User repositories",
            HomeTab::Direct => "Direct",
        }
    }

    pub fn placeholder(self) -> &'static str {
        match self {
            HomeTab::Search => "search GitHub repositories",
            HomeTab::User => "GitHub username",
            HomeTab::Direct => "owner/repository",
        }
    }

    pub fn next(self) -> Self {
        match self {
            HomeTab::Search => HomeTab::User,
            HomeTab::User => HomeTab::Direct,
            HomeTab::Direct => HomeTab::Search,
        }
    }

    pub fn prev(self) -> Self {
        self.next().next()
    }
}

/// Explorer pane with keyboard focus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pane {
    #[default]
    Tree,
    Viewer,
    Chat,
}

impl Pane {
    pub const ALL: [Pane; 3] = [Pane::Tree, Pane::Viewer, Pane::Chat];

    pub fn next(self) -> Self {
        match self {
            Pane::Tree => Pane::Viewer,
            Pane::Viewer => Pane::Chat,
            Pane::Chat => Pane::Tree,
        }
    }
}

/// Whether keys navigate or go into a text field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Home screen input line
    Editing,
    /// Tree filter or user-repository filter
    Filter,
    Chat,
    /// Editing a credential in the settings overlay
    SettingsEdit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct Notice {
    pub text: String,
    pub level: NoticeLevel,
    ticks: u16,
}

// ── Overlay types ──

#[derive(Debug, Clone)]
pub enum OverlayData {
    Settings {
        selected: usize,
        /// Credentials as edited; written only on save
        draft: Credentials,
        /// Snapshot of config at overlay open time, for Cancel revert
        saved_config: RxConfig,
        /// Text buffer while a credential is being edited
        editing: Option<String>,
    },
}

// ── Workers ──

/// Results posted back from worker threads
#[derive(Debug)]
pub enum WorkerEvent {
    Load(LoadOutcome),
    Search {
        token: u64,
        result: FetchResult<SearchResult>,
    },
    UserRepos {
        token: u64,
        username: String,
        result: FetchResult<Vec<RepoInfo>>,
    },
    Chat {
        epoch: u64,
        result: FetchResult<String>,
    },
}

/// How remote calls are run. Tests use `Inline` so results are queued
/// before the call returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Executor {
    Inline,
    Threaded,
}

/// Builds the repository host from config and the stored token. Called
/// again whenever the token changes in settings.
pub type HostFactory = fn(&RxConfig, Option<&str>) -> FetchResult<Arc<dyn RepoHost>>;

/// Where settings are persisted
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config: PathBuf,
    pub credentials: PathBuf,
}

// ── Screen state ──

#[derive(Debug, Default)]
pub struct HomeState {
    pub tab: HomeTab,
    pub search_input: String,
    pub user_input: String,
    pub direct_input: String,
    pub search: Option<SearchResult>,
    /// Login the listed repositories belong to
    pub user_login: Option<String>,
    pub user_repos: Vec<RepoInfo>,
    pub user_filter: String,
    pub selected: usize,
    pub loading: bool,
    token: u64,
}

impl HomeState {
    pub fn input(&self) -> &str {
        match self.tab {
            HomeTab::Search => &self.search_input,
            HomeTab::User => &self.user_input,
            HomeTab::Direct => &self.direct_input,
        }
    }

    fn input_mut(&mut self) -> &mut String {
        match self.tab {
            HomeTab::Search => &mut self.search_input,
            HomeTab::User => &mut self.user_input,
            HomeTab::Direct => &mut self.direct_input,
        }
    }

    /// Repository cards for the active tab
    pub fn cards(&self) -> Vec<&RepoInfo> {
        match self.tab {
            HomeTab::Search => self
                .search
                .as_ref()
                .map(|s| s.items.iter().collect())
                .unwrap_or_default(),
            HomeTab::User => filter_user_repos(&self.user_repos, &self.user_filter),
            HomeTab::Direct => Vec::new(),
        }
    }

    fn begin(&mut self) -> u64 {
        self.token += 1;
        self.loading = true;
        self.token
    }
}

#[derive(Debug, Default)]
pub struct ExplorerState {
    pub focus: Pane,
    pub selected: usize,
    pub filter: String,
    /// Viewer scroll offsets
    pub scroll: u16,
    pub h_scroll: u16,
    pub split: SplitLayout,
    /// Screen area holding the three panes, from the last frame
    pub area: Rect,
}

/// One row of the file tree
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TreeRow<'a> {
    Parent,
    Entry(&'a DirEntry),
}

// ── App ──

pub struct App {
    pub screen: Screen,
    pub home: HomeState,
    pub explorer: ExplorerState,
    pub nav: Navigator,
    pub chat: ChatSession,

    pub input_mode: InputMode,
    pub overlay: Option<OverlayData>,
    pub notice: Option<Notice>,
    pub should_quit: bool,
    /// Frame counter, drives the loading spinner
    pub ticks: u64,

    pub config: RxConfig,
    pub creds: Credentials,
    store: CredentialStore,
    config_path: PathBuf,

    host: Arc<dyn RepoHost>,
    make_host: HostFactory,
    chat_backend: Arc<dyn ChatBackend>,
    executor: Executor,
    tx: Sender<WorkerEvent>,
    rx: Receiver<WorkerEvent>,
}

impl App {
    pub fn new(
        config: RxConfig,
        paths: AppPaths,
        make_host: HostFactory,
        chat_backend: Arc<dyn ChatBackend>,
        executor: Executor,
    ) -> Result<Self> {
        let store = CredentialStore::at(paths.credentials);
        let creds = store.load();
        let host = make_host(&config, creds.github_token())
            .context("Failed to create the GitHub client")?;
        let (tx, rx) = mpsc::channel();

        let home = HomeState {
            user_input: creds.github_username().unwrap_or_default().to_string(),
            ..HomeState::default()
        };
        let explorer = ExplorerState {
            split: SplitLayout::from_config(&config.layout),
            ..ExplorerState::default()
        };

        Ok(Self {
            screen: Screen::Home,
            home,
            explorer,
            nav: Navigator::new(),
            chat: ChatSession::new(config.chat.provider, &config.chat.model),
            input_mode: InputMode::Editing,
            overlay: None,
            notice: None,
            should_quit: false,
            ticks: 0,
            config,
            creds,
            store,
            config_path: paths.config,
            host,
            make_host,
            chat_backend,
            executor,
            tx,
            rx,
        })
    }

    // ── Workers ──

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() -> WorkerEvent + Send + 'static,
    {
        let tx = self.tx.clone();
        match self.executor {
            Executor::Inline => {
                let _ = tx.send(job());
            }
            Executor::Threaded => {
                std::thread::spawn(move || {
                    // receiver gone means the app is shutting down
                    let _ = tx.send(job());
                });
            }
        }
    }

    fn dispatch(&mut self, pending: PendingLoad) {
        tracing::debug!(token = pending.token, what = pending.request.what(), "load dispatched");
        let host = Arc::clone(&self.host);
        self.spawn(move || WorkerEvent::Load(pending.run(host.as_ref())));
    }

    /// Apply every finished worker result. Called once per frame.
    pub fn poll_workers(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            match event {
                WorkerEvent::Load(outcome) => self.on_load(outcome),
                WorkerEvent::Search { token, result } => self.on_search(token, result),
                WorkerEvent::UserRepos {
                    token,
                    username,
                    result,
                } => self.on_user_repos(token, username, result),
                WorkerEvent::Chat { epoch, result } => {
                    if self.chat.apply_reply(epoch, result) {
                        self.chat.scroll = 0;
                    }
                }
            }
        }
    }

    fn on_load(&mut self, outcome: LoadOutcome) {
        let request = outcome.request.clone();
        match self.nav.apply(outcome) {
            Applied::Committed => match request {
                LoadRequest::Repo { .. } => {
                    let slug = format!("{}/{}", self.nav.owner(), self.nav.name());
                    self.remember_last_repo(&slug);
                    self.explorer.selected = 0;
                    self.explorer.filter.clear();
                    self.explorer.focus = Pane::Tree;
                    self.reset_viewer();
                    self.sync_chat_file();
                    self.notify(&format!("Opened {slug}"));
                }
                LoadRequest::Directory { .. } => {
                    self.explorer.selected = 0;
                    self.explorer.filter.clear();
                    self.reset_viewer();
                    self.sync_chat_file();
                }
                LoadRequest::File { .. } => {
                    self.reset_viewer();
                    self.sync_chat_file();
                }
            },
            Applied::Stale => {}
            Applied::Failed(e) => {
                let msg = if e.is_local() {
                    e.to_string()
                } else {
                    format!("Failed to load {}: {e}", request.what())
                };
                self.notify_error(&msg);
                if self.nav.repo().is_none() {
                    self.screen = Screen::Home;
                    self.input_mode = InputMode::Editing;
                }
            }
        }
    }

    fn on_search(&mut self, token: u64, result: FetchResult<SearchResult>) {
        if token != self.home.token {
            return;
        }
        self.home.loading = false;
        match result {
            Ok(found) => {
                self.home.selected = 0;
                if found.items.is_empty() {
                    self.notify("No repositories found");
                } else {
                    self.input_mode = InputMode::Normal;
                }
                self.home.search = Some(found);
            }
            Err(e) => self.notify_error(&format!("Failed to search repositories: {e}")),
        }
    }

    fn on_user_repos(&mut self, token: u64, username: String, result: FetchResult<Vec<RepoInfo>>) {
        if token != self.home.token {
            return;
        }
        self.home.loading = false;
        match result {
            Ok(repos) => {
                self.home.selected = 0;
                self.home.user_filter.clear();
                if repos.is_empty() {
                    self.notify(&format!("No repositories found for {username}"));
                } else {
                    self.input_mode = InputMode::Normal;
                }
                self.home.user_repos = repos;
                self.home.user_login = Some(username);
            }
            Err(e) => self.notify_error(&format!("Failed to load repositories for {username}: {e}")),
        }
    }

    fn remember_last_repo(&mut self, slug: &str) {
        self.creds.set(LAST_REPO, slug);
        if let Err(e) = self.store.save(&self.creds) {
            tracing::warn!("could not remember last repository: {e:#}");
        }
    }

    fn sync_chat_file(&mut self) {
        let file = self
            .nav
            .file()
            .map(|f| (f.content.name.as_str(), f.path.as_str(), &f.body));
        self.chat.set_file(file);
    }

    fn reset_viewer(&mut self) {
        self.explorer.scroll = 0;
        self.explorer.h_scroll = 0;
    }

    // ── Home ──

    pub fn home_switch_tab(&mut self, tab: HomeTab) {
        self.home.tab = tab;
        self.home.selected = 0;
        self.input_mode = InputMode::Editing;
    }

    pub fn home_input_push(&mut self, c: char) {
        self.home.input_mut().push(c);
    }

    pub fn home_input_pop(&mut self) {
        self.home.input_mut().pop();
    }

    /// Run the active tab's action for the text in its input line
    pub fn home_submit(&mut self) {
        match self.home.tab {
            HomeTab::Search => {
                let query = self.home.search_input.trim().to_string();
                if query.is_empty() {
                    self.notify_error("Please enter a search query");
                    return;
                }
                let token = self.home.begin();
                let host = Arc::clone(&self.host);
                self.spawn(move || WorkerEvent::Search {
                    token,
                    result: host.search_repositories(&query),
                });
            }
            HomeTab::User => {
                let typed = self.home.user_input.trim();
                let username = if typed.is_empty() {
                    self.creds.github_username().unwrap_or_default().to_string()
                } else {
                    typed.to_string()
                };
                if username.is_empty() {
                    self.notify_error("Please enter a GitHub username");
                    return;
                }
                let token = self.home.begin();
                let host = Arc::clone(&self.host);
                self.spawn(move || WorkerEvent::UserRepos {
                    token,
                    result: host.user_repositories(&username),
                    username,
                });
            }
            HomeTab::Direct => match parse_direct_input(&self.home.direct_input) {
                Some((owner, repo)) => self.open_repo(&owner, repo.as_deref()),
                None => self.notify_error("Please enter a repository as owner/repository"),
            },
        }
    }

    pub fn home_next(&mut self) {
        let len = self.home.cards().len();
        if self.home.selected + 1 < len {
            self.home.selected += 1;
        }
    }

    pub fn home_prev(&mut self) {
        self.home.selected = self.home.selected.saturating_sub(1);
    }

    pub fn home_open_selected(&mut self) {
        let target = self
            .home
            .cards()
            .get(self.home.selected)
            .map(|r| (r.owner.login.clone(), r.name.clone()));
        if let Some((owner, name)) = target {
            self.open_repo(&owner, Some(&name));
        }
    }

    // ── Opening repositories ──

    /// Switch to the explorer and start loading. A missing name is passed
    /// through and rejected by the host without a request.
    pub fn open_repo(&mut self, owner: &str, name: Option<&str>) {
        let pending = self.nav.begin_repo(owner, name);
        self.screen = Screen::Explorer;
        self.input_mode = InputMode::Normal;
        self.dispatch(pending);
    }

    /// `owner/name` or a github.com URL
    pub fn open_link(&mut self, link: &str) {
        match parse_repo_link(link) {
            Some(r) => self.open_repo(&r.owner, Some(&r.name)),
            None => self.notify_error("Invalid repository format. Please use 'owner/repo'"),
        }
    }

    pub fn open_last_repo(&mut self) {
        match self.creds.last_repo().map(str::to_string) {
            Some(link) => self.open_link(&link),
            None => self.notify("No repository opened yet"),
        }
    }

    pub fn search_for(&mut self, query: &str) {
        self.home_switch_tab(HomeTab::Search);
        self.home.search_input = query.to_string();
        self.home_submit();
    }

    pub fn list_user(&mut self, username: &str) {
        self.home_switch_tab(HomeTab::User);
        self.home.user_input = username.to_string();
        self.home_submit();
    }

    /// Leave the explorer; replies and loads still in flight are dropped
    pub fn go_home(&mut self) {
        self.nav.close();
        self.chat.set_file(None);
        self.explorer.selected = 0;
        self.explorer.filter.clear();
        self.explorer.focus = Pane::Tree;
        self.explorer.split.end_drag();
        self.reset_viewer();
        self.screen = Screen::Home;
        self.input_mode = InputMode::Normal;
    }

    // ── Explorer: file tree ──

    /// `..` first when below the root, then the filtered, sorted listing
    pub fn tree_rows(&self) -> Vec<TreeRow<'_>> {
        let mut rows = Vec::new();
        if !self.nav.at_root() {
            rows.push(TreeRow::Parent);
        }
        rows.extend(
            visible_entries(self.nav.listing(), &self.explorer.filter)
                .into_iter()
                .map(TreeRow::Entry),
        );
        rows
    }

    pub fn tree_next(&mut self) {
        let len = self.tree_rows().len();
        if self.explorer.selected + 1 < len {
            self.explorer.selected += 1;
        }
    }

    pub fn tree_prev(&mut self) {
        self.explorer.selected = self.explorer.selected.saturating_sub(1);
    }

    /// Open the selected row: parent, directory or file
    pub fn tree_open(&mut self) {
        let target = match self.tree_rows().get(self.explorer.selected) {
            None => return,
            Some(TreeRow::Parent) => None,
            Some(TreeRow::Entry(e)) => Some((e.is_dir(), e.path.clone())),
        };
        let pending = match target {
            None => self.nav.navigate_up(),
            Some((true, path)) => self.nav.begin_directory(&path),
            Some((false, path)) => self.nav.begin_file(&path),
        };
        if let Some(p) = pending {
            self.dispatch(p);
        }
    }

    pub fn tree_up(&mut self) {
        if let Some(p) = self.nav.navigate_up() {
            self.dispatch(p);
        }
    }

    /// Jump to a breadcrumb's directory
    pub fn open_crumb(&mut self, index: usize) {
        let path = match self.nav.breadcrumbs().get(index) {
            Some(c) => c.path.clone(),
            None => return,
        };
        if path != self.nav.path() {
            if let Some(p) = self.nav.begin_directory(&path) {
                self.dispatch(p);
            }
        }
    }

    // ── Filters ──

    pub fn start_filter(&mut self) {
        self.input_mode = InputMode::Filter;
    }

    fn filter_mut(&mut self) -> &mut String {
        match self.screen {
            Screen::Home => &mut self.home.user_filter,
            Screen::Explorer => &mut self.explorer.filter,
        }
    }

    pub fn filter_push(&mut self, c: char) {
        self.filter_mut().push(c);
        self.clamp_selection();
    }

    pub fn filter_pop(&mut self) {
        self.filter_mut().pop();
        self.clamp_selection();
    }

    pub fn filter_clear(&mut self) {
        self.filter_mut().clear();
        self.input_mode = InputMode::Normal;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        match self.screen {
            Screen::Home => {
                let len = self.home.cards().len();
                self.home.selected = self.home.selected.min(len.saturating_sub(1));
            }
            Screen::Explorer => {
                let len = self.tree_rows().len();
                self.explorer.selected = self.explorer.selected.min(len.saturating_sub(1));
            }
        }
    }

    // ── Explorer: viewer ──

    fn viewer_line_count(&self) -> usize {
        match self.nav.file().map(|f| &f.body) {
            Some(crate::content::FileBody::Text(t)) => t.lines().count(),
            _ => 0,
        }
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let max = self.viewer_line_count().saturating_sub(1);
        let next = (i64::from(self.explorer.scroll) + i64::from(delta)).clamp(0, max as i64);
        self.explorer.scroll = u16::try_from(next).unwrap_or(u16::MAX);
    }

    pub fn h_scroll_by(&mut self, delta: i32) {
        let next = (i32::from(self.explorer.h_scroll) + delta).clamp(0, i32::from(u16::MAX));
        self.explorer.h_scroll = u16::try_from(next).unwrap_or(0);
    }

    pub fn cycle_focus(&mut self) {
        self.explorer.focus = self.explorer.focus.next();
    }

    // ── Explorer: chat ──

    pub fn start_chat_input(&mut self) {
        self.explorer.focus = Pane::Chat;
        self.input_mode = InputMode::Chat;
    }

    pub fn chat_submit(&mut self) {
        match self.chat.submit(&self.creds) {
            Ok(Some(pending)) => {
                self.chat.scroll = 0;
                let backend = Arc::clone(&self.chat_backend);
                self.spawn(move || WorkerEvent::Chat {
                    epoch: pending.epoch,
                    result: backend.complete(&pending.request),
                });
            }
            Ok(None) => {}
            Err(FetchError::MissingCredential(_)) => {
                let msg = format!(
                    "{}'s API key not set! Press S to add it in Settings",
                    self.chat.provider.name()
                );
                self.notify_error(&msg);
            }
            Err(e) => self.notify_error(&e.to_string()),
        }
    }

    pub fn chat_cycle_provider(&mut self) {
        self.chat.cycle_provider();
        self.config.chat.provider = self.chat.provider;
        self.config.chat.model = self.chat.model.clone();
    }

    pub fn chat_cycle_model(&mut self) {
        self.chat.cycle_model();
        self.config.chat.model = self.chat.model.clone();
    }

    pub fn chat_scroll_by(&mut self, delta: i32) {
        let next = (i32::from(self.chat.scroll) + delta).clamp(0, i32::from(u16::MAX));
        self.chat.scroll = u16::try_from(next).unwrap_or(0);
    }

    // ── Mouse ──

    /// A press on a divider starts a drag; elsewhere it focuses the pane
    pub fn mouse_down(&mut self, x: u16, y: u16) {
        if self.screen != Screen::Explorer || self.overlay.is_some() {
            return;
        }
        let area = self.explorer.area;
        if let Some(boundary) = self.explorer.split.hit_test(area, x, y) {
            self.explorer.split.begin_drag(boundary);
            return;
        }
        let panes = self.explorer.split.split(area);
        if let Some(pane) = Pane::ALL
            .into_iter()
            .zip(panes)
            .find(|(_, rect)| rect.contains(Position::new(x, y)))
            .map(|(pane, _)| pane)
        {
            self.explorer.focus = pane;
        }
    }

    pub fn mouse_drag(&mut self, x: u16) {
        self.explorer.split.pointer_move(self.explorer.area, x);
    }

    /// Any release ends the drag, wherever the pointer is
    pub fn mouse_up(&mut self) {
        self.explorer.split.end_drag();
    }

    // ── Display ──

    pub fn toggle_theme(&mut self) {
        self.config.display.theme = self.config.display.theme.toggled();
        let label = match self.config.display.theme {
            config::ThemeMode::Dark => "Theme: dark",
            config::ThemeMode::Light => "Theme: light",
        };
        self.notify(label);
    }

    // ── Overlay: Settings ──

    pub fn open_settings(&mut self) {
        let items = config::settings_items();
        let first_selectable = items.iter().position(SettingsItem::is_selectable).unwrap_or(0);
        self.overlay = Some(OverlayData::Settings {
            selected: first_selectable,
            draft: self.creds.clone(),
            saved_config: self.config.clone(),
            editing: None,
        });
        self.input_mode = InputMode::Normal;
    }

    pub fn overlay_next(&mut self) {
        if let Some(OverlayData::Settings { selected, .. }) = &mut self.overlay {
            let items = config::settings_items();
            // Skip section headers when navigating down
            let mut next = *selected + 1;
            while next < items.len() && !items[next].is_selectable() {
                next += 1;
            }
            if next < items.len() {
                *selected = next;
            }
        }
    }

    pub fn overlay_prev(&mut self) {
        if let Some(OverlayData::Settings { selected, .. }) = &mut self.overlay {
            let items = config::settings_items();
            let mut prev = *selected;
            while prev > 0 {
                prev -= 1;
                if items[prev].is_selectable() {
                    *selected = prev;
                    break;
                }
            }
        }
    }

    /// Enter on the selected item: toggle, start editing, or run the action
    pub fn settings_activate(&mut self) {
        let items = config::settings_items();
        let index = match &self.overlay {
            Some(OverlayData::Settings { selected, .. }) => *selected,
            None => return,
        };
        match items.get(index) {
            Some(SettingsItem::BoolToggle { get, set, .. }) => {
                let current = get(&self.config);
                set(&mut self.config, !current);
            }
            Some(SettingsItem::Credential { key, .. }) => {
                if let Some(OverlayData::Settings { draft, editing, .. }) = &mut self.overlay {
                    *editing = Some(draft.get(key).unwrap_or_default().to_string());
                }
                self.input_mode = InputMode::SettingsEdit;
            }
            Some(SettingsItem::Action { action, .. }) => match action {
                SettingsAction::Save => self.settings_save(),
                SettingsAction::ClearCredentials => self.settings_clear(),
            },
            Some(SettingsItem::SectionHeader(_)) | None => {}
        }
    }

    fn edit_buffer(&mut self) -> Option<&mut String> {
        match &mut self.overlay {
            Some(OverlayData::Settings { editing, .. }) => editing.as_mut(),
            None => None,
        }
    }

    pub fn settings_edit_push(&mut self, c: char) {
        if let Some(buf) = self.edit_buffer() {
            buf.push(c);
        }
    }

    pub fn settings_edit_pop(&mut self) {
        if let Some(buf) = self.edit_buffer() {
            buf.pop();
        }
    }

    /// Store the edited value in the draft
    pub fn settings_edit_commit(&mut self) {
        let items = config::settings_items();
        if let Some(OverlayData::Settings {
            selected,
            draft,
            editing,
            ..
        }) = &mut self.overlay
        {
            if let (Some(SettingsItem::Credential { key, .. }), Some(value)) =
                (items.get(*selected), editing.take())
            {
                let value = value.trim();
                if value.is_empty() {
                    draft.remove(key);
                } else {
                    draft.set(key, value);
                }
            }
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn settings_edit_cancel(&mut self) {
        if let Some(OverlayData::Settings { editing, .. }) = &mut self.overlay {
            *editing = None;
        }
        self.input_mode = InputMode::Normal;
    }

    /// Write the draft credentials and config to disk and close the overlay
    pub fn settings_save(&mut self) {
        let Some(OverlayData::Settings { draft, .. }) = self.overlay.take() else {
            return;
        };
        self.input_mode = InputMode::Normal;
        let token_changed = draft.github_token() != self.creds.github_token();
        self.creds = draft;
        if self.home.user_input.is_empty() {
            self.home.user_input = self.creds.github_username().unwrap_or_default().to_string();
        }

        let saved = self
            .store
            .save(&self.creds)
            .and_then(|_| config::save_config(&self.config_path, &self.config));
        if token_changed {
            self.reconnect();
        }
        match saved {
            Ok(()) => self.notify("Settings saved"),
            Err(e) => self.notify_error(&format!("Failed to save: {e:#}")),
        }
    }

    /// Remove the stored token, username, API keys and last repository
    pub fn settings_clear(&mut self) {
        self.overlay = None;
        self.input_mode = InputMode::Normal;
        let token_changed = self.creds.github_token().is_some();
        self.creds.clear();
        self.home.user_input.clear();
        if token_changed {
            self.reconnect();
        }
        match self.store.save(&self.creds) {
            Ok(()) => self.notify("Settings cleared"),
            Err(e) => self.notify_error(&format!("Failed to clear settings: {e:#}")),
        }
    }

    /// Close the overlay, reverting display toggles
    pub fn overlay_close(&mut self) {
        if let Some(OverlayData::Settings { saved_config, .. }) = self.overlay.take() {
            self.config = saved_config;
        }
        self.input_mode = InputMode::Normal;
    }

    fn reconnect(&mut self) {
        match (self.make_host)(&self.config, self.creds.github_token()) {
            Ok(host) => self.host = host,
            Err(e) => self.notify_error(&format!("Failed to create the GitHub client: {e}")),
        }
    }

    // ── Notifications ──

    pub fn notify(&mut self, msg: &str) {
        self.notice = Some(Notice {
            text: msg.to_string(),
            level: NoticeLevel::Info,
            ticks: 0,
        });
    }

    pub fn notify_error(&mut self, msg: &str) {
        tracing::info!("{msg}");
        self.notice = Some(Notice {
            text: msg.to_string(),
            level: NoticeLevel::Error,
            ticks: 0,
        });
    }

    /// Called on every event loop iteration; clears notices after a while
    pub fn tick(&mut self) {
        self.ticks = self.ticks.wrapping_add(1);
        if let Some(notice) = &mut self.notice {
            notice.ticks += 1;
            let limit = match notice.level {
                NoticeLevel::Info => 30,
                NoticeLevel::Error => 60,
            };
            if notice.ticks > limit {
                self.notice = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::chat::{ChatRole, CompletionRequest};
    use crate::ai::provider::Provider;
    use crate::credentials::GITHUB_TOKEN;
    use crate::github::{EntryKind, FileContent, Owner};

    struct FakeHost;

    fn repo(owner: &str, name: &str, updated_at: &str) -> RepoInfo {
        RepoInfo {
            name: name.to_string(),
            full_name: format!("{owner}/{name}"),
            owner: Owner {
                login: owner.to_string(),
                ..Default::default()
            },
            updated_at: updated_at.to_string(),
            ..Default::default()
        }
    }

    fn entry(path: &str, kind: EntryKind) -> DirEntry {
        DirEntry {
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            path: path.to_string(),
            kind,
            size: 0,
        }
    }

    impl RepoHost for FakeHost {
        fn repo_info(&self, owner: &str, name: Option<&str>) -> FetchResult<RepoInfo> {
            match name {
                Some("missing") => Err(FetchError::Http { status: 404 }),
                Some(name) => Ok(repo(owner, name, "")),
                None => Err(FetchError::InvalidInput(
                    "Invalid repository format: missing repository name".into(),
                )),
            }
        }

        fn list_directory(&self, _owner: &str, _name: &str, path: &str) -> FetchResult<Vec<DirEntry>> {
            match path {
                "" => Ok(vec![
                    entry("README.md", EntryKind::File),
                    entry("src", EntryKind::Dir),
                ]),
                "src" => Ok(vec![entry("src/main.rs", EntryKind::File)]),
                _ => Err(FetchError::Http { status: 404 }),
            }
        }

        fn file_content(&self, _owner: &str, _name: &str, path: &str) -> FetchResult<FileContent> {
            Ok(FileContent {
                name: path.rsplit('/').next().unwrap_or(path).to_string(),
                path: path.to_string(),
                content: Some("aGVsbG8=".into()),
                encoding: Some("base64".into()),
                size: 5,
            })
        }

        fn search_repositories(&self, query: &str) -> FetchResult<SearchResult> {
            if query == "nothing" {
                return Ok(SearchResult::default());
            }
            Ok(SearchResult {
                total_count: 1,
                items: vec![repo("found", query, "")],
            })
        }

        fn user_repositories(&self, username: &str) -> FetchResult<Vec<RepoInfo>> {
            Ok(vec![
                repo(username, "old", "2020-01-01T00:00:00Z"),
                repo(username, "new", "2024-01-01T00:00:00Z"),
            ])
        }
    }

    /// Echoes the last user message
    struct EchoChat;

    impl ChatBackend for EchoChat {
        fn complete(&self, request: &CompletionRequest) -> FetchResult<String> {
            let last = request
                .messages
                .iter()
                .rev()
                .find(|m| m.role == ChatRole::User)
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(format!("echo: {last}"))
        }
    }

    fn fake_host(_: &RxConfig, _: Option<&str>) -> FetchResult<Arc<dyn RepoHost>> {
        Ok(Arc::new(FakeHost))
    }

    fn test_app() -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let paths = AppPaths {
            config: dir.path().join("config.toml"),
            credentials: dir.path().join("credentials.toml"),
        };
        let app = App::new(
            RxConfig::default(),
            paths,
            fake_host,
            Arc::new(EchoChat),
            Executor::Inline,
        )
        .unwrap();
        (dir, app)
    }

    fn type_home(app: &mut App, text: &str) {
        for c in text.chars() {
            app.home_input_push(c);
        }
    }

    fn error_text(app: &App) -> String {
        match &app.notice {
            Some(n) if n.level == NoticeLevel::Error => n.text.clone(),
            other => panic!("expected error notice, got {other:?}"),
        }
    }

    fn opened(app: &mut App) {
        app.open_repo("octocat", Some("Hello-World"));
        app.poll_workers();
        assert!(app.nav.repo().is_some());
    }

    #[test]
    fn direct_entry_opens_explorer_and_remembers_repo() {
        let (dir, mut app) = test_app();
        app.home_switch_tab(HomeTab::Direct);
        type_home(&mut app, "octocat/Hello-World");
        app.home_submit();
        assert_eq!(app.screen, Screen::Explorer);
        assert!(app.nav.is_loading());

        app.poll_workers();
        assert!(!app.nav.is_loading());
        assert_eq!(app.nav.owner(), "octocat");
        assert_eq!(app.creds.last_repo(), Some("octocat/Hello-World"));

        let stored = CredentialStore::at(dir.path().join("credentials.toml")).load();
        assert_eq!(stored.last_repo(), Some("octocat/Hello-World"));
    }

    #[test]
    fn direct_entry_without_repo_is_rejected() {
        let (_dir, mut app) = test_app();
        app.home_switch_tab(HomeTab::Direct);
        type_home(&mut app, "octocat");
        app.home_submit();
        app.poll_workers();
        assert!(error_text(&app).contains("missing repository name"));
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn empty_inputs_are_rejected_locally() {
        let (_dir, mut app) = test_app();
        app.home_submit();
        assert_eq!(error_text(&app), "Please enter a search query");
        assert!(!app.home.loading);

        app.home_switch_tab(HomeTab::User);
        app.home_submit();
        assert_eq!(error_text(&app), "Please enter a GitHub username");

        app.home_switch_tab(HomeTab::Direct);
        app.home_submit();
        assert!(error_text(&app).contains("owner/repository"));
    }

    #[test]
    fn failed_repo_load_returns_home() {
        let (_dir, mut app) = test_app();
        app.open_repo("octocat", Some("missing"));
        app.poll_workers();
        assert_eq!(error_text(&app), "Failed to load repository: API error: 404");
        assert_eq!(app.screen, Screen::Home);
    }

    #[test]
    fn search_results_open_in_explorer() {
        let (_dir, mut app) = test_app();
        type_home(&mut app, "ratatui");
        app.home_submit();
        app.poll_workers();
        assert_eq!(app.home.cards().len(), 1);
        assert_eq!(app.input_mode, InputMode::Normal);

        app.home_open_selected();
        app.poll_workers();
        assert_eq!(app.screen, Screen::Explorer);
        assert_eq!(app.nav.name(), "ratatui");
    }

    #[test]
    fn empty_search_is_reported() {
        let (_dir, mut app) = test_app();
        app.search_for("nothing");
        app.poll_workers();
        assert_eq!(app.notice.as_ref().unwrap().text, "No repositories found");
        assert_eq!(app.notice.as_ref().unwrap().level, NoticeLevel::Info);
    }

    #[test]
    fn only_latest_search_is_shown() {
        let (_dir, mut app) = test_app();
        app.search_for("first");
        app.search_for("second");
        app.poll_workers();
        assert_eq!(app.home.cards()[0].name, "second");
    }

    #[test]
    fn user_repos_are_sorted_and_filtered() {
        let (_dir, mut app) = test_app();
        app.list_user("octocat");
        app.poll_workers();
        let names: Vec<&str> = app.home.cards().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["new", "old"]);

        app.start_filter();
        app.filter_push('o');
        app.filter_push('l');
        let names: Vec<&str> = app.home.cards().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["old"]);
    }

    #[test]
    fn stored_username_is_used_for_user_tab() {
        let (_dir, mut app) = test_app();
        app.creds.set(crate::credentials::GITHUB_USERNAME, "stored");
        app.home_switch_tab(HomeTab::User);
        app.home_submit();
        app.poll_workers();
        assert_eq!(app.home.user_login.as_deref(), Some("stored"));
    }

    #[test]
    fn tree_walks_into_directories_and_back() {
        let (_dir, mut app) = test_app();
        opened(&mut app);
        // directories first
        assert!(matches!(app.tree_rows()[0], TreeRow::Entry(e) if e.name == "src"));

        app.tree_open();
        app.poll_workers();
        assert_eq!(app.nav.path(), "src");
        assert_eq!(app.tree_rows()[0], TreeRow::Parent);

        app.tree_next();
        app.tree_open();
        app.poll_workers();
        assert_eq!(app.nav.file().unwrap().path, "src/main.rs");
        assert_eq!(app.chat.context().unwrap().language, "rust");

        app.explorer.selected = 0;
        app.tree_open();
        app.poll_workers();
        assert_eq!(app.nav.path(), "");
        assert!(app.nav.file().is_none());
    }

    #[test]
    fn root_crumb_returns_to_root() {
        let (_dir, mut app) = test_app();
        opened(&mut app);
        app.tree_open();
        app.poll_workers();
        assert_eq!(app.nav.path(), "src");
        assert_eq!(app.nav.breadcrumbs().len(), 2);

        app.open_crumb(0);
        app.poll_workers();
        assert_eq!(app.nav.path(), "");
        // already at the root: nothing is issued
        app.open_crumb(0);
        assert!(!app.nav.is_loading());
    }

    #[test]
    fn tree_filter_narrows_rows() {
        let (_dir, mut app) = test_app();
        opened(&mut app);
        app.start_filter();
        app.filter_push('R');
        app.filter_push('E');
        assert_eq!(app.tree_rows().len(), 1);
        app.filter_clear();
        assert_eq!(app.tree_rows().len(), 2);
    }

    #[test]
    fn chat_without_key_points_to_settings() {
        let (_dir, mut app) = test_app();
        opened(&mut app);
        app.start_chat_input();
        app.chat.input = "what is this?".into();
        app.chat_submit();
        assert_eq!(
            error_text(&app),
            "OpenAI's API key not set! Press S to add it in Settings"
        );
        assert_eq!(app.chat.entries.len(), 1);
    }

    #[test]
    fn chat_reply_is_appended() {
        let (_dir, mut app) = test_app();
        app.creds.set(Provider::OpenAi.credential_key(), "sk-test");
        opened(&mut app);
        app.chat.input = "hi".into();
        app.chat_submit();
        app.poll_workers();
        let last = app.chat.entries.last().unwrap();
        assert!(last.text.starts_with("echo: "));
        assert!(!app.chat.waiting);
    }

    #[test]
    fn settings_clear_removes_everything() {
        let (dir, mut app) = test_app();
        app.creds.set(GITHUB_TOKEN, "ghp_x");
        app.creds.set(Provider::Claude.credential_key(), "k");
        opened(&mut app);
        assert!(app.creds.last_repo().is_some());

        app.open_settings();
        app.settings_clear();
        assert!(app.overlay.is_none());
        assert_eq!(app.creds, Credentials::default());
        let stored = CredentialStore::at(dir.path().join("credentials.toml")).load();
        assert_eq!(stored, Credentials::default());
    }

    #[test]
    fn settings_edit_and_save() {
        let (dir, mut app) = test_app();
        app.open_settings();
        // first selectable item is the username field
        app.settings_activate();
        assert_eq!(app.input_mode, InputMode::SettingsEdit);
        for c in "octocat".chars() {
            app.settings_edit_push(c);
        }
        app.settings_edit_commit();
        // nothing is written before save
        assert_eq!(app.creds.github_username(), None);

        app.settings_save();
        assert_eq!(app.creds.github_username(), Some("octocat"));
        assert_eq!(app.home.user_input, "octocat");
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn settings_cancel_reverts_toggles() {
        let (_dir, mut app) = test_app();
        app.open_settings();
        let items = config::settings_items();
        let toggle = items
            .iter()
            .position(|i| matches!(i, SettingsItem::BoolToggle { .. }))
            .unwrap();
        if let Some(OverlayData::Settings { selected, .. }) = &mut app.overlay {
            *selected = toggle;
        }
        app.settings_activate();
        assert!(!app.config.display.line_numbers);
        app.overlay_close();
        assert!(app.config.display.line_numbers);
    }

    #[test]
    fn overlay_navigation_skips_headers() {
        let (_dir, mut app) = test_app();
        app.open_settings();
        let items = config::settings_items();
        for _ in 0..items.len() {
            app.overlay_next();
            if let Some(OverlayData::Settings { selected, .. }) = &app.overlay {
                assert!(items[*selected].is_selectable());
            }
        }
        for _ in 0..items.len() {
            app.overlay_prev();
            if let Some(OverlayData::Settings { selected, .. }) = &app.overlay {
                assert!(items[*selected].is_selectable());
            }
        }
    }

    #[test]
    fn mouse_drag_resizes_and_release_clears() {
        let (_dir, mut app) = test_app();
        opened(&mut app);
        app.explorer.area = Rect::new(0, 1, 100, 30);
        app.mouse_down(15, 5);
        assert!(app.explorer.split.is_dragging());
        app.mouse_drag(30);
        assert!((app.explorer.split.widths().left - 30.0).abs() < 1e-9);
        app.mouse_up();
        assert!(!app.explorer.split.is_dragging());

        app.mouse_down(80, 5);
        assert_eq!(app.explorer.focus, Pane::Chat);
    }

    #[test]
    fn go_home_drops_inflight_loads() {
        let (_dir, mut app) = test_app();
        opened(&mut app);
        app.explorer.selected = 1;
        app.tree_open();
        app.go_home();
        app.poll_workers();
        assert_eq!(app.screen, Screen::Home);
        assert!(app.nav.repo().is_none());
        assert!(app.nav.file().is_none());
    }

    #[test]
    fn last_repo_reopens() {
        let (_dir, mut app) = test_app();
        app.open_last_repo();
        assert_eq!(app.notice.as_ref().unwrap().text, "No repository opened yet");

        app.creds.set(LAST_REPO, "octocat/Spoon-Knife");
        app.open_last_repo();
        app.poll_workers();
        assert_eq!(app.nav.name(), "Spoon-Knife");
    }

    #[test]
    fn notices_expire() {
        let (_dir, mut app) = test_app();
        app.notify("hello");
        for _ in 0..31 {
            app.tick();
        }
        assert!(app.notice.is_none());
    }

    #[test]
    fn viewer_scroll_is_clamped() {
        let (_dir, mut app) = test_app();
        opened(&mut app);
        app.scroll_by(10);
        assert_eq!(app.explorer.scroll, 0);
        app.h_scroll_by(-5);
        assert_eq!(app.explorer.h_scroll, 0);
        app.h_scroll_by(4);
        assert_eq!(app.explorer.h_scroll, 4);
    }
}
