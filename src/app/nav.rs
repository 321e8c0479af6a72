use crate::content::FileBody;
use crate::error::{FetchError, FetchResult};
use crate::github::{DirEntry, FileContent, RepoHost, RepoInfo};

// ── Requests and outcomes ──

/// Which part of the navigation state a load writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Listing,
    File,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadRequest {
    Repo {
        owner: String,
        name: Option<String>,
    },
    Directory {
        owner: String,
        name: String,
        path: String,
    },
    File {
        owner: String,
        name: String,
        path: String,
    },
}

impl LoadRequest {
    pub fn slot(&self) -> Slot {
        match self {
            LoadRequest::Repo { .. } | LoadRequest::Directory { .. } => Slot::Listing,
            LoadRequest::File { .. } => Slot::File,
        }
    }

    /// Short label for notifications ("repository", "directory", "file")
    pub fn what(&self) -> &'static str {
        match self {
            LoadRequest::Repo { .. } => "repository",
            LoadRequest::Directory { .. } => "directory",
            LoadRequest::File { .. } => "file",
        }
    }
}

/// A load that has been issued a token and waits to be run
#[derive(Debug, Clone)]
pub struct PendingLoad {
    pub token: u64,
    pub request: LoadRequest,
}

#[derive(Debug, Clone)]
pub enum Loaded {
    Repo {
        owner: String,
        name: String,
        info: RepoInfo,
        listing: Vec<DirEntry>,
    },
    Directory {
        path: String,
        listing: Vec<DirEntry>,
    },
    File {
        path: String,
        content: FileContent,
    },
}

#[derive(Debug)]
pub struct LoadOutcome {
    pub token: u64,
    pub request: LoadRequest,
    pub result: FetchResult<Loaded>,
}

#[derive(Debug)]
pub enum Applied {
    Committed,
    /// A newer load for the same slot was issued; the outcome was dropped
    Stale,
    Failed(FetchError),
}

impl PendingLoad {
    /// Perform the host calls for this request. Runs on a worker thread.
    pub fn run(&self, host: &dyn RepoHost) -> LoadOutcome {
        let result = match &self.request {
            LoadRequest::Repo { owner, name } => {
                host.repo_info(owner, name.as_deref()).and_then(|info| {
                    let name = name.clone().unwrap_or_else(|| info.name.clone());
                    let listing = host.list_directory(owner, &name, "")?;
                    Ok(Loaded::Repo {
                        owner: owner.clone(),
                        name,
                        info,
                        listing,
                    })
                })
            }
            LoadRequest::Directory { owner, name, path } => host
                .list_directory(owner, name, path)
                .map(|listing| Loaded::Directory {
                    path: path.clone(),
                    listing,
                }),
            LoadRequest::File { owner, name, path } => {
                host.file_content(owner, name, path).map(|content| Loaded::File {
                    path: path.clone(),
                    content,
                })
            }
        };
        LoadOutcome {
            token: self.token,
            request: self.request.clone(),
            result,
        }
    }
}

// ── State ──

#[derive(Debug, Clone)]
pub struct OpenFile {
    pub path: String,
    pub content: FileContent,
    pub body: FileBody,
}

/// One breadcrumb: label and the directory path it leads to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    pub label: String,
    pub path: String,
}

/// Shared navigation state. Fields are only changed through the load
/// operations, and a load only commits if it is the latest for its slot.
#[derive(Debug, Default)]
pub struct Navigator {
    repo: Option<RepoInfo>,
    owner: String,
    name: String,
    listing: Vec<DirEntry>,
    path: String,
    file: Option<OpenFile>,
    next_token: u64,
    listing_token: Option<u64>,
    file_token: Option<u64>,
    listing_loading: bool,
    file_loading: bool,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Accessors ──

    pub fn repo(&self) -> Option<&RepoInfo> {
        self.repo.as_ref()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn listing(&self) -> &[DirEntry] {
        &self.listing
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn file(&self) -> Option<&OpenFile> {
        self.file.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.listing_loading || self.file_loading
    }

    pub fn listing_loading(&self) -> bool {
        self.listing_loading
    }

    pub fn file_loading(&self) -> bool {
        self.file_loading
    }

    pub fn at_root(&self) -> bool {
        self.path.is_empty()
    }

    // ── Issuing loads ──

    fn issue(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    /// Listing loads also supersede any file load, since committing them
    /// clears the opened file.
    fn begin_listing(&mut self, request: LoadRequest) -> PendingLoad {
        let token = self.issue();
        self.listing_token = Some(token);
        self.file_token = Some(token);
        self.listing_loading = true;
        self.file_loading = false;
        PendingLoad { token, request }
    }

    pub fn begin_repo(&mut self, owner: &str, name: Option<&str>) -> PendingLoad {
        self.begin_listing(LoadRequest::Repo {
            owner: owner.trim().to_string(),
            name: name.map(|n| n.trim().to_string()),
        })
    }

    /// `None` when no repository is loaded
    pub fn begin_directory(&mut self, path: &str) -> Option<PendingLoad> {
        self.repo.as_ref()?;
        let request = LoadRequest::Directory {
            owner: self.owner.clone(),
            name: self.name.clone(),
            path: path.to_string(),
        };
        Some(self.begin_listing(request))
    }

    /// Opening a file does not move `path`: the tree keeps showing the
    /// directory the file was picked from. `None` when no repository is
    /// loaded.
    pub fn begin_file(&mut self, path: &str) -> Option<PendingLoad> {
        self.repo.as_ref()?;
        let token = self.issue();
        self.file_token = Some(token);
        self.file_loading = true;
        Some(PendingLoad {
            token,
            request: LoadRequest::File {
                owner: self.owner.clone(),
                name: self.name.clone(),
                path: path.to_string(),
            },
        })
    }

    /// Parent of the current directory; `None` at the root
    pub fn navigate_up(&mut self) -> Option<PendingLoad> {
        if self.at_root() {
            return None;
        }
        let parent = parent_path(&self.path).to_string();
        self.begin_directory(&parent)
    }

    /// Forget the loaded repository. Loads still in flight become stale.
    pub fn close(&mut self) {
        let next_token = self.next_token;
        *self = Self {
            next_token,
            ..Self::default()
        };
    }

    // ── Committing ──

    pub fn apply(&mut self, outcome: LoadOutcome) -> Applied {
        let slot = outcome.request.slot();
        let latest = match slot {
            Slot::Listing => self.listing_token,
            Slot::File => self.file_token,
        };
        if latest != Some(outcome.token) {
            tracing::debug!(token = outcome.token, ?latest, ?slot, "stale load dropped");
            return Applied::Stale;
        }
        match slot {
            Slot::Listing => self.listing_loading = false,
            Slot::File => self.file_loading = false,
        }

        let loaded = match outcome.result {
            Ok(loaded) => loaded,
            Err(e) => return Applied::Failed(e),
        };
        match loaded {
            Loaded::Repo {
                owner,
                name,
                info,
                listing,
            } => {
                tracing::info!(repo = %format!("{owner}/{name}"), entries = listing.len(), "repository loaded");
                self.owner = owner;
                self.name = name;
                self.repo = Some(info);
                self.listing = listing;
                self.path = String::new();
                self.file = None;
            }
            Loaded::Directory { path, listing } => {
                self.listing = listing;
                self.path = path;
                self.file = None;
            }
            // `self.path` stays on the containing directory
            Loaded::File { path, content } => {
                let body = FileBody::from_file(&content);
                self.file = Some(OpenFile {
                    path,
                    content,
                    body,
                });
            }
        }
        Applied::Committed
    }

    // ── Synchronous convenience ──

    #[cfg(test)]
    pub fn load_repo(&mut self, host: &dyn RepoHost, owner: &str, name: Option<&str>) -> Applied {
        let pending = self.begin_repo(owner, name);
        self.apply(pending.run(host))
    }

    /// `None` when no repository is loaded
    #[cfg(test)]
    pub fn load_directory(&mut self, host: &dyn RepoHost, path: &str) -> Option<Applied> {
        let pending = self.begin_directory(path)?;
        Some(self.apply(pending.run(host)))
    }

    /// `None` when no repository is loaded
    #[cfg(test)]
    pub fn load_file(&mut self, host: &dyn RepoHost, path: &str) -> Option<Applied> {
        let pending = self.begin_file(path)?;
        Some(self.apply(pending.run(host)))
    }

    // ── Derived ──

    /// Root followed by each cumulative segment of the current path
    pub fn breadcrumbs(&self) -> Vec<Crumb> {
        let mut crumbs = vec![Crumb {
            label: "Root".into(),
            path: String::new(),
        }];
        let mut acc = String::new();
        for segment in self.path.split('/').filter(|s| !s.is_empty()) {
            if !acc.is_empty() {
                acc.push('/');
            }
            acc.push_str(segment);
            crumbs.push(Crumb {
                label: segment.to_string(),
                path: acc.clone(),
            });
        }
        crumbs
    }
}

pub fn parent_path(path: &str) -> &str {
    match path.trim_end_matches('/').rsplit_once('/') {
        Some((parent, _)) => parent,
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::{EntryKind, Owner, SearchResult};
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory host keyed by path; records every call
    #[derive(Default)]
    struct FakeHost {
        dirs: HashMap<String, Vec<DirEntry>>,
        files: HashMap<String, FileContent>,
        fail: bool,
        calls: Mutex<Vec<String>>,
    }

    impl FakeHost {
        fn sample() -> Self {
            let mut host = FakeHost::default();
            host.dirs.insert(
                "".into(),
                vec![entry("src", EntryKind::Dir), entry("README.md", EntryKind::File)],
            );
            host.dirs.insert(
                "src".into(),
                vec![entry("src/main.rs", EntryKind::File), entry("src/ui", EntryKind::Dir)],
            );
            host.dirs.insert("src/ui".into(), vec![]);
            host.files.insert(
                "README.md".into(),
                FileContent {
                    name: "README.md".into(),
                    path: "README.md".into(),
                    content: Some("aGVsbG8=".into()),
                    encoding: Some("base64".into()),
                    size: 5,
                },
            );
            host
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) -> FetchResult<()> {
            self.calls.lock().unwrap().push(call);
            if self.fail {
                Err(FetchError::Http { status: 500 })
            } else {
                Ok(())
            }
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
            let Some(name) = name else {
                return Err(FetchError::InvalidInput("missing repository name".into()));
            };
            self.record(format!("repo {owner}/{name}"))?;
            Ok(RepoInfo {
                name: name.to_string(),
                full_name: format!("{owner}/{name}"),
                owner: Owner {
                    login: owner.to_string(),
                    ..Default::default()
                },
                ..Default::default()
            })
        }

        fn list_directory(&self, _owner: &str, _name: &str, path: &str) -> FetchResult<Vec<DirEntry>> {
            self.record(format!("dir {path}"))?;
            self.dirs.get(path).cloned().ok_or(FetchError::Http { status: 404 })
        }

        fn file_content(&self, _owner: &str, _name: &str, path: &str) -> FetchResult<FileContent> {
            self.record(format!("file {path}"))?;
            self.files.get(path).cloned().ok_or(FetchError::Http { status: 404 })
        }

        fn search_repositories(&self, _query: &str) -> FetchResult<SearchResult> {
            Ok(SearchResult::default())
        }

        fn user_repositories(&self, _username: &str) -> FetchResult<Vec<RepoInfo>> {
            Ok(Vec::new())
        }
    }

    fn loaded(host: &FakeHost) -> Navigator {
        let mut nav = Navigator::new();
        assert!(matches!(nav.load_repo(host, "octocat", Some("Hello-World")), Applied::Committed));
        nav
    }

    #[test]
    fn load_repo_sets_root_listing() {
        let host = FakeHost::sample();
        let nav = loaded(&host);
        assert_eq!(nav.owner(), "octocat");
        assert_eq!(nav.name(), "Hello-World");
        assert_eq!(nav.repo().unwrap().slug(), "octocat/Hello-World");
        assert_eq!(nav.path(), "");
        assert_eq!(nav.listing().len(), 2);
        assert!(!nav.is_loading());
    }

    #[test]
    fn load_repo_resets_path_and_file() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        nav.load_directory(&host, "src").unwrap();
        nav.load_file(&host, "README.md").unwrap();
        assert_eq!(nav.path(), "src");
        assert!(nav.file().is_some());

        nav.load_repo(&host, "octocat", Some("Hello-World"));
        assert_eq!(nav.path(), "");
        assert!(nav.file().is_none());
    }

    #[test]
    fn directory_and_file_need_a_repo() {
        let host = FakeHost::sample();
        let mut nav = Navigator::new();
        assert!(nav.load_directory(&host, "src").is_none());
        assert!(nav.load_file(&host, "README.md").is_none());
        assert!(host.calls().is_empty());
    }

    #[test]
    fn file_load_keeps_directory() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        nav.load_directory(&host, "src").unwrap();
        nav.load_file(&host, "README.md").unwrap();
        assert_eq!(nav.path(), "src");
        let file = nav.file().unwrap();
        assert_eq!(file.path, "README.md");
        assert_eq!(file.body, FileBody::Text("hello".into()));
    }

    #[test]
    fn directory_load_clears_file() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        nav.load_file(&host, "README.md").unwrap();
        nav.load_directory(&host, "src").unwrap();
        assert!(nav.file().is_none());
    }

    #[test]
    fn failure_leaves_state_untouched() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        nav.load_directory(&host, "src").unwrap();

        let failing = FakeHost {
            fail: true,
            ..FakeHost::sample()
        };
        let applied = nav.load_repo(&failing, "other", Some("repo"));
        assert!(matches!(applied, Applied::Failed(FetchError::Http { status: 500 })));
        assert_eq!(nav.owner(), "octocat");
        assert_eq!(nav.path(), "src");
        assert!(!nav.is_loading());

        let applied = nav.load_directory(&host, "missing").unwrap();
        assert!(matches!(applied, Applied::Failed(_)));
        assert_eq!(nav.path(), "src");
    }

    #[test]
    fn missing_repo_name_fails_without_network() {
        let host = FakeHost::sample();
        let mut nav = Navigator::new();
        let applied = nav.load_repo(&host, "octocat", None);
        assert!(matches!(applied, Applied::Failed(FetchError::InvalidInput(_))));
        assert!(host.calls().is_empty());
        assert!(nav.repo().is_none());
    }

    #[test]
    fn stale_directory_outcome_is_dropped() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        let first = nav.begin_directory("src").unwrap();
        let second = nav.begin_directory("src/ui").unwrap();
        assert!(nav.is_loading());

        // later request finishes first
        assert!(matches!(nav.apply(second.run(&host)), Applied::Committed));
        assert!(matches!(nav.apply(first.run(&host)), Applied::Stale));
        assert_eq!(nav.path(), "src/ui");
        assert!(!nav.is_loading());
    }

    #[test]
    fn file_outcome_is_dropped_after_directory_change() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        let file = nav.begin_file("README.md").unwrap();
        nav.load_directory(&host, "src").unwrap();

        assert!(matches!(nav.apply(file.run(&host)), Applied::Stale));
        assert!(nav.file().is_none());
    }

    #[test]
    fn outcomes_after_close_are_stale() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        let dir = nav.begin_directory("src").unwrap();
        nav.close();
        assert!(matches!(nav.apply(dir.run(&host)), Applied::Stale));
        assert!(nav.repo().is_none());

        // tokens keep increasing after close
        let next = nav.begin_repo("octocat", Some("Hello-World"));
        assert!(next.token > dir.token);
    }

    #[test]
    fn navigate_up_walks_to_root() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        nav.load_directory(&host, "src/ui").unwrap();

        let up = nav.navigate_up().unwrap();
        nav.apply(up.run(&host));
        assert_eq!(nav.path(), "src");
        let up = nav.navigate_up().unwrap();
        nav.apply(up.run(&host));
        assert_eq!(nav.path(), "");
        assert!(nav.navigate_up().is_none());
    }

    #[test]
    fn breadcrumbs_accumulate_segments() {
        let host = FakeHost::sample();
        let mut nav = loaded(&host);
        assert_eq!(nav.breadcrumbs().len(), 1);
        nav.load_directory(&host, "src/ui").unwrap();
        let crumbs = nav.breadcrumbs();
        let paths: Vec<&str> = crumbs.iter().map(|c| c.path.as_str()).collect();
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(paths, ["", "src", "src/ui"]);
        assert_eq!(labels, ["Root", "src", "ui"]);
    }

    #[test]
    fn parent_of_paths() {
        assert_eq!(parent_path("a/b/c"), "a/b");
        assert_eq!(parent_path("a"), "");
        assert_eq!(parent_path(""), "");
    }
}
