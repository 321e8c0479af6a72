mod cache;
mod client;

pub use cache::ResponseCache;
pub use client::GitHubClient;

use crate::error::FetchResult;
use serde::Deserialize;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

// ── API types ──

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Owner {
    pub login: String,
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub html_url: String,
}

/// Repository metadata (`GET /repos/{owner}/{repo}`); also the item type of
/// search results and user repository listings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RepoInfo {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub owner: Owner,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub default_branch: String,
}

impl RepoInfo {
    /// `owner/name`, falling back to the parts when `full_name` is absent
    pub fn slug(&self) -> String {
        if self.full_name.is_empty() {
            format!("{}/{}", self.owner.login, self.name)
        } else {
            self.full_name.clone()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Dir,
    File,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DirEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: u64,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// A single file from the contents endpoint. `content` is base64 with
/// embedded newlines.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileContent {
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SearchResult {
    pub total_count: u64,
    #[serde(default)]
    pub items: Vec<RepoInfo>,
}

// ── Host seam ──

/// The remote repository host. `GitHubClient` is the real implementation;
/// tests substitute in-memory fakes.
pub trait RepoHost: Send + Sync {
    fn repo_info(&self, owner: &str, name: Option<&str>) -> FetchResult<RepoInfo>;
    fn list_directory(&self, owner: &str, name: &str, path: &str) -> FetchResult<Vec<DirEntry>>;
    fn file_content(&self, owner: &str, name: &str, path: &str) -> FetchResult<FileContent>;
    fn search_repositories(&self, query: &str) -> FetchResult<SearchResult>;
    fn user_repositories(&self, username: &str) -> FetchResult<Vec<RepoInfo>>;
}

// ── Input parsing ──

/// A fully specified repository reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Parse a repository link: `owner/name`, optionally written as a github.com
/// URL. Anything that does not split into exactly two parts is rejected.
pub fn parse_repo_link(link: &str) -> Option<RepoRef> {
    let trimmed = link.trim();
    let stripped = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let stripped = stripped.strip_prefix("github.com/").unwrap_or(stripped);
    let stripped = stripped.trim_end_matches('/');
    let stripped = stripped.strip_suffix(".git").unwrap_or(stripped);

    let parts: Vec<&str> = stripped.split('/').collect();
    if parts.len() != 2 {
        return None;
    }
    Some(RepoRef {
        owner: parts[0].to_string(),
        name: parts[1].to_string(),
    })
}

/// Parse the direct-entry form. Empty input is rejected; otherwise the first
/// two `/`-separated parts become owner and (possibly missing) repository.
pub fn parse_direct_input(input: &str) -> Option<(String, Option<String>)> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let mut parts = trimmed.split('/');
    let owner = parts.next().unwrap_or_default().to_string();
    let repo = parts.next().map(str::to_string);
    Some((owner, repo))
}

// ── URL builders ──

/// `api` joined with each segment, percent-encoded so `#`, `?` and `%` in
/// owner names or paths stay inside the path.
fn api_path(api: &str, segments: &[&str]) -> String {
    let base = api.trim_end_matches('/');
    match reqwest::Url::parse(base) {
        Ok(mut url) => {
            if let Ok(mut path) = url.path_segments_mut() {
                path.pop_if_empty().extend(segments);
            }
            url.to_string()
        }
        Err(_) => format!("{base}/{}", segments.join("/")),
    }
}

pub fn repo_info_url(api: &str, owner: &str, name: &str) -> String {
    api_path(api, &["repos", owner, name])
}

/// An empty `path` addresses the repository root (`.../contents/`)
pub fn contents_url(api: &str, owner: &str, name: &str, path: &str) -> String {
    let mut segments = vec!["repos", owner, name, "contents"];
    segments.extend(path.trim_start_matches('/').split('/'));
    api_path(api, &segments)
}

pub fn user_repos_url(api: &str, username: &str) -> String {
    api_path(api, &["users", username, "repos"])
}

pub fn search_repos_url(api: &str, query: &str) -> String {
    let base = format!("{}/search/repositories", api.trim_end_matches('/'));
    match reqwest::Url::parse_with_params(&base, &[("q", query)]) {
        Ok(url) => url.to_string(),
        Err(_) => format!("{base}?q={}", query.replace(' ', "+")),
    }
}
