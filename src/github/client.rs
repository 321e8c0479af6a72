use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;

use super::cache::{
    ResponseCache, DIRECTORY_TTL, FILE_TTL, REPO_INFO_TTL, SEARCH_TTL, USER_REPOS_TTL,
};
use super::{
    contents_url, repo_info_url, search_repos_url, user_repos_url, DirEntry, FileContent,
    RepoHost, RepoInfo, SearchResult,
};
use crate::error::{FetchError, FetchResult};

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";

/// Blocking GitHub REST client. Cheap to share behind an `Arc`; each call
/// runs on whichever worker thread invokes it.
pub struct GitHubClient {
    http: Client,
    api_url: String,
    token: Option<String>,
    cache: ResponseCache,
}

impl GitHubClient {
    pub fn new(api_url: &str, token: Option<String>, timeout: Duration) -> FetchResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("rx/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;
        let token = token.filter(|t| !t.trim().is_empty());
        if token.is_none() {
            tracing::info!("no GitHub token stored, using unauthenticated requests");
        }
        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token,
            cache: ResponseCache::new(),
        })
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str, ttl: Duration) -> FetchResult<T> {
        if let Some(body) = self.cache.get(url) {
            tracing::debug!(url, "cache hit");
            return Ok(serde_json::from_str(&body)?);
        }

        tracing::debug!(url, "GET");
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| {
            tracing::warn!(url, "request failed: {e}");
            FetchError::from(e)
        })?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "GitHub API error");
            return Err(FetchError::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text()?;
        let value = serde_json::from_str(&body).map_err(|e| {
            tracing::warn!(url, "unexpected response shape: {e}");
            FetchError::from(e)
        })?;
        self.cache.insert(url, body, ttl);
        Ok(value)
    }
}

fn require<'a>(value: Option<&'a str>, what: &str) -> FetchResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(FetchError::InvalidInput(format!(
            "Invalid repository format: missing {what}. Please use 'owner/repo'"
        ))),
    }
}

impl RepoHost for GitHubClient {
    fn repo_info(&self, owner: &str, name: Option<&str>) -> FetchResult<RepoInfo> {
        let owner = require(Some(owner), "owner")?;
        let name = require(name, "repository name")?;
        self.get_json(&repo_info_url(&self.api_url, owner, name), REPO_INFO_TTL)
    }

    fn list_directory(&self, owner: &str, name: &str, path: &str) -> FetchResult<Vec<DirEntry>> {
        let owner = require(Some(owner), "owner")?;
        let name = require(Some(name), "repository name")?;
        self.get_json(&contents_url(&self.api_url, owner, name, path), DIRECTORY_TTL)
    }

    fn file_content(&self, owner: &str, name: &str, path: &str) -> FetchResult<FileContent> {
        let owner = require(Some(owner), "owner")?;
        let name = require(Some(name), "repository name")?;
        self.get_json(&contents_url(&self.api_url, owner, name, path), FILE_TTL)
    }

    fn search_repositories(&self, query: &str) -> FetchResult<SearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(FetchError::InvalidInput("Please enter a search query".into()));
        }
        self.get_json(&search_repos_url(&self.api_url, query), SEARCH_TTL)
    }

    fn user_repositories(&self, username: &str) -> FetchResult<Vec<RepoInfo>> {
        let username = username.trim();
        if username.is_empty() {
            return Err(FetchError::InvalidInput("Please enter a GitHub username".into()));
        }
        self.get_json(&user_repos_url(&self.api_url, username), USER_REPOS_TTL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Unroutable address: any request that escapes local validation would
    // fail with a network error instead of InvalidInput.
    fn client() -> GitHubClient {
        GitHubClient::new("http://127.0.0.1:9", None, Duration::from_millis(200)).unwrap()
    }

    #[test]
    fn missing_repo_name_is_rejected_before_network() {
        let err = client().repo_info("octocat", None).unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));
        assert!(err.is_local());
    }

    #[test]
    fn empty_owner_is_rejected_before_network() {
        let err = client().repo_info("  ", Some("Hello-World")).unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));
        let err = client().list_directory("", "r", "").unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));
    }

    #[test]
    fn empty_search_query_is_rejected() {
        let err = client().search_repositories("   ").unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));
    }

    #[test]
    fn empty_username_is_rejected() {
        let err = client().user_repositories("").unwrap_err();
        assert!(matches!(err, FetchError::InvalidInput(_)));
    }

    #[test]
    fn blank_token_counts_as_none() {
        let c = GitHubClient::new("http://127.0.0.1:9/", Some("  ".into()), Duration::from_secs(1))
            .unwrap();
        assert!(c.token.is_none());
        assert_eq!(c.api_url, "http://127.0.0.1:9");
    }

    #[test]
    fn cached_body_is_served_without_network() {
        let c = client();
        let url = repo_info_url(&c.api_url, "octocat", "Hello-World");
        c.cache.insert(
            &url,
            r#"{"name": "Hello-World", "owner": {"login": "octocat"}}"#.into(),
            REPO_INFO_TTL,
        );
        let info = c.repo_info("octocat", Some("Hello-World")).unwrap();
        assert_eq!(info.name, "Hello-World");
    }
}
