use std::cmp::Ordering;

use crate::github::{DirEntry, RepoInfo};

// ── Ordering ──

/// Directories first, then case-insensitive name order. Names that differ
/// only by case fall back to byte order so the result is total.
pub fn entry_order(a: &DirEntry, b: &DirEntry) -> Ordering {
    b.is_dir()
        .cmp(&a.is_dir())
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        .then_with(|| a.name.cmp(&b.name))
}

fn matches_term(text: &str, term: &str) -> bool {
    text.to_lowercase().contains(term)
}

// ── Listing ──

/// Entries shown in the file tree: name contains `filter` (case-insensitive),
/// sorted with [`entry_order`].
pub fn visible_entries<'a>(entries: &'a [DirEntry], filter: &str) -> Vec<&'a DirEntry> {
    let term = filter.trim().to_lowercase();
    let mut visible: Vec<&DirEntry> = entries
        .iter()
        .filter(|e| term.is_empty() || matches_term(&e.name, &term))
        .collect();
    visible.sort_by(|a, b| entry_order(a, b));
    visible
}

// ── Repository cards ──

/// A user's repositories matching `filter` in name or description, most
/// recently updated first.
pub fn filter_user_repos<'a>(repos: &'a [RepoInfo], filter: &str) -> Vec<&'a RepoInfo> {
    let term = filter.trim().to_lowercase();
    let mut visible: Vec<&RepoInfo> = repos
        .iter()
        .filter(|r| {
            term.is_empty()
                || matches_term(&r.name, &term)
                || r.description
                    .as_deref()
                    .is_some_and(|d| matches_term(d, &term))
        })
        .collect();
    // RFC 3339 timestamps in UTC order lexically
    visible.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    visible
}
