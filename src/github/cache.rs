use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// Revalidation windows per endpoint
pub const REPO_INFO_TTL: Duration = Duration::from_secs(60);
pub const DIRECTORY_TTL: Duration = Duration::from_secs(30);
pub const FILE_TTL: Duration = Duration::from_secs(60);
pub const SEARCH_TTL: Duration = Duration::from_secs(60);
pub const USER_REPOS_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    body: String,
    expires: Instant,
}

/// In-memory response bodies keyed by request URL. Entries are only served
/// inside their revalidation window; nothing is persisted.
#[derive(Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<String> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(url) {
            Some(entry) if entry.expires > Instant::now() => Some(entry.body.clone()),
            Some(_) => {
                entries.remove(url);
                None
            }
            None => None,
        }
    }

    /// Also drops every entry whose window has passed
    pub fn insert(&self, url: &str, body: String, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            let now = Instant::now();
            entries.retain(|_, e| e.expires > now);
            entries.insert(
                url.to_string(),
                CacheEntry {
                    body,
                    expires: now + ttl,
                },
            );
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_entries_inside_window() {
        let cache = ResponseCache::new();
        cache.insert("https://x/a", "{}".into(), Duration::from_secs(30));
        assert_eq!(cache.get("https://x/a").as_deref(), Some("{}"));
        assert_eq!(cache.get("https://x/b"), None);
    }

    #[test]
    fn expired_entries_are_evicted_on_read() {
        let cache = ResponseCache::new();
        cache.insert("u", "body".into(), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(cache.get("u"), None);
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn insert_prunes_other_expired_urls() {
        let cache = ResponseCache::new();
        cache.insert("old/a", "1".into(), Duration::from_millis(1));
        cache.insert("old/b", "2".into(), Duration::from_millis(1));
        std::thread::sleep(Duration::from_millis(5));
        cache.insert("new", "3".into(), Duration::from_secs(30));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("new").as_deref(), Some("3"));
    }

    #[test]
    fn zero_ttl_is_not_stored() {
        let cache = ResponseCache::new();
        cache.insert("u", "body".into(), Duration::ZERO);
        assert_eq!(cache.len(), 0);
    }
}
