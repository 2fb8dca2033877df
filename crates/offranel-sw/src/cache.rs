//! Cache stores.
//!
//! A [`Cache`] is one named URL → response store; [`CacheStorage`] holds all
//! stores by name. Entries are write-once: install populates a freshly
//! staged store and commits it in a single [`CacheStorage::replace`], so a
//! partial precache is never observable.

use bytes::Bytes;
use hashbrown::HashMap;

use crate::fetch::FetchResponse;

/// A cached request/response pair.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Request URL as stored.
    pub url: String,

    /// Response status.
    pub status: u16,

    /// Response headers.
    pub headers: HashMap<String, String>,

    /// Response body.
    pub body: Bytes,

    /// Cached at timestamp (ms since epoch).
    pub cached_at: u64,
}

impl CacheEntry {
    /// Build an entry from a network response.
    pub fn from_response(url: &str, response: &FetchResponse) -> Self {
        Self {
            url: url.to_string(),
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            cached_at: now_millis(),
        }
    }
}

fn now_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Strip the fragment before keying; two URLs differing only by fragment
/// refer to the same resource.
fn cache_key(url: &str) -> &str {
    url.split_once('#').map(|(before, _)| before).unwrap_or(url)
}

/// One named cache store.
#[derive(Debug, Clone, Default)]
pub struct Cache {
    name: String,
    entries: HashMap<String, CacheEntry>,
}

impl Cache {
    /// Create an empty cache store.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Get the store name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Look up an entry by URL.
    pub fn match_url(&self, url: &str) -> Option<&CacheEntry> {
        self.entries.get(cache_key(url))
    }

    /// Insert an entry, replacing any previous one for the same URL.
    pub fn put(&mut self, entry: CacheEntry) {
        self.entries.insert(cache_key(&entry.url).to_string(), entry);
    }

    /// Remove an entry. Returns whether one existed.
    pub fn delete_url(&mut self, url: &str) -> bool {
        self.entries.remove(cache_key(url)).is_some()
    }

    /// All stored URLs.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// All cache stores, by name.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: HashMap<String, Cache>,
}

impl CacheStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a store, creating it when absent.
    pub fn open(&mut self, name: &str) -> &mut Cache {
        self.caches
            .entry(name.to_string())
            .or_insert_with(|| Cache::new(name))
    }

    /// Commit a fully staged store, replacing any store of the same name.
    pub fn replace(&mut self, cache: Cache) {
        self.caches.insert(cache.name().to_string(), cache);
    }

    /// Whether a store with this name exists.
    pub fn has(&self, name: &str) -> bool {
        self.caches.contains_key(name)
    }

    /// Delete a store. Returns whether one existed.
    pub fn delete(&mut self, name: &str) -> bool {
        self.caches.remove(name).is_some()
    }

    /// All store names.
    pub fn keys(&self) -> Vec<&str> {
        self.caches.keys().map(|s| s.as_str()).collect()
    }

    /// Delete every store except `keep`, returning the deleted names.
    pub fn retain_only(&mut self, keep: &str) -> Vec<String> {
        let stale: Vec<String> = self
            .caches
            .keys()
            .filter(|name| name.as_str() != keep)
            .cloned()
            .collect();
        for name in &stale {
            self.caches.remove(name);
        }
        stale
    }

    /// Get a store by name.
    pub fn get(&self, name: &str) -> Option<&Cache> {
        self.caches.get(name)
    }

    /// Look up a URL in a named store.
    pub fn match_in(&self, name: &str, url: &str) -> Option<&CacheEntry> {
        self.caches.get(name)?.match_url(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(url: &str, body: &str) -> CacheEntry {
        CacheEntry {
            url: url.to_string(),
            status: 200,
            headers: HashMap::new(),
            body: Bytes::copy_from_slice(body.as_bytes()),
            cached_at: 0,
        }
    }

    #[test]
    fn test_put_and_match() {
        let mut cache = Cache::new("offranel-cache-v1");
        cache.put(entry("/static/css/style.css", "body{}"));

        let hit = cache.match_url("/static/css/style.css");
        assert!(hit.is_some());
        assert_eq!(hit.map(|e| e.status), Some(200));
        assert!(cache.match_url("/static/js/app.js").is_none());
    }

    #[test]
    fn test_fragment_is_ignored() {
        let mut cache = Cache::new("v1");
        cache.put(entry("/", "<html>"));

        assert!(cache.match_url("/#top").is_some());
    }

    #[test]
    fn test_put_replaces_same_url() {
        let mut cache = Cache::new("v1");
        cache.put(entry("/", "old"));
        cache.put(entry("/", "new"));

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.match_url("/").map(|e| e.body.clone()),
            Some(Bytes::from_static(b"new"))
        );
    }

    #[test]
    fn test_delete_url() {
        let mut cache = Cache::new("v1");
        cache.put(entry("/", "x"));

        assert!(cache.delete_url("/"));
        assert!(!cache.delete_url("/"));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_storage_open_and_delete() {
        let mut storage = CacheStorage::new();
        assert!(!storage.has("v1"));

        storage.open("v1").put(entry("/", "x"));
        assert!(storage.has("v1"));
        assert!(storage.match_in("v1", "/").is_some());

        assert!(storage.delete("v1"));
        assert!(!storage.has("v1"));
    }

    #[test]
    fn test_replace_commits_whole_store() {
        let mut storage = CacheStorage::new();
        storage.open("v1").put(entry("/old", "x"));

        let mut staged = Cache::new("v1");
        staged.put(entry("/", "a"));
        staged.put(entry("/static/css/style.css", "b"));
        storage.replace(staged);

        assert!(storage.match_in("v1", "/old").is_none());
        assert!(storage.match_in("v1", "/").is_some());
        assert!(storage.match_in("v1", "/static/css/style.css").is_some());
    }

    #[test]
    fn test_retain_only_removes_stale_stores() {
        let mut storage = CacheStorage::new();
        storage.open("offranel-cache-v0");
        storage.open("offranel-cache-v1");
        storage.open("something-else");

        let mut deleted = storage.retain_only("offranel-cache-v1");
        deleted.sort();

        assert_eq!(deleted, vec!["offranel-cache-v0", "something-else"]);
        assert_eq!(storage.keys(), vec!["offranel-cache-v1"]);
    }
}
