//! Bounded LRU memo of search results.

use crate::index::ParsedQuery;
use crate::models::{SearchFilters, SearchResult};
use lru::LruCache;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

/// Deterministic key for a (query, filters) pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build a key from the normalized query and the sorted filter selections.
    pub fn new(query: &ParsedQuery, filters: &SearchFilters) -> Self {
        Self(format!("q={}|{}", query.normalized(), filters.fingerprint()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CacheKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A cached result with access bookkeeping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub result: Arc<SearchResult>,
    /// When the entry was cached.
    pub inserted_at: Instant,
    /// When the entry was last returned by `get`.
    pub last_accessed: Instant,
}

/// Cache counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
}

/// Result cache with strict least-recently-used eviction and optional max age.
pub struct ResultCache {
    entries: LruCache<String, CacheEntry>,
    max_age: Option<Duration>,
    hits: u64,
    misses: u64,
    evictions: u64,
    expirations: u64,
}

impl ResultCache {
    /// Create a cache holding at most `capacity` results (minimum 1).
    pub fn new(capacity: usize, max_age: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            max_age,
            hits: 0,
            misses: 0,
            evictions: 0,
            expirations: 0,
        }
    }

    /// Look up a result, marking it most recently used.
    ///
    /// Entries older than the configured max age are dropped and reported as a miss.
    pub fn get(&mut self, key: &CacheKey) -> Option<Arc<SearchResult>> {
        let now = Instant::now();

        let expired = match self.entries.peek(key.as_str()) {
            Some(entry) => self.is_expired(entry, now),
            None => {
                self.misses += 1;
                return None;
            }
        };

        if expired {
            self.entries.pop(key.as_str());
            self.expirations += 1;
            self.misses += 1;
            debug!("Cache entry expired: {}", key);
            return None;
        }

        let entry = self.entries.get_mut(key.as_str())?;
        entry.last_accessed = now;
        self.hits += 1;
        Some(Arc::clone(&entry.result))
    }

    /// Store a result. Returns the key evicted to make room, if any.
    pub fn put(&mut self, key: CacheKey, result: Arc<SearchResult>) -> Option<CacheKey> {
        let now = Instant::now();
        let entry = CacheEntry {
            result,
            inserted_at: now,
            last_accessed: now,
        };

        let CacheKey(raw) = key;
        match self.entries.push(raw.clone(), entry) {
            Some((evicted, _)) if evicted != raw => {
                self.evictions += 1;
                debug!("Evicted least recently used cache entry: {}", evicted);
                Some(CacheKey(evicted))
            }
            _ => None,
        }
    }

    /// Whether `key` is cached, without touching recency or expiry.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains(key.as_str())
    }

    /// Read an entry's bookkeeping without touching recency.
    pub fn peek_entry(&self, key: &CacheKey) -> Option<&CacheEntry> {
        self.entries.peek(key.as_str())
    }

    pub fn remove(&mut self, key: &CacheKey) -> bool {
        self.entries.pop(key.as_str()).is_some()
    }

    /// Drop every entry. Counters are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.entries.cap().get()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            capacity: self.capacity(),
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            expirations: self.expirations,
        }
    }

    fn is_expired(&self, entry: &CacheEntry, now: Instant) -> bool {
        self.max_age
            .is_some_and(|max_age| now.duration_since(entry.inserted_at) > max_age)
    }
}
