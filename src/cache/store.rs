//! Bounded in-memory store of upstream responses.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::body::Bytes;
use axum::http::{HeaderMap, StatusCode};
use dashmap::DashMap;
use hyper::ext::ReasonPhrase;

use crate::config::EdgeCacheConfig;

/// A fully buffered upstream response.
#[derive(Debug, Clone)]
pub struct CachedResponse {
    pub status: StatusCode,
    pub reason: Option<ReasonPhrase>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug)]
struct Entry {
    response: Arc<CachedResponse>,
    expires_at: Instant,
}

impl Entry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at <= now
    }
}

/// Thread-safe TTL cache keyed by target URL.
#[derive(Debug)]
pub struct EdgeCache {
    entries: DashMap<String, Entry>,
    max_entries: usize,
    max_entry_bytes: usize,
}

impl EdgeCache {
    /// Create an empty cache with the configured bounds.
    pub fn new(config: &EdgeCacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries: config.max_entries,
            max_entry_bytes: config.max_entry_bytes,
        }
    }

    /// Largest body that will be stored.
    pub fn max_entry_bytes(&self) -> usize {
        self.max_entry_bytes
    }

    /// Look up a live entry, evicting it if it has expired.
    pub fn get(&self, key: &str) -> Option<Arc<CachedResponse>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Some(entry.response.clone());
            }
        }
        // Guard above is dropped before removal
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        None
    }

    /// Store a response for `ttl`.
    ///
    /// Returns `false` when the body is too large, the ttl overflows the
    /// clock, or the cache is still full after dropping expired entries.
    pub fn insert(&self, key: String, response: CachedResponse, ttl: Duration) -> bool {
        if response.body.len() > self.max_entry_bytes {
            return false;
        }

        // A ttl past the end of the clock's range cannot be represented
        let Some(expires_at) = Instant::now().checked_add(ttl) else {
            tracing::debug!(key = %key, ttl_secs = ttl.as_secs(), "Edge cache ttl out of range, skipping insert");
            return false;
        };

        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.purge_expired();
            if self.entries.len() >= self.max_entries {
                tracing::debug!(key = %key, "Edge cache full, skipping insert");
                return false;
            }
        }

        self.entries.insert(
            key,
            Entry {
                response: Arc::new(response),
                expires_at,
            },
        );
        true
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        before.saturating_sub(self.entries.len())
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
