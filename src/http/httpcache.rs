//! HTTP Cache implementation.
//!
//! Chromium mapping: net/http/http_cache.h (simplified in-memory version)
//!
//! Entries are keyed by the raw URL string and hold the decoded body text.
//! Freshness is `max-age` only; nothing is evicted, a stale entry just stops
//! being served until a newer response overwrites it.

use crate::base::neterror::NetError;
use crate::http::response::HttpResponse;
use dashmap::DashMap;
use http::header::CACHE_CONTROL;
use http::{HeaderMap, Method, StatusCode};
use std::time::Duration;
use tokio::time::Instant;

/// Statuses whose responses may be stored.
const CACHEABLE_STATUSES: [StatusCode; 3] =
    [StatusCode::OK, StatusCode::MOVED_PERMANENTLY, StatusCode::NOT_FOUND];

/// Cached response entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Decoded body text
    pub body: String,
    /// When this entry was cached
    pub stored_at: Instant,
    /// Always set for entries created by [`HttpCache::store`].
    pub max_age: Option<Duration>,
}

impl CacheEntry {
    fn is_fresh(&self, key: &str, now: Instant) -> Result<bool, NetError> {
        let max_age =
            self.max_age.ok_or_else(|| NetError::CacheInvariantViolation(key.to_string()))?;
        Ok(now.saturating_duration_since(self.stored_at) <= max_age)
    }
}

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup {
    /// A fresh entry's body.
    Fresh(String),
    /// An entry exists but is past its max-age.
    Stale,
    Absent,
}

/// Cache mode for controlling behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    #[default]
    Normal,
    /// Bypass cache for reads and writes
    Disabled,
    /// Only read from cache, don't write
    ReadOnly,
}

/// In-memory HTTP cache. Concurrent writers to one key: last one wins.
#[derive(Debug, Default)]
pub struct HttpCache {
    entries: DashMap<String, CacheEntry>,
    mode: CacheMode,
}

impl HttpCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: CacheMode) -> Self {
        Self { entries: DashMap::new(), mode }
    }

    pub fn mode(&self) -> CacheMode {
        self.mode
    }

    /// Look up the entry for `key` and check its freshness.
    pub fn lookup(&self, key: &str) -> Result<CacheLookup, NetError> {
        if self.mode == CacheMode::Disabled {
            return Ok(CacheLookup::Absent);
        }

        let Some(entry) = self.entries.get(key) else {
            tracing::trace!(key, "cache miss");
            return Ok(CacheLookup::Absent);
        };

        if entry.is_fresh(key, Instant::now())? {
            tracing::debug!(key, "cache hit");
            Ok(CacheLookup::Fresh(entry.body.clone()))
        } else {
            tracing::debug!(key, "cache entry stale");
            Ok(CacheLookup::Stale)
        }
    }

    /// Store a terminal response if its status, method and `Cache-Control`
    /// allow it. Returns whether an entry was written.
    pub fn store(&self, key: &str, method: &Method, response: &HttpResponse, body: &str) -> bool {
        if matches!(self.mode, CacheMode::Disabled | CacheMode::ReadOnly) {
            return false;
        }

        let Some(value) = response.headers().get(CACHE_CONTROL) else {
            return false;
        };

        if *method != Method::GET || !CACHEABLE_STATUSES.contains(&response.status()) {
            return false;
        }

        let Some(max_age) = value.to_str().ok().and_then(|v| parse_cache_control(v).max_age())
        else {
            tracing::trace!(key, "response not cacheable");
            return false;
        };

        self.insert(
            key,
            CacheEntry {
                status: response.status(),
                headers: response.headers().clone(),
                body: body.to_string(),
                stored_at: Instant::now(),
                max_age: Some(max_age),
            },
        );
        tracing::debug!(key, max_age = max_age.as_secs(), "stored response in cache");
        true
    }

    /// Insert or overwrite an entry directly.
    pub fn insert(&self, key: &str, entry: CacheEntry) {
        self.entries.insert(key.to_string(), entry);
    }

    /// Clear all cached entries.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parsed Cache-Control directive.
#[derive(Debug, Default, PartialEq, Eq)]
struct CacheControl {
    no_store: bool,
    max_age: Option<u64>,
    /// A directive other than max-age or no-store was present.
    unrecognized: bool,
}

impl CacheControl {
    /// The storage lifetime, if the directives permit storing at all.
    fn max_age(&self) -> Option<Duration> {
        if self.no_store || self.unrecognized {
            return None;
        }
        self.max_age.map(Duration::from_secs)
    }
}

/// Parse a Cache-Control header value.
fn parse_cache_control(value: &str) -> CacheControl {
    let mut cc = CacheControl::default();

    for directive in value.split(',') {
        let (name, arg) = match directive.split_once('=') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (directive.trim(), None),
        };

        if name.eq_ignore_ascii_case("no-store") {
            cc.no_store = true;
        } else if name.eq_ignore_ascii_case("max-age") {
            // A missing or non-integer age leaves max_age unset.
            cc.max_age = arg.and_then(|a| a.parse::<u64>().ok());
        } else {
            cc.unrecognized = true;
        }
    }

    cc
}
