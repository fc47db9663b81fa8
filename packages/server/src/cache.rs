//! Short-lived cache of upstream response bodies, keyed by the inbound request.
//!
//! Keys are built only from the path and the query parameters an endpoint
//! declares, and expired entries are swept whenever a new body is stored, so
//! the map never holds more than the live responses.

use std::future::Future;
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::{debug, trace};

#[derive(Clone, Debug)]
pub struct CachedResponse {
    pub body: Bytes,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl CachedResponse {
    fn is_fresh(&self) -> bool {
        self.fetched_at.elapsed() < self.ttl
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

pub struct ResponseCache {
    entries: DashMap<String, CachedResponse>,
    enabled: bool,
}

impl ResponseCache {
    pub fn new(enabled: bool) -> Self {
        Self {
            entries: DashMap::new(),
            enabled,
        }
    }

    /// Build a cache key from a request path and the endpoint's own parameters.
    ///
    /// The path is lower-cased with any trailing slash removed; parameters are
    /// sorted so their order does not matter. Anything else the client put in
    /// the query string never reaches the key.
    pub fn key(path: &str, params: &[(&str, &str)]) -> String {
        let path = path.trim_end_matches('/').to_ascii_lowercase();
        let mut pairs: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort_unstable();

        if pairs.is_empty() {
            path
        } else {
            format!("{}?{}", path, pairs.join("&"))
        }
    }

    pub fn get_fresh(&self, key: &str) -> Option<Bytes> {
        if !self.enabled {
            return None;
        }
        self.entries
            .get(key)
            .filter(|entry| entry.is_fresh())
            .map(|entry| entry.body.clone())
    }

    /// Store `body` under `key` for `ttl`, dropping every entry that has expired.
    pub fn insert(&self, key: String, body: Bytes, ttl: Duration) {
        if !self.enabled {
            return;
        }
        self.purge_expired();
        self.entries.insert(
            key,
            CachedResponse {
                body,
                fetched_at: Instant::now(),
                ttl,
            },
        );
    }

    pub fn purge_expired(&self) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh());
        let purged = before.saturating_sub(self.entries.len());
        if purged > 0 {
            trace!(purged, "Purged expired cache entries");
        }
    }

    /// Serve `key` from the cache while younger than `ttl`, otherwise run
    /// `fetch` and store its body. Failed fetches are not cached.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: String,
        ttl: Duration,
        fetch: F,
    ) -> Result<(Bytes, CacheStatus), E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Bytes, E>>,
    {
        if let Some(body) = self.get_fresh(&key) {
            trace!(key, "Response cache hit");
            return Ok((body, CacheStatus::Hit));
        }

        debug!(key, "Response cache miss");
        let body = fetch().await?;
        self.insert(key, body.clone(), ttl);
        Ok((body, CacheStatus::Miss))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
