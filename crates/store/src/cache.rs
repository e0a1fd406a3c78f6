use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use datalens_core::constants::{DEFAULT_CACHE_CAPACITY, DEFAULT_CACHE_TTL_SECS};
use datalens_core::{AskResponse, Mode, Source};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::sync::Mutex;

/// One memoized request→response mapping.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub query: String,
    pub source: Source,
    pub mode: Mode,
    pub sql: Option<String>,
    pub response: AskResponse,
    pub created_at: DateTime<Utc>,
    /// Starts at 1; incremented only on subsequent `get` hits.
    pub hits: u64,
}

impl CacheEntry {
    #[must_use]
    pub fn new(
        query: impl Into<String>,
        source: Source,
        mode: Mode,
        sql: Option<String>,
        response: AskResponse,
    ) -> Self {
        Self {
            query: query.into(),
            source,
            mode,
            sql,
            response,
            created_at: Utc::now(),
            hits: 1,
        }
    }
}

/// Aggregate cache numbers for the stats endpoint.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub total_hits: u64,
}

/// TTL-bound, capacity-bound response memo.
///
/// An entry older than the TTL is treated as absent and actively purged on
/// lookup. At capacity, the globally oldest entry by creation time is
/// evicted before insertion: oldest-created, not least-recently-used.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<AskResponse>;
    async fn put(&self, key: &str, entry: CacheEntry);
    async fn stats(&self) -> CacheStats;
}

/// Build the content-addressed cache key.
///
/// A fixed-width digest over the normalized message, source, mode, and a
/// digest of the recent conversation context. Stable across processes and
/// restarts, so the store can be externalized without invalidating keys.
/// Folding the context in makes the cache conversation-sensitive rather
/// than purely message-sensitive.
#[must_use]
pub fn cache_key(message: &str, source: Source, mode: Mode, context: &str) -> String {
    let context_digest = hex::encode(Sha256::digest(context.as_bytes()));
    let payload = format!(
        "{}|{}|{}|{}",
        message.trim().to_lowercase(),
        source.as_str(),
        mode.as_str(),
        context_digest
    );
    hex::encode(Sha256::digest(payload.as_bytes()))
}

/// The in-memory cache used by a single-process gateway.
pub struct MemoryResponseCache {
    inner: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    capacity: usize,
}

impl MemoryResponseCache {
    #[must_use]
    pub fn new(ttl_secs: u64, capacity: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX)),
            capacity: capacity.max(1),
        }
    }
}

impl Default for MemoryResponseCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_TTL_SECS, DEFAULT_CACHE_CAPACITY)
    }
}

#[async_trait]
impl ResponseCache for MemoryResponseCache {
    async fn get(&self, key: &str) -> Option<AskResponse> {
        let now = Utc::now();
        let mut entries = self.inner.lock().await;
        match entries.get_mut(key) {
            Some(entry) if now - entry.created_at < self.ttl => {
                entry.hits += 1;
                tracing::debug!(hits = entry.hits, "cache hit: {}", truncated(&entry.query));
                Some(entry.response.clone())
            },
            Some(_) => {
                // expired: purge, don't just ignore
                entries.remove(key);
                None
            },
            None => None,
        }
    }

    async fn put(&self, key: &str, entry: CacheEntry) {
        let mut entries = self.inner.lock().await;
        if entries.len() >= self.capacity && !entries.contains_key(key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.created_at)
                .map(|(k, _)| k.clone());
            if let Some(k) = oldest {
                entries.remove(&k);
            }
        }
        tracing::debug!("cache store: {}", truncated(&entry.query));
        entries.insert(key.to_owned(), entry);
    }

    async fn stats(&self) -> CacheStats {
        let entries = self.inner.lock().await;
        CacheStats {
            entries: entries.len(),
            total_hits: entries.values().map(|e| e.hits).sum(),
        }
    }
}

fn truncated(s: &str) -> &str {
    let mut end = s.len().min(50);
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use datalens_core::Reply;

    fn response(text: &str) -> AskResponse {
        AskResponse::new(Reply::text(text), None)
    }

    fn entry(text: &str) -> CacheEntry {
        CacheEntry::new(text, Source::Financial, Mode::Auto, None, response(text))
    }

    #[test]
    fn key_is_stable_and_normalized() {
        let a = cache_key("  How Many Orders  ", Source::Financial, Mode::Auto, "ctx");
        let b = cache_key("how many orders", Source::Financial, Mode::Auto, "ctx");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn key_varies_with_each_component() {
        let base = cache_key("q", Source::Financial, Mode::Auto, "ctx");
        assert_ne!(base, cache_key("q2", Source::Financial, Mode::Auto, "ctx"));
        assert_ne!(base, cache_key("q", Source::Devices, Mode::Auto, "ctx"));
        assert_ne!(base, cache_key("q", Source::Financial, Mode::Table, "ctx"));
        assert_ne!(base, cache_key("q", Source::Financial, Mode::Auto, "other"));
    }

    #[tokio::test]
    async fn get_returns_what_put_stored() {
        let cache = MemoryResponseCache::default();
        cache.put("k", entry("forty-two")).await;
        assert_eq!(cache.get("k").await, Some(response("forty-two")));
        assert_eq!(cache.get("missing").await, None);
    }

    #[tokio::test]
    async fn expired_entries_are_purged_on_lookup() {
        let cache = MemoryResponseCache::new(3600, 10);
        cache.put("k", entry("stale")).await;
        {
            let mut entries = cache.inner.lock().await;
            let e = entries.get_mut("k").unwrap();
            // just inside the TTL: still a hit
            e.created_at = Utc::now() - Duration::seconds(3599);
        }
        assert!(cache.get("k").await.is_some());
        {
            let mut entries = cache.inner.lock().await;
            let e = entries.get_mut("k").unwrap();
            // just past the TTL: absent, and physically removed
            e.created_at = Utc::now() - Duration::seconds(3601);
        }
        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.inner.lock().await.len(), 0);
    }

    #[tokio::test]
    async fn capacity_evicts_the_globally_oldest() {
        let cache = MemoryResponseCache::new(3600, 3);
        for (i, key) in ["a", "b", "c"].into_iter().enumerate() {
            let mut e = entry(key);
            e.created_at = Utc::now() - Duration::seconds(100 - i64::try_from(i).unwrap());
            cache.put(key, e).await;
        }
        cache.put("d", entry("d")).await;

        let entries = cache.inner.lock().await;
        assert_eq!(entries.len(), 3);
        assert!(!entries.contains_key("a"), "oldest-by-creation entry must go");
        assert!(entries.contains_key("d"));
    }

    #[tokio::test]
    async fn hit_counter_starts_at_one_and_grows_on_hits() {
        let cache = MemoryResponseCache::default();
        cache.put("k", entry("x")).await;
        assert_eq!(cache.inner.lock().await.get("k").unwrap().hits, 1);
        let _ = cache.get("k").await;
        let _ = cache.get("k").await;
        assert_eq!(cache.inner.lock().await.get("k").unwrap().hits, 3);
        assert_eq!(cache.stats().await.total_hits, 3);
    }
}
