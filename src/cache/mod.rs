//! Per-feed cache of the last successful parse.
//!
//! The cache never expires anything on its own. Freshness is a read-time
//! check made by the caller: a fresh entry lets a fetch skip the network,
//! while any entry, however old, is still usable when a live fetch fails.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use crate::app::Result;
use crate::domain::{CachedFeed, ParsedFeed};
use crate::store::{self, KeyValueStore};

pub const FRESHNESS_WINDOW: Duration = Duration::from_secs(15 * 60);

const CACHE_KEY_PREFIX: &str = "rss_cache_";

pub fn cache_key(feed_url: &str) -> String {
    format!("{}{}", CACHE_KEY_PREFIX, feed_url)
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// `now - entry.timestamp < window`.
pub fn is_fresh(entry: &CachedFeed, now_ms: i64, window: Duration) -> bool {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    entry.age_ms(now_ms) < window_ms
}

#[derive(Clone)]
pub struct FeedCache {
    store: Arc<dyn KeyValueStore>,
}

impl FeedCache {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, feed_url: &str) -> Result<Option<CachedFeed>> {
        store::load(self.store.as_ref(), &cache_key(feed_url)).await
    }

    /// Overwrites the entry for `feed_url`, stamped with the current time.
    pub async fn put(&self, feed_url: &str, data: &ParsedFeed) -> Result<()> {
        self.put_at(feed_url, data, now_ms()).await
    }

    pub async fn put_at(&self, feed_url: &str, data: &ParsedFeed, timestamp: i64) -> Result<()> {
        let entry = CachedFeed {
            timestamp,
            data: data.clone(),
        };
        store::save(self.store.as_ref(), &cache_key(feed_url), &entry).await
    }

    pub async fn remove(&self, feed_url: &str) -> Result<()> {
        self.store.remove(&cache_key(feed_url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn parsed(title: &str) -> ParsedFeed {
        ParsedFeed {
            title: title.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_freshness_boundary() {
        let entry = CachedFeed {
            timestamp: 1_000_000,
            data: ParsedFeed::default(),
        };
        let window_ms = FRESHNESS_WINDOW.as_millis() as i64;

        assert!(is_fresh(&entry, 1_000_000, FRESHNESS_WINDOW));
        assert!(is_fresh(&entry, 1_000_000 + window_ms - 1, FRESHNESS_WINDOW));
        assert!(!is_fresh(&entry, 1_000_000 + window_ms, FRESHNESS_WINDOW));
        assert!(!is_fresh(&entry, 1_000_000 + 20 * 60 * 1000, FRESHNESS_WINDOW));
    }

    #[tokio::test]
    async fn test_put_overwrites_single_entry() {
        let store = Arc::new(MemoryStore::new());
        let cache = FeedCache::new(store.clone());

        cache.put_at("https://example.com/rss", &parsed("first"), 1).await.unwrap();
        cache.put_at("https://example.com/rss", &parsed("second"), 2).await.unwrap();

        let entry = cache.get("https://example.com/rss").await.unwrap().unwrap();
        assert_eq!(entry.timestamp, 2);
        assert_eq!(entry.data.title, "second");
        assert_eq!(store.keys().await, vec!["rss_cache_https://example.com/rss"]);
    }

    #[tokio::test]
    async fn test_stale_entries_are_still_returned() {
        let cache = FeedCache::new(Arc::new(MemoryStore::new()));
        let long_ago = now_ms() - 24 * 60 * 60 * 1000;
        cache.put_at("https://example.com/rss", &parsed("old"), long_ago).await.unwrap();

        let entry = cache.get("https://example.com/rss").await.unwrap().unwrap();
        assert!(!is_fresh(&entry, now_ms(), FRESHNESS_WINDOW));
        assert_eq!(entry.data.title, "old");
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = FeedCache::new(Arc::new(MemoryStore::new()));
        cache.put("https://example.com/rss", &parsed("x")).await.unwrap();
        cache.remove("https://example.com/rss").await.unwrap();
        assert!(cache.get("https://example.com/rss").await.unwrap().is_none());
    }
}
