use std::sync::Arc;

use crate::app::Result;
use crate::cache::FeedCache;
use crate::domain::Feed;
use crate::store::{self, KeyValueStore};

pub const FEEDS_KEY: &str = "feeds";

/// The ordered list of subscribed feeds, de-duplicated by URL.
pub struct Subscriptions {
    store: Arc<dyn KeyValueStore>,
    cache: FeedCache,
}

impl Subscriptions {
    pub fn new(store: Arc<dyn KeyValueStore>, cache: FeedCache) -> Self {
        Self { store, cache }
    }

    pub async fn list(&self) -> Result<Vec<Feed>> {
        Ok(store::load(self.store.as_ref(), FEEDS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn contains(&self, url: &str) -> Result<bool> {
        Ok(self.list().await?.iter().any(|f| f.url == url))
    }

    /// Appends `feed` unless one with the same URL is already subscribed, in
    /// which case the list is returned unchanged.
    pub async fn add(&self, feed: Feed) -> Result<Vec<Feed>> {
        let mut feeds = self.list().await?;
        if feeds.iter().any(|f| f.url == feed.url) {
            tracing::debug!("Feed already subscribed: {}", feed.url);
            return Ok(feeds);
        }

        tracing::info!("Subscribed to {}", feed.url);
        feeds.push(feed);
        store::save(self.store.as_ref(), FEEDS_KEY, &feeds).await?;
        Ok(feeds)
    }

    /// Drops the subscription for `url` together with its cache entry.
    /// Unknown URLs are a no-op.
    ///
    /// The cache entry goes first, so a failed removal leaves the subscription
    /// in place and a retry clears both.
    pub async fn remove(&self, url: &str) -> Result<Vec<Feed>> {
        let mut feeds = self.list().await?;
        let before = feeds.len();
        feeds.retain(|f| f.url != url);
        if feeds.len() == before {
            return Ok(feeds);
        }

        self.cache.remove(url).await?;
        store::save(self.store.as_ref(), FEEDS_KEY, &feeds).await?;
        tracing::info!("Unsubscribed from {}", url);
        Ok(feeds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::cache_key;
    use crate::domain::ParsedFeed;
    use crate::store::MemoryStore;

    fn setup() -> (Arc<MemoryStore>, Subscriptions) {
        let store = Arc::new(MemoryStore::new());
        let subs = Subscriptions::new(store.clone(), FeedCache::new(store.clone()));
        (store, subs)
    }

    #[tokio::test]
    async fn test_empty_list() {
        let (_, subs) = setup();
        assert!(subs.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_preserves_order_and_dedups() {
        let (_, subs) = setup();
        subs.add(Feed::new("https://a.example/rss")).await.unwrap();
        subs.add(Feed::new("https://b.example/rss")).await.unwrap();

        let mut dup = Feed::new("https://a.example/rss");
        dup.title = "Different title".into();
        let feeds = subs.add(dup).await.unwrap();

        let urls: Vec<&str> = feeds.iter().map(|f| f.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example/rss", "https://b.example/rss"]);
        assert_eq!(feeds[0].title, "");
        assert_eq!(subs.list().await.unwrap(), feeds);
    }

    #[tokio::test]
    async fn test_remove_deletes_cache_entry() {
        let (store, subs) = setup();
        let url = "https://a.example/rss";
        subs.add(Feed::new(url)).await.unwrap();
        FeedCache::new(store.clone())
            .put(url, &ParsedFeed::default())
            .await
            .unwrap();

        let feeds = subs.remove(url).await.unwrap();
        assert!(feeds.is_empty());
        assert!(!subs.contains(url).await.unwrap());
        assert!(!store.contains_key(&cache_key(url)).await);
    }

    #[tokio::test]
    async fn test_remove_unknown_is_noop() {
        let (_, subs) = setup();
        subs.add(Feed::new("https://a.example/rss")).await.unwrap();
        let feeds = subs.remove("https://missing.example/rss").await.unwrap();
        assert_eq!(feeds.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_cache_removal_keeps_subscription() {
        let (store, subs) = setup();
        let url = "https://a.example/rss";
        subs.add(Feed::new(url)).await.unwrap();
        FeedCache::new(store.clone())
            .put(url, &ParsedFeed::default())
            .await
            .unwrap();

        store.fail_removes(true);
        let err = subs.remove(url).await.unwrap_err();
        assert!(err.is_storage_failure());
        assert!(subs.contains(url).await.unwrap());
        assert!(store.contains_key(&cache_key(url)).await);

        store.fail_removes(false);
        let feeds = subs.remove(url).await.unwrap();
        assert!(feeds.is_empty());
        assert!(!store.contains_key(&cache_key(url)).await);
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let (store, subs) = setup();
        store.fail_writes(true);
        let err = subs.add(Feed::new("https://a.example/rss")).await.unwrap_err();
        assert!(err.is_storage_failure());
    }
}
