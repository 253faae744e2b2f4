use std::sync::Arc;
use std::time::Duration;

use crate::app::{Result, StreamletError};
use crate::cache::{self, FeedCache, FRESHNESS_WINDOW};
use crate::domain::{CachedFeed, FetchedFeed, ParsedFeed};
use crate::fetcher::Fetcher;
use crate::normalizer::Normalizer;

/// Fetches one feed through the cache.
///
/// - Without `force_refresh`, a fresh cache entry is returned and the
///   network is not touched.
/// - A successful live fetch overwrites the cache entry.
/// - A network or parse failure falls back to the cache entry regardless
///   of age; only when there is none does the call fail with `Fetch`.
///   Any other error is returned as is.
pub struct FeedFetcher {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    cache: FeedCache,
    freshness: Duration,
}

impl FeedFetcher {
    pub fn new(fetcher: Arc<dyn Fetcher + Send + Sync>, normalizer: Normalizer, cache: FeedCache) -> Self {
        Self::with_freshness(fetcher, normalizer, cache, FRESHNESS_WINDOW)
    }

    pub fn with_freshness(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        normalizer: Normalizer,
        cache: FeedCache,
        freshness: Duration,
    ) -> Self {
        Self {
            fetcher,
            normalizer,
            cache,
            freshness,
        }
    }

    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    pub async fn fetch(&self, url: &str, force_refresh: bool) -> Result<FetchedFeed> {
        if !force_refresh {
            if let Some(entry) = self.cached(url).await {
                if cache::is_fresh(&entry, cache::now_ms(), self.freshness) {
                    tracing::debug!("Returning cached feed: {}", url);
                    return Ok(FetchedFeed::cached(url, entry.data, None));
                }
            }
        }

        match self.fetch_live(url).await {
            Ok(feed) => {
                if let Err(e) = self.cache.put(url, &feed).await {
                    tracing::warn!("Failed to cache feed {}: {}", url, e);
                }
                tracing::info!("Fetched {} items from {}", feed.items.len(), url);
                Ok(FetchedFeed::live(url, feed))
            }
            Err(e) if !e.is_fetch_failure() => Err(e),
            Err(e) => {
                tracing::warn!("Error fetching feed {}: {}", url, e);
                match self.cached(url).await {
                    Some(stale) => {
                        tracing::info!("Returning stale cached feed: {}", url);
                        Ok(FetchedFeed::cached(url, stale.data, Some(e.to_string())))
                    }
                    None => Err(StreamletError::Fetch {
                        url: url.to_string(),
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }

    async fn fetch_live(&self, url: &str) -> Result<ParsedFeed> {
        let body = self.fetcher.fetch(url).await?;
        self.normalizer.normalize(url, &body)
    }

    /// Cache reads never fail a fetch; a broken entry counts as a miss.
    async fn cached(&self, url: &str) -> Option<CachedFeed> {
        match self.cache.get(url).await {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Failed to read cache for {}: {}", url, e);
                None
            }
        }
    }
}
