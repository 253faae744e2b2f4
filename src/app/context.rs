use std::path::PathBuf;
use std::sync::Arc;

use url::Url;

use crate::app::error::{Result, StreamletError};
use crate::cache::FeedCache;
use crate::config::Config;
use crate::domain::{Feed, FetchedFeed, ReadState};
use crate::fetcher::{Aggregator, FeedFetcher, Fetcher, HttpFetcher};
use crate::library::{ReadStateTracker, Subscriptions};
use crate::normalizer::Normalizer;
use crate::recommended::RecommendedFeeds;
use crate::store::{KeyValueStore, MemoryStore, SqliteStore};
use crate::timeline::{ReadFilter, Timeline};

/// Everything the presentation layer talks to.
pub struct AppContext {
    pub store: Arc<dyn KeyValueStore>,
    pub feed_fetcher: Arc<FeedFetcher>,
    pub aggregator: Aggregator,
    pub subscriptions: Subscriptions,
    pub read_state: ReadStateTracker,
    pub recommended: RecommendedFeeds,
}

impl AppContext {
    pub fn new(config: &Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => Self::default_db_path()?,
        };

        let store: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(&db_path)?);
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::with_options(
            config.fetch.timeout(),
            &config.fetch.user_agent,
        )?);

        Ok(Self::with_components(store, fetcher, config))
    }

    /// Context over an in-memory store; nothing survives the process.
    pub fn in_memory(fetcher: Arc<dyn Fetcher + Send + Sync>) -> Self {
        Self::with_components(Arc::new(MemoryStore::new()), fetcher, &Config::default())
    }

    pub fn with_components(
        store: Arc<dyn KeyValueStore>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        config: &Config,
    ) -> Self {
        let cache = FeedCache::new(store.clone());
        let feed_fetcher = Arc::new(FeedFetcher::with_freshness(
            fetcher.clone(),
            Normalizer::new(),
            cache.clone(),
            config.cache.freshness(),
        ));

        Self {
            aggregator: Aggregator::new(feed_fetcher.clone()),
            subscriptions: Subscriptions::new(store.clone(), cache),
            read_state: ReadStateTracker::new(store.clone()),
            recommended: RecommendedFeeds::new(
                fetcher,
                store.clone(),
                config.recommended.config_url.clone(),
            ),
            feed_fetcher,
            store,
        }
    }

    pub async fn fetch(&self, url: &str, force_refresh: bool) -> Result<FetchedFeed> {
        self.feed_fetcher.fetch(url, force_refresh).await
    }

    /// Validates and fetches `url`, then subscribes with the metadata the
    /// feed reports about itself. Nothing is stored if the fetch fails.
    pub async fn subscribe(&self, url: &str) -> Result<(Feed, Vec<Feed>)> {
        let parsed_url = Url::parse(url)?;
        if !matches!(parsed_url.scheme(), "http" | "https") {
            return Err(StreamletError::Other(format!(
                "Unsupported URL scheme: {}",
                parsed_url.scheme()
            )));
        }

        let fetched = self.fetch(url, false).await?;
        let feed = Feed::from_parsed(url, &fetched.feed);
        let feeds = self.subscriptions.add(feed.clone()).await?;
        Ok((feed, feeds))
    }

    pub async fn unsubscribe(&self, url: &str) -> Result<Vec<Feed>> {
        self.subscriptions.remove(url).await
    }

    pub async fn mark_read(&self, id: &str) -> Result<ReadState> {
        self.read_state.mark_read(id).await
    }

    /// Fetches every subscription and the read state side by side and
    /// combines them.
    pub async fn load_timeline(&self, force_refresh: bool, filter: ReadFilter) -> Result<Timeline> {
        let feeds = self.subscriptions.list().await?;

        let (aggregation, read_state) = tokio::join!(
            self.aggregator.fetch_all_detailed(&feeds, force_refresh),
            self.read_state.get_all()
        );

        Ok(Timeline::build(feeds.len(), aggregation, &read_state?, filter))
    }

    fn default_db_path() -> Result<PathBuf> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StreamletError::Config("Could not find data directory".into()))?;
        let streamlet_dir = data_dir.join("streamlet");
        std::fs::create_dir_all(&streamlet_dir)?;
        Ok(streamlet_dir.join("streamlet.db"))
    }
}
