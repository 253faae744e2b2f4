//! Recommended-feed catalog.
//!
//! Resolution order: the remote config, then a local copy of the last remote
//! config younger than 24 hours, then the built-in list.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::app::{Result, StreamletError};
use crate::cache::now_ms;
use crate::fetcher::Fetcher;
use crate::store::{self, KeyValueStore};

pub const DEFAULT_CONFIG_URL: &str =
    "https://raw.githubusercontent.com/forsignin/chrome-rss/main/public/feeds-config.json";
pub const CONFIG_CACHE_KEY: &str = "feeds_config_cache";
pub const CONFIG_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Category id that matches every feed.
pub const ALL_CATEGORY: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedFeed {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedConfig {
    pub categories: Vec<Category>,
    pub feeds: Vec<RecommendedFeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CachedConfig {
    config: RecommendedConfig,
    timestamp: i64,
}

impl RecommendedConfig {
    pub fn builtin() -> Self {
        let category = |id: &str, name: &str, icon: &str| Category {
            id: id.into(),
            name: name.into(),
            icon: icon.into(),
        };
        let feed = |title: &str, url: &str, description: &str, category: &str| RecommendedFeed {
            title: title.into(),
            url: url.into(),
            description: description.into(),
            category: category.into(),
        };

        Self {
            categories: vec![
                category(ALL_CATEGORY, "All", "📑"),
                category("news", "News", "📰"),
                category("tech", "Tech", "💻"),
                category("dev", "Development", "👨‍💻"),
                category("general", "General", "🌐"),
            ],
            feeds: vec![
                feed("BBC Chinese", "https://rsshub.app/bbc/chinese", "BBC Chinese news (RSSHub)", "news"),
                feed("Zhihu Daily", "https://rsshub.app/zhihu/daily", "Zhihu daily picks (RSSHub)", "general"),
                feed("SSPai", "https://sspai.com/feed", "SSPai technology articles", "tech"),
                feed("Hacker News", "https://hnrss.org/frontpage", "Hacker News front page", "tech"),
                feed(
                    "GitHub Trending",
                    "https://mshibanami.github.io/GitHubTrendingRSS/daily/all.xml",
                    "Daily trending repositories on GitHub",
                    "dev",
                ),
                feed("V2EX", "https://rsshub.app/v2ex/topics/latest", "V2EX latest topics (RSSHub)", "tech"),
            ],
        }
    }

    pub fn feeds_in(&self, category: &str) -> Vec<&RecommendedFeed> {
        feeds_by_category(&self.feeds, category)
    }
}

pub fn feeds_by_category<'a>(feeds: &'a [RecommendedFeed], category: &str) -> Vec<&'a RecommendedFeed> {
    feeds
        .iter()
        .filter(|f| category == ALL_CATEGORY || f.category == category)
        .collect()
}

pub struct RecommendedFeeds {
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    store: Arc<dyn KeyValueStore>,
    config_url: String,
}

impl RecommendedFeeds {
    pub fn new(
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        store: Arc<dyn KeyValueStore>,
        config_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            store,
            config_url: config_url.into(),
        }
    }

    /// Never fails: falls through to the built-in list.
    pub async fn load(&self) -> RecommendedConfig {
        match self.fetch_remote().await {
            Ok(config) => {
                self.save_cached(&config).await;
                return config;
            }
            Err(e) => tracing::warn!("Failed to load remote feed config: {}", e),
        }

        if let Some(config) = self.cached().await {
            return config;
        }

        RecommendedConfig::builtin()
    }

    /// Drops the local copy and loads again.
    pub async fn refresh(&self) -> RecommendedConfig {
        if let Err(e) = self.store.remove(CONFIG_CACHE_KEY).await {
            tracing::warn!("Failed to clear cached feed config: {}", e);
        }
        self.load().await
    }

    async fn fetch_remote(&self) -> Result<RecommendedConfig> {
        let body = self.fetcher.fetch(&self.config_url).await?;
        let config: RecommendedConfig = serde_json::from_slice(&body)
            .map_err(|e| StreamletError::FeedParse(format!("invalid feed config: {}", e)))?;
        if config.categories.is_empty() || config.feeds.is_empty() {
            return Err(StreamletError::FeedParse(
                "feed config has no categories or feeds".into(),
            ));
        }
        Ok(config)
    }

    async fn cached(&self) -> Option<RecommendedConfig> {
        let cached: CachedConfig = match store::load(self.store.as_ref(), CONFIG_CACHE_KEY).await {
            Ok(Some(cached)) => cached,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read cached feed config: {}", e);
                return None;
            }
        };

        let ttl_ms = CONFIG_CACHE_TTL.as_millis() as i64;
        if now_ms() - cached.timestamp < ttl_ms {
            Some(cached.config)
        } else {
            None
        }
    }

    async fn save_cached(&self, config: &RecommendedConfig) {
        let cached = CachedConfig {
            config: config.clone(),
            timestamp: now_ms(),
        };
        if let Err(e) = store::save(self.store.as_ref(), CONFIG_CACHE_KEY, &cached).await {
            tracing::warn!("Failed to cache feed config: {}", e);
        }
    }
}
