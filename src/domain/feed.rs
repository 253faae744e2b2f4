use serde::{Deserialize, Serialize};

use crate::domain::Article;

/// A subscribed feed. The URL is the identity; nothing else is ever updated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Feed {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            description: String::new(),
            image: None,
        }
    }

    /// Builds the subscription record for a feed that was just fetched.
    pub fn from_parsed(url: impl Into<String>, parsed: &ParsedFeed) -> Self {
        Self {
            url: url.into(),
            title: parsed.title.clone(),
            description: parsed.description.clone(),
            image: parsed.image.clone(),
        }
    }

    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }
}

/// Parser output after normalization: feed metadata plus its articles in
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedFeed {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub items: Vec<Article>,
}

/// One cache slot per feed URL. `timestamp` is epoch milliseconds of the
/// last successful fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedFeed {
    pub timestamp: i64,
    pub data: ParsedFeed,
}

impl CachedFeed {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.timestamp
    }
}

/// Result of fetching a single feed, tagged with where the data came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedFeed {
    pub url: String,
    pub feed: ParsedFeed,
    pub from_cache: bool,
    /// Set when a live fetch failed and stale cached data was served instead.
    pub error: Option<String>,
}

impl FetchedFeed {
    pub fn live(url: &str, feed: ParsedFeed) -> Self {
        Self {
            url: url.to_string(),
            feed,
            from_cache: false,
            error: None,
        }
    }

    pub fn cached(url: &str, feed: ParsedFeed, error: Option<String>) -> Self {
        Self {
            url: url.to_string(),
            feed,
            from_cache: true,
            error,
        }
    }

    pub fn is_stale_fallback(&self) -> bool {
        self.from_cache && self.error.is_some()
    }
}
