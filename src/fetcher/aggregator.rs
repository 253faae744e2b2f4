use std::cmp::Reverse;
use std::sync::Arc;

use futures::future::join_all;

use crate::domain::{Article, Feed, FetchedFeed};
use crate::fetcher::FeedFetcher;

/// How a single feed contributed to an aggregation pass.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    Live,
    /// Served from cache. `stale_error` is set when a live fetch was
    /// attempted and failed.
    Cached { stale_error: Option<String> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedReport {
    pub url: String,
    pub outcome: FeedOutcome,
    pub items: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Every contributed article, newest first.
    pub articles: Vec<Article>,
    /// One report per requested feed, in request order.
    pub reports: Vec<FeedReport>,
}

impl Aggregation {
    pub fn failed(&self) -> impl Iterator<Item = &FeedReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, FeedOutcome::Failed { .. }))
    }

    pub fn all_failed(&self) -> bool {
        !self.reports.is_empty() && self.failed().count() == self.reports.len()
    }

    pub fn any_stale(&self) -> bool {
        self.reports.iter().any(|r| {
            matches!(
                r.outcome,
                FeedOutcome::Cached {
                    stale_error: Some(_)
                }
            )
        })
    }
}

/// Fans out [`FeedFetcher`] over a set of feeds.
///
/// All fetches are awaited together, so a pass takes as long as its slowest
/// feed. A failing feed contributes nothing and never aborts the pass.
#[derive(Clone)]
pub struct Aggregator {
    fetcher: Arc<FeedFetcher>,
}

impl Aggregator {
    pub fn new(fetcher: Arc<FeedFetcher>) -> Self {
        Self { fetcher }
    }

    pub async fn fetch_all(&self, feeds: &[Feed], force_refresh: bool) -> Vec<Article> {
        self.fetch_all_detailed(feeds, force_refresh).await.articles
    }

    pub async fn fetch_all_detailed(&self, feeds: &[Feed], force_refresh: bool) -> Aggregation {
        let fetches = feeds.iter().map(|feed| async move {
            let result = self.fetcher.fetch(&feed.url, force_refresh).await;
            (feed.url.as_str(), result)
        });
        let results = join_all(fetches).await;

        let mut articles = Vec::new();
        let mut reports = Vec::with_capacity(results.len());

        for (url, result) in results {
            match result {
                Ok(fetched) => {
                    reports.push(FeedReport {
                        url: url.to_string(),
                        outcome: outcome_of(&fetched),
                        items: fetched.feed.items.len(),
                    });
                    articles.extend(fetched.feed.items);
                }
                Err(e) => {
                    tracing::warn!("Failed to fetch {}: {}", url, e);
                    reports.push(FeedReport {
                        url: url.to_string(),
                        outcome: FeedOutcome::Failed {
                            error: e.to_string(),
                        },
                        items: 0,
                    });
                }
            }
        }

        sort_newest_first(&mut articles);

        Aggregation { articles, reports }
    }
}

fn outcome_of(fetched: &FetchedFeed) -> FeedOutcome {
    if fetched.from_cache {
        FeedOutcome::Cached {
            stale_error: fetched.error.clone(),
        }
    } else {
        FeedOutcome::Live
    }
}

/// Stable sort by effective date, descending. Undated articles sink to the
/// end; equal dates keep their relative order.
pub fn sort_newest_first(articles: &mut [Article]) {
    articles.sort_by_key(|a| Reverse(a.effective_date()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::FeedCache;
    use crate::fetcher::MockFetcher;
    use crate::normalizer::Normalizer;
    use crate::store::MemoryStore;

    fn article(id: &str, pub_date: Option<&str>) -> Article {
        Article {
            id: id.into(),
            pub_date: pub_date.map(String::from),
            ..Default::default()
        }
    }

    fn ids(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_sort_descending_with_undated_last() {
        let mut articles = vec![
            article("undated", None),
            article("jan1", Some("Mon, 01 Jan 2024 00:00:00 GMT")),
            article("jan3", Some("Wed, 03 Jan 2024 00:00:00 GMT")),
            article("jan2", Some("2024-01-02T00:00:00Z")),
        ];
        sort_newest_first(&mut articles);
        assert_eq!(ids(&articles), vec!["jan3", "jan2", "jan1", "undated"]);
    }

    #[test]
    fn test_sort_is_stable_for_equal_dates() {
        let mut articles = vec![
            article("a", Some("2024-01-01")),
            article("x", None),
            article("b", Some("2024-01-01")),
            article("y", None),
            article("c", Some("2024-01-01")),
        ];
        sort_newest_first(&mut articles);
        assert_eq!(ids(&articles), vec!["a", "b", "c", "x", "y"]);
    }

    #[test]
    fn test_iso_date_fallback_in_sort() {
        let mut articles = vec![
            article("old", Some("2023-06-01")),
            Article {
                id: "iso".into(),
                iso_date: Some("2024-02-01T00:00:00Z".into()),
                ..Default::default()
            },
        ];
        sort_newest_first(&mut articles);
        assert_eq!(ids(&articles), vec!["iso", "old"]);
    }

    #[test]
    fn test_aggregation_status_helpers() {
        let report = |outcome| FeedReport {
            url: "u".into(),
            outcome,
            items: 0,
        };

        let empty = Aggregation::default();
        assert!(!empty.all_failed());

        let mixed = Aggregation {
            articles: Vec::new(),
            reports: vec![
                report(FeedOutcome::Failed { error: "x".into() }),
                report(FeedOutcome::Cached {
                    stale_error: Some("timeout".into()),
                }),
            ],
        };
        assert!(!mixed.all_failed());
        assert!(mixed.any_stale());
        assert_eq!(mixed.failed().count(), 1);

        let fresh_hit = Aggregation {
            articles: Vec::new(),
            reports: vec![report(FeedOutcome::Cached { stale_error: None })],
        };
        assert!(!fresh_hit.any_stale());
    }

    #[tokio::test]
    async fn test_fetch_all_merges_newest_first_and_skips_failures() {
        let fetcher = Arc::new(MockFetcher::new());
        fetcher.respond(
            "https://example.com/rss",
            r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
  <title>Example</title><link>https://example.com</link><description>d</description>
  <item><title>First</title><guid>jan1</guid><pubDate>Mon, 01 Jan 2024 00:00:00 GMT</pubDate></item>
  <item><title>Third</title><guid>jan3</guid><pubDate>Wed, 03 Jan 2024 00:00:00 GMT</pubDate></item>
  <item><title>Second</title><guid>jan2</guid><pubDate>Tue, 02 Jan 2024 00:00:00 GMT</pubDate></item>
</channel></rss>"#,
        );
        let store = Arc::new(MemoryStore::new());
        let feed_fetcher = Arc::new(FeedFetcher::new(
            fetcher.clone(),
            Normalizer::new(),
            FeedCache::new(store),
        ));
        let aggregator = Aggregator::new(feed_fetcher);

        let feeds = vec![
            Feed::new("https://down.example/rss"),
            Feed::new("https://example.com/rss"),
        ];
        let articles = aggregator.fetch_all(&feeds, false).await;

        assert_eq!(ids(&articles), vec!["jan3", "jan2", "jan1"]);
        assert_eq!(fetcher.calls("https://down.example/rss"), 1);
    }
}
