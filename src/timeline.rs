use crate::domain::{Article, ReadState};
use crate::fetcher::Aggregation;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReadFilter {
    All,
    #[default]
    Unread,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEntry {
    pub article: Article,
    pub read_at: Option<i64>,
}

impl TimelineEntry {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

/// What the reader should be told about the timeline besides its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineStatus {
    /// There are no subscriptions.
    NoFeeds,
    /// Every feed failed and none had cached data.
    AllFailed,
    /// At least one feed is showing stale data after a failed fetch.
    ShowingCached,
    Fresh,
}

impl TimelineStatus {
    pub fn classify(feed_count: usize, aggregation: &Aggregation) -> Self {
        if feed_count == 0 {
            Self::NoFeeds
        } else if aggregation.all_failed() {
            Self::AllFailed
        } else if aggregation.any_stale() {
            Self::ShowingCached
        } else {
            Self::Fresh
        }
    }
}

#[derive(Debug, Clone)]
pub struct Timeline {
    pub entries: Vec<TimelineEntry>,
    pub status: TimelineStatus,
    pub failed_feeds: Vec<String>,
    pub unread_count: usize,
}

impl Timeline {
    pub fn build(
        feed_count: usize,
        aggregation: Aggregation,
        read_state: &ReadState,
        filter: ReadFilter,
    ) -> Self {
        let status = TimelineStatus::classify(feed_count, &aggregation);
        let failed_feeds = aggregation.failed().map(|r| r.url.clone()).collect();
        let entries = entries(aggregation.articles, read_state);
        let unread_count = entries.iter().filter(|e| !e.is_read()).count();

        let entries = match filter {
            ReadFilter::All => entries,
            ReadFilter::Unread => entries.into_iter().filter(|e| !e.is_read()).collect(),
        };

        Self {
            entries,
            status,
            failed_feeds,
            unread_count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Pairs each article with its read timestamp, keeping article order.
pub fn entries(articles: Vec<Article>, read_state: &ReadState) -> Vec<TimelineEntry> {
    articles
        .into_iter()
        .map(|article| {
            let read_at = read_state.read_at(&article.id);
            TimelineEntry { article, read_at }
        })
        .collect()
}
