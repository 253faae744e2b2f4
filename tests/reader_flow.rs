use std::sync::Arc;
use std::time::{Duration, Instant};

use streamlet::app::{AppContext, StreamletError};
use streamlet::cache::{self, cache_key};
use streamlet::daemon::{Daemon, DaemonConfig};
use streamlet::domain::{Feed, ParsedFeed};
use streamlet::fetcher::{FeedOutcome, Fetcher, MockFetcher};
use streamlet::timeline::{ReadFilter, TimelineStatus};

const FEED_A: &str = "https://a.example/rss";
const FEED_B: &str = "https://b.example/rss";

fn rss(title: &str, items: &[(&str, &str)]) -> String {
    let items: String = items
        .iter()
        .map(|(guid, date)| {
            format!(
                "<item><title>{guid}</title><guid>{guid}</guid><pubDate>{date}</pubDate></item>"
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>{title}</title><link>https://example.com</link><description>d</description>{items}</channel></rss>"#
    )
}

fn context() -> (AppContext, Arc<MockFetcher>) {
    let mock = Arc::new(MockFetcher::new());
    let fetcher: Arc<dyn Fetcher + Send + Sync> = mock.clone();
    (AppContext::in_memory(fetcher), mock)
}

async fn subscribe_raw(ctx: &AppContext, url: &str) {
    ctx.subscriptions.add(Feed::new(url)).await.unwrap();
}

#[tokio::test]
async fn test_subscribe_stores_feed_metadata() {
    let (ctx, mock) = context();
    mock.respond(FEED_A, rss("Alpha", &[("a1", "Mon, 01 Jan 2024 00:00:00 GMT")]));

    let (feed, feeds) = ctx.subscribe(FEED_A).await.unwrap();

    assert_eq!(feed.title, "Alpha");
    assert_eq!(feeds.len(), 1);
    assert!(ctx.subscriptions.contains(FEED_A).await.unwrap());

    // Same URL again leaves the list untouched
    let (_, feeds) = ctx.subscribe(FEED_A).await.unwrap();
    assert_eq!(feeds.len(), 1);
}

#[tokio::test]
async fn test_subscribe_rejects_unreachable_and_non_http() {
    let (ctx, _mock) = context();

    let err = ctx.subscribe(FEED_A).await.unwrap_err();
    assert!(matches!(err, StreamletError::Fetch { .. }));

    let err = ctx.subscribe("ftp://a.example/rss").await.unwrap_err();
    assert!(matches!(err, StreamletError::Other(_)));

    assert!(ctx.subscriptions.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_partial_failure_keeps_other_feeds() {
    let (ctx, mock) = context();
    mock.respond(FEED_B, rss("Beta", &[("b1", "Tue, 02 Jan 2024 00:00:00 GMT")]));
    subscribe_raw(&ctx, FEED_A).await;
    subscribe_raw(&ctx, FEED_B).await;

    let timeline = ctx.load_timeline(false, ReadFilter::All).await.unwrap();

    assert_eq!(timeline.status, TimelineStatus::Fresh);
    assert_eq!(timeline.failed_feeds, vec![FEED_A.to_string()]);
    assert_eq!(timeline.entries.len(), 1);
    assert_eq!(timeline.entries[0].article.id, "b1");
    assert_eq!(timeline.entries[0].article.feed_url, FEED_B);
}

#[tokio::test]
async fn test_feeds_are_fetched_concurrently() {
    let (ctx, mock) = context();
    mock.respond(FEED_A, rss("Alpha", &[("a1", "Mon, 01 Jan 2024 00:00:00 GMT")]));
    mock.respond(FEED_B, rss("Beta", &[("b1", "Tue, 02 Jan 2024 00:00:00 GMT")]));
    mock.delay(FEED_A, Duration::from_millis(200));
    mock.delay(FEED_B, Duration::from_millis(200));
    subscribe_raw(&ctx, FEED_A).await;
    subscribe_raw(&ctx, FEED_B).await;

    let start = Instant::now();
    let timeline = ctx.load_timeline(false, ReadFilter::All).await.unwrap();

    assert!(start.elapsed() < Duration::from_millis(390));
    assert_eq!(timeline.entries.len(), 2);
}

#[tokio::test]
async fn test_timeline_is_newest_first_across_feeds() {
    let (ctx, mock) = context();
    mock.respond(
        FEED_A,
        rss(
            "Alpha",
            &[
                ("jan1", "Mon, 01 Jan 2024 00:00:00 GMT"),
                ("jan3", "Wed, 03 Jan 2024 00:00:00 GMT"),
            ],
        ),
    );
    mock.respond(FEED_B, rss("Beta", &[("jan2", "Tue, 02 Jan 2024 00:00:00 GMT")]));
    subscribe_raw(&ctx, FEED_A).await;
    subscribe_raw(&ctx, FEED_B).await;

    let timeline = ctx.load_timeline(false, ReadFilter::All).await.unwrap();
    let ids: Vec<&str> = timeline.entries.iter().map(|e| e.article.id.as_str()).collect();

    assert_eq!(ids, vec!["jan3", "jan2", "jan1"]);
}

#[tokio::test]
async fn test_timeline_statuses() {
    let (ctx, _mock) = context();

    let timeline = ctx.load_timeline(false, ReadFilter::Unread).await.unwrap();
    assert_eq!(timeline.status, TimelineStatus::NoFeeds);

    subscribe_raw(&ctx, FEED_A).await;
    subscribe_raw(&ctx, FEED_B).await;

    let timeline = ctx.load_timeline(false, ReadFilter::Unread).await.unwrap();
    assert_eq!(timeline.status, TimelineStatus::AllFailed);
    assert_eq!(timeline.failed_feeds.len(), 2);
    assert!(timeline.is_empty());
}

#[tokio::test]
async fn test_stale_cache_served_when_network_fails() {
    let (ctx, _mock) = context();
    subscribe_raw(&ctx, FEED_A).await;

    let stale = ParsedFeed {
        title: "Alpha".into(),
        items: vec![streamlet::domain::Article {
            id: "old".into(),
            title: Some("Old".into()),
            feed_url: FEED_A.into(),
            ..Default::default()
        }],
        ..Default::default()
    };
    let twenty_minutes_ago = cache::now_ms() - 20 * 60 * 1000;
    ctx.feed_fetcher
        .cache()
        .put_at(FEED_A, &stale, twenty_minutes_ago)
        .await
        .unwrap();

    let fetched = ctx.fetch(FEED_A, false).await.unwrap();
    assert!(fetched.from_cache);
    assert!(fetched.error.is_some());
    assert_eq!(fetched.feed.items.len(), 1);

    let timeline = ctx.load_timeline(false, ReadFilter::All).await.unwrap();
    assert_eq!(timeline.status, TimelineStatus::ShowingCached);
    assert_eq!(timeline.entries[0].article.id, "old");
}

#[tokio::test]
async fn test_fresh_cache_skips_network() {
    let (ctx, mock) = context();
    mock.respond(FEED_A, rss("Alpha", &[("a1", "Mon, 01 Jan 2024 00:00:00 GMT")]));

    let first = ctx.fetch(FEED_A, false).await.unwrap();
    let second = ctx.fetch(FEED_A, false).await.unwrap();
    assert!(second.from_cache);
    assert_eq!(first.feed, second.feed);
    assert_eq!(mock.calls(FEED_A), 1);

    let forced = ctx.fetch(FEED_A, true).await.unwrap();
    assert!(!forced.from_cache);
    assert_eq!(mock.calls(FEED_A), 2);
}

#[tokio::test]
async fn test_unsubscribe_drops_cache() {
    let (ctx, mock) = context();
    mock.respond(FEED_A, rss("Alpha", &[("a1", "Mon, 01 Jan 2024 00:00:00 GMT")]));
    ctx.subscribe(FEED_A).await.unwrap();
    assert!(ctx.store.get(&cache_key(FEED_A)).await.unwrap().is_some());

    let feeds = ctx.unsubscribe(FEED_A).await.unwrap();
    assert!(feeds.is_empty());
    assert!(ctx.store.get(&cache_key(FEED_A)).await.unwrap().is_none());

    // Without a cache entry, a failing network is a hard error
    mock.disconnect(FEED_A);
    let err = ctx.fetch(FEED_A, false).await.unwrap_err();
    assert!(matches!(err, StreamletError::Fetch { .. }));

    // Removing again is a no-op
    assert!(ctx.unsubscribe(FEED_A).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_mark_read_hides_from_unread_timeline() {
    let (ctx, mock) = context();
    mock.respond(
        FEED_A,
        rss(
            "Alpha",
            &[
                ("a1", "Mon, 01 Jan 2024 00:00:00 GMT"),
                ("a2", "Tue, 02 Jan 2024 00:00:00 GMT"),
            ],
        ),
    );
    subscribe_raw(&ctx, FEED_A).await;

    let first = ctx.mark_read("a1").await.unwrap();
    let second = ctx.mark_read("a1").await.unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first.read_at("a1"), second.read_at("a1"));

    let unread = ctx.load_timeline(false, ReadFilter::Unread).await.unwrap();
    assert_eq!(unread.entries.len(), 1);
    assert_eq!(unread.entries[0].article.id, "a2");
    assert_eq!(unread.unread_count, 1);

    let all = ctx.load_timeline(false, ReadFilter::All).await.unwrap();
    assert_eq!(all.entries.len(), 2);
    assert!(all.entries.iter().any(|e| e.article.id == "a1" && e.is_read()));
}

#[tokio::test]
async fn test_daemon_update_force_refreshes() {
    let (ctx, mock) = context();
    mock.respond(FEED_A, rss("Alpha", &[("a1", "Mon, 01 Jan 2024 00:00:00 GMT")]));
    subscribe_raw(&ctx, FEED_A).await;
    subscribe_raw(&ctx, FEED_B).await;

    ctx.fetch(FEED_A, false).await.unwrap();
    assert_eq!(mock.calls(FEED_A), 1);

    let daemon = Daemon::new(Arc::new(ctx), DaemonConfig::default());
    let summary = daemon.run_update().await;

    assert_eq!(summary.feeds, 2);
    assert_eq!(summary.articles, 1);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.stale, 0);
    assert_eq!(mock.calls(FEED_A), 2);
}

#[tokio::test]
async fn test_aggregation_reports_outcomes() {
    let (ctx, mock) = context();
    mock.respond(FEED_A, rss("Alpha", &[("a1", "Mon, 01 Jan 2024 00:00:00 GMT")]));
    mock.respond_status(FEED_B, 503);

    let feeds = vec![Feed::new(FEED_A), Feed::new(FEED_B)];
    let aggregation = ctx.aggregator.fetch_all_detailed(&feeds, false).await;

    assert_eq!(aggregation.reports.len(), 2);
    assert_eq!(aggregation.reports[0].outcome, FeedOutcome::Live);
    assert_eq!(aggregation.reports[0].items, 1);
    assert!(matches!(aggregation.reports[1].outcome, FeedOutcome::Failed { .. }));
    assert!(!aggregation.all_failed());
}
