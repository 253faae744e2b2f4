use std::sync::Arc;

use crate::app::{AppContext, Result, StreamletError};
use crate::config::Config;
use crate::daemon::{Daemon, DaemonConfig};
use crate::timeline::{ReadFilter, TimelineStatus};

pub async fn add_feed(ctx: &AppContext, url: &str) -> Result<()> {
    if ctx.subscriptions.contains(url).await? {
        println!("Feed already exists: {}", url);
        return Ok(());
    }

    let (feed, feeds) = ctx.subscribe(url).await?;
    println!("Added feed: {}", feed.display_title());
    println!("Subscribed to {} feeds", feeds.len());
    Ok(())
}

pub async fn remove_feed(ctx: &AppContext, url: &str) -> Result<()> {
    if !ctx.subscriptions.contains(url).await? {
        return Err(StreamletError::FeedNotFound(url.to_string()));
    }

    ctx.unsubscribe(url).await?;
    println!("Removed feed: {}", url);
    Ok(())
}

pub async fn list_feeds(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.subscriptions.list().await?;

    if feeds.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for feed in feeds {
        println!("{}\n  {}", feed.display_title(), feed.url);
        if !feed.description.is_empty() {
            println!("  {}", feed.description);
        }
    }

    Ok(())
}

pub async fn show_timeline(ctx: &AppContext, all: bool, refresh: bool) -> Result<()> {
    let filter = if all { ReadFilter::All } else { ReadFilter::Unread };
    let timeline = ctx.load_timeline(refresh, filter).await?;

    match timeline.status {
        TimelineStatus::NoFeeds => {
            println!("No feeds subscribed. Add one with `streamlet add <url>`.");
            return Ok(());
        }
        TimelineStatus::AllFailed => {
            eprintln!("Could not fetch any feed:");
            for url in &timeline.failed_feeds {
                eprintln!("  {}", url);
            }
            return Ok(());
        }
        TimelineStatus::ShowingCached => {
            eprintln!("Some feeds could not be refreshed; showing cached articles.");
        }
        TimelineStatus::Fresh => {}
    }

    for url in &timeline.failed_feeds {
        eprintln!("  ! {}", url);
    }

    if timeline.is_empty() {
        match filter {
            ReadFilter::Unread => println!("No unread articles!"),
            ReadFilter::All => println!("No articles found."),
        }
        return Ok(());
    }

    for entry in &timeline.entries {
        let read_marker = if entry.is_read() { " " } else { "●" };
        let date = entry.article.effective_date();
        let date = if date.timestamp() == 0 {
            "          ".to_string()
        } else {
            date.format("%Y-%m-%d").to_string()
        };

        println!(
            "{} {} {} [{}]",
            read_marker,
            date,
            entry.article.display_title(),
            entry.article.feed_title
        );
        println!("    {}", entry.article.id);
    }

    println!("\n{} unread", timeline.unread_count);
    Ok(())
}

pub async fn fetch_feed(ctx: &AppContext, url: &str, refresh: bool) -> Result<()> {
    let fetched = ctx.fetch(url, refresh).await?;

    let source = match (&fetched.error, fetched.from_cache) {
        (Some(_), _) => "stale cache",
        (None, true) => "cache",
        (None, false) => "network",
    };
    println!("{} ({} items, from {})", fetched.feed.title, fetched.feed.items.len(), source);
    if let Some(error) = &fetched.error {
        eprintln!("  live fetch failed: {}", error);
    }

    for item in &fetched.feed.items {
        println!("  {}", item.display_title());
    }
    Ok(())
}

pub async fn mark_read(ctx: &AppContext, id: &str) -> Result<()> {
    let state = ctx.mark_read(id).await?;
    println!("Marked read: {} ({} read articles)", id, state.len());
    Ok(())
}

pub async fn list_recommended(ctx: &AppContext, category: &str, refresh: bool) -> Result<()> {
    let config = if refresh {
        ctx.recommended.refresh().await
    } else {
        ctx.recommended.load().await
    };

    let subscribed = ctx.subscriptions.list().await?;
    let feeds = config.feeds_in(category);

    if feeds.is_empty() {
        println!("No recommended feeds in category {}", category);
        return Ok(());
    }

    for feed in feeds {
        let marker = if subscribed.iter().any(|f| f.url == feed.url) { "✓" } else { " " };
        println!("{} {} [{}]\n    {}", marker, feed.title, feed.category, feed.url);
    }

    Ok(())
}

pub async fn run_daemon(
    ctx: Arc<AppContext>,
    config: &Config,
    interval: Option<&str>,
    no_initial_update: bool,
) -> Result<()> {
    let mut daemon_config = config
        .refresh
        .daemon_config()
        .map_err(|e| StreamletError::Config(e.to_string()))?;

    if let Some(interval) = interval {
        daemon_config.interval_secs =
            DaemonConfig::parse_interval(interval).map_err(StreamletError::Config)?;
    }
    if no_initial_update {
        daemon_config.update_on_start = false;
    }

    Daemon::new(ctx, daemon_config).run().await
}
