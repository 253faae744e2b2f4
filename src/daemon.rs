//! Periodic background refresh.
//!
//! Re-fetches every subscription with `force_refresh` on a fixed interval so
//! the cache stays warm. Runs in the foreground until Ctrl-C.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::time::interval;

use crate::app::{AppContext, Result};
use crate::fetcher::FeedOutcome;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub interval_secs: u64,
    pub update_on_start: bool,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            update_on_start: true,
        }
    }
}

impl DaemonConfig {
    /// Parse interval string like "1h", "30m", "6h", "1d"
    pub fn parse_interval(s: &str) -> std::result::Result<u64, String> {
        let s = s.trim().to_lowercase();

        let secs = if let Some(hours) = s.strip_suffix('h') {
            hours
                .parse::<u64>()
                .map(|h| h * 3600)
                .map_err(|_| format!("Invalid hours: {}", hours))?
        } else if let Some(minutes) = s.strip_suffix('m') {
            minutes
                .parse::<u64>()
                .map(|m| m * 60)
                .map_err(|_| format!("Invalid minutes: {}", minutes))?
        } else if let Some(days) = s.strip_suffix('d') {
            days.parse::<u64>()
                .map(|d| d * 86400)
                .map_err(|_| format!("Invalid days: {}", days))?
        } else if let Some(secs) = s.strip_suffix('s') {
            secs.parse::<u64>()
                .map_err(|_| format!("Invalid seconds: {}", secs))?
        } else {
            s.parse::<u64>()
                .map_err(|_| format!("Invalid interval: {}. Use format like '1h', '30m', '1d'", s))?
        };

        if secs == 0 {
            return Err("Interval must be greater than zero".to_string());
        }
        Ok(secs)
    }

    pub fn format_interval(secs: u64) -> String {
        if secs >= 86400 && secs % 86400 == 0 {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

/// Summary of one refresh cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub feeds: usize,
    pub articles: usize,
    pub failed: usize,
    pub stale: usize,
}

pub struct Daemon {
    ctx: Arc<AppContext>,
    config: DaemonConfig,
}

impl Daemon {
    pub fn new(ctx: Arc<AppContext>, config: DaemonConfig) -> Self {
        Self { ctx, config }
    }

    pub async fn run(&self) -> Result<()> {
        tracing::info!(
            "Streamlet refresher started (interval: {})",
            DaemonConfig::format_interval(self.config.interval_secs)
        );

        if self.config.update_on_start {
            self.run_update().await;
        }

        let mut timer = interval(Duration::from_secs(self.config.interval_secs));
        timer.tick().await; // Skip the first immediate tick

        loop {
            tokio::select! {
                _ = timer.tick() => {
                    self.run_update().await;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Refresher shutting down");
                    break;
                }
            }
        }

        Ok(())
    }

    /// One forced refresh of every subscription. Errors are logged, never
    /// returned, so a bad cycle does not stop the loop.
    pub async fn run_update(&self) -> RefreshSummary {
        let start = Instant::now();

        let feeds = match self.ctx.subscriptions.list().await {
            Ok(feeds) => feeds,
            Err(e) => {
                tracing::error!("Failed to load subscriptions: {}", e);
                return RefreshSummary::default();
            }
        };

        if feeds.is_empty() {
            tracing::info!("No feeds to refresh");
            return RefreshSummary::default();
        }

        let aggregation = self.ctx.aggregator.fetch_all_detailed(&feeds, true).await;
        let summary = RefreshSummary {
            feeds: feeds.len(),
            articles: aggregation.articles.len(),
            failed: aggregation.failed().count(),
            stale: aggregation
                .reports
                .iter()
                .filter(|r| {
                    matches!(
                        r.outcome,
                        FeedOutcome::Cached {
                            stale_error: Some(_)
                        }
                    )
                })
                .count(),
        };

        tracing::info!(
            "Refresh complete: {} feeds, {} articles, {} stale, {} failed ({:.1}s)",
            summary.feeds,
            summary.articles,
            summary.stale,
            summary.failed,
            start.elapsed().as_secs_f64()
        );

        summary
    }
}
