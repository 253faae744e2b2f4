//! # Streamlet
//!
//! A feed reader that merges every subscription into one newest-first
//! timeline, caching each feed so the timeline survives a flaky network.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Normalizer → FeedCache → Aggregator → Timeline → CLI
//!                           ↑
//!                     KeyValueStore
//! ```
//!
//! - [`fetcher`]: HTTP transport, per-feed cache policy and aggregation
//! - [`normalizer`]: Converts RSS/Atom feeds to unified domain models
//! - [`store`]: Asynchronous key-value persistence
//! - [`timeline`]: Combines aggregated articles with read state
//!
//! ## Quick Start
//!
//! ```bash
//! # Add a feed
//! streamlet add https://blog.rust-lang.org/feed.xml
//!
//! # Show unread articles
//! streamlet timeline
//!
//! # Mark one read
//! streamlet read https://blog.rust-lang.org/2024/01/01/post.html
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together all components:
/// store, fetcher, cache, subscriptions and read state.
pub mod app;

/// Freshness-checked feed cache on top of the key-value store.
pub mod cache;

/// Command-line interface using clap.
///
/// - `add <url>` / `remove <url>` / `list` - Manage subscriptions
/// - `timeline [--all] [--refresh]` - Show the merged timeline
/// - `fetch <url>` - Fetch a single feed
/// - `read <id>` - Mark an article as read
/// - `recommended` - Browse the recommended catalog
/// - `daemon` - Refresh periodically
pub mod cli;

/// Configuration loaded from `~/.config/streamlet/config.toml`.
pub mod config;

/// Periodic foreground refresher.
pub mod daemon;

/// Core domain models.
///
/// - [`Feed`](domain::Feed): Subscription metadata
/// - [`Article`](domain::Article): Normalized feed entry
/// - [`ReadState`](domain::ReadState): Article id to read timestamp
pub mod domain;

/// Feed fetching, caching policy and concurrent aggregation.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for raw retrieval
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
/// - [`FeedFetcher`](fetcher::FeedFetcher): Cache-aware single feed fetch
/// - [`Aggregator`](fetcher::Aggregator): Concurrent fetch of all subscriptions
pub mod fetcher;

/// Subscription list and read-state persistence.
pub mod library;

/// Feed parsing and normalization.
///
/// Converts RSS 0.9x/1.0/2.0, Atom 0.3/1.0, and JSON Feed 1.0
/// into [`ParsedFeed`](domain::ParsedFeed) values.
pub mod normalizer;

/// Recommended feed catalog with remote, cached and built-in sources.
pub mod recommended;

/// Key-value persistence.
///
/// - [`KeyValueStore`](store::KeyValueStore): Async storage trait
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
/// - [`MemoryStore`](store::MemoryStore): In-process implementation
pub mod store;

/// Merged timeline of subscribed feeds.
///
/// - [`Timeline`](timeline::Timeline): Entries paired with read state
/// - [`TimelineStatus`](timeline::TimelineStatus): No feeds, all failed, showing cached or fresh
pub mod timeline;
