pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "streamlet")]
#[command(about = "A feed reader with a merged, cached timeline", long_about = None)]
pub struct Cli {
    /// Path to the database file (default: platform data directory)
    #[arg(long, global = true)]
    pub db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to a feed
    Add {
        /// URL of the feed to add
        url: String,
    },
    /// Unsubscribe from a feed and drop its cached articles
    Remove {
        /// URL of the feed to remove
        url: String,
    },
    /// List subscriptions
    List,
    /// Show the merged timeline of all subscriptions
    Timeline {
        /// Include articles that were already read
        #[arg(long)]
        all: bool,

        /// Ignore fresh cache entries and refetch every feed
        #[arg(short, long)]
        refresh: bool,
    },
    /// Fetch a single feed
    Fetch {
        url: String,

        #[arg(short, long)]
        refresh: bool,
    },
    /// Mark an article as read
    Read {
        /// Article id as shown by `timeline`
        id: String,
    },
    /// Browse recommended feeds
    Recommended {
        /// Only show this category
        #[arg(short, long, default_value = crate::recommended::ALL_CATEGORY)]
        category: String,

        /// Discard the cached catalog first
        #[arg(long)]
        refresh: bool,
    },
    /// Refresh all feeds periodically until interrupted
    Daemon {
        /// Update interval (e.g., "1h", "30m", "6h", "1d"); overrides the config file
        #[arg(short, long)]
        interval: Option<String>,

        /// Skip initial update on start
        #[arg(long)]
        no_initial_update: bool,
    },
}
