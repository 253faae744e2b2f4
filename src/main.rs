use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use streamlet::app::AppContext;
use streamlet::cli::{commands, Cli, Commands};
use streamlet::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(&config, cli.db)?;

    match cli.command {
        Commands::Add { url } => {
            commands::add_feed(&ctx, &url).await?;
        }
        Commands::Remove { url } => {
            commands::remove_feed(&ctx, &url).await?;
        }
        Commands::List => {
            commands::list_feeds(&ctx).await?;
        }
        Commands::Timeline { all, refresh } => {
            commands::show_timeline(&ctx, all, refresh).await?;
        }
        Commands::Fetch { url, refresh } => {
            commands::fetch_feed(&ctx, &url, refresh).await?;
        }
        Commands::Read { id } => {
            commands::mark_read(&ctx, &id).await?;
        }
        Commands::Recommended { category, refresh } => {
            commands::list_recommended(&ctx, &category, refresh).await?;
        }
        Commands::Daemon {
            interval,
            no_initial_update,
        } => {
            commands::run_daemon(Arc::new(ctx), &config, interval.as_deref(), no_initial_update)
                .await?;
        }
    }

    Ok(())
}
