pub mod aggregator;
pub mod feed_fetcher;
pub mod http_fetcher;
pub mod mock;

use async_trait::async_trait;

use crate::app::Result;

pub use aggregator::{Aggregation, Aggregator, FeedOutcome, FeedReport};
pub use feed_fetcher::FeedFetcher;
pub use http_fetcher::HttpFetcher;
pub use mock::MockFetcher;

/// Plain `GET`. Implementations must turn a non-2xx status into an error.
#[async_trait]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}
