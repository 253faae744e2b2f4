pub mod article;
pub mod feed;
pub mod state;

pub use article::Article;
pub use feed::{CachedFeed, Feed, FetchedFeed, ParsedFeed};
pub use state::ReadState;
