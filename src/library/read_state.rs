use std::sync::Arc;

use crate::app::Result;
use crate::cache::now_ms;
use crate::domain::ReadState;
use crate::store::{self, KeyValueStore};

pub const READ_STATE_KEY: &str = "readArticles";

/// Which articles have been read, and when they were first read. There is
/// no "mark unread".
pub struct ReadStateTracker {
    store: Arc<dyn KeyValueStore>,
}

impl ReadStateTracker {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn get_all(&self) -> Result<ReadState> {
        Ok(store::load(self.store.as_ref(), READ_STATE_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn mark_read(&self, id: &str) -> Result<ReadState> {
        self.mark_read_at(id, now_ms()).await
    }

    /// Marking an id that is already read leaves its timestamp alone and
    /// skips the write.
    pub async fn mark_read_at(&self, id: &str, timestamp: i64) -> Result<ReadState> {
        let mut state = self.get_all().await?;
        if id.is_empty() {
            tracing::debug!("Ignoring mark-read for an article without an id");
            return Ok(state);
        }

        if state.mark(id, timestamp) {
            store::save(self.store.as_ref(), READ_STATE_KEY, &state).await?;
        }
        Ok(state)
    }
}
