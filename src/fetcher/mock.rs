use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;

use crate::app::{Result, StreamletError};
use crate::fetcher::Fetcher;

#[derive(Debug, Clone)]
enum Scripted {
    Body(Vec<u8>),
    Status(u16),
}

/// Scripted [`Fetcher`] for tests and offline runs. URLs with no scripted
/// response fail as unreachable. Every call is counted per URL.
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, Scripted>>,
    delays: Mutex<HashMap<String, Duration>>,
    calls: Mutex<HashMap<String, usize>>,
}

fn guard<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, body: impl Into<Vec<u8>>) {
        guard(&self.responses).insert(url.to_string(), Scripted::Body(body.into()));
    }

    pub fn respond_status(&self, url: &str, status: u16) {
        guard(&self.responses).insert(url.to_string(), Scripted::Status(status));
    }

    /// Makes `url` unreachable again.
    pub fn disconnect(&self, url: &str) {
        guard(&self.responses).remove(url);
    }

    pub fn delay(&self, url: &str, delay: Duration) {
        guard(&self.delays).insert(url.to_string(), delay);
    }

    pub fn calls(&self, url: &str) -> usize {
        guard(&self.calls).get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        guard(&self.calls).values().sum()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        *guard(&self.calls).entry(url.to_string()).or_insert(0) += 1;

        let delay = guard(&self.delays).get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = guard(&self.responses).get(url).cloned();
        match scripted {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::Status(status)) => Err(StreamletError::HttpStatus {
                url: url.to_string(),
                status,
            }),
            None => Err(StreamletError::Network(format!("{} is unreachable", url))),
        }
    }
}
