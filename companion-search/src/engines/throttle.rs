//! Per-engine request spacing.
//!
//! Scraped engines block clients that search in bursts. [`Throttled`] wraps
//! an adapter so consecutive searches to one engine start at least the
//! configured interval apart. The wait happens inside the adapter's task, so
//! it counts against the per-adapter deadline like any other latency.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::types::{EngineId, SearchResult};

/// Hands out start slots at least `interval` apart.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    /// Wait until this caller's slot. Concurrent callers queue up in the
    /// order they reserve, one interval apart.
    pub async fn wait(&self) {
        if self.interval.is_zero() {
            return;
        }
        let slot = {
            let mut next = self.next_slot.lock().unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = match *next {
                Some(at) if at > now => at,
                _ => now,
            };
            *next = Some(slot + self.interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

/// An adapter whose searches are spaced by a [`Throttle`].
pub struct Throttled<A: ?Sized> {
    inner: std::sync::Arc<A>,
    throttle: Throttle,
}

impl<A: EngineAdapter + ?Sized> Throttled<A> {
    pub fn new(inner: std::sync::Arc<A>, interval: Duration) -> Self {
        Self {
            inner,
            throttle: Throttle::new(interval),
        }
    }
}

#[async_trait]
impl<A: EngineAdapter + ?Sized> EngineAdapter for Throttled<A> {
    fn id(&self) -> EngineId {
        self.inner.id()
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.throttle.wait().await;
        self.inner.search(query).await
    }
}
