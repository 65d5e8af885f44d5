//! Concurrent fan-out to engine adapters with per-task deadlines.
//!
//! Every adapter runs in its own task wrapped in its own
//! [`tokio::time::timeout`]. The collecting loop itself has no deadline: it
//! ends once every task has either finished or hit its own deadline, so the
//! whole round takes at most `per_adapter_timeout` wall-clock regardless of
//! how many adapters are slow. A failing, hanging or panicking adapter only
//! loses its own contribution.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::task::JoinSet;
use tokio::time::Instant;

use crate::engine::EngineAdapter;
use crate::error::SearchError;
use crate::types::{EngineId, SearchResult};

use super::dedup::deduplicate;

/// How one adapter fared in a fan-out round.
#[derive(Debug)]
pub struct EngineReport {
    /// The adapter's engine.
    pub engine: EngineId,
    /// Time from launch until the task finished or was cut off.
    pub elapsed: Duration,
    /// Number of results on success, or why it contributed nothing.
    pub outcome: Result<usize, SearchError>,
}

impl EngineReport {
    /// Whether the adapter answered (possibly with zero results).
    pub fn succeeded(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Merged results of one round plus a report per adapter.
#[derive(Debug, Default)]
pub struct FanOut {
    /// Deduplicated results, grouped by adapter in registration order, each
    /// group in its engine's rank order.
    pub results: Vec<SearchResult>,
    /// One report per adapter, in registration order.
    pub reports: Vec<EngineReport>,
}

impl FanOut {
    /// Number of adapters that answered.
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.succeeded()).count()
    }
}

/// Query every adapter concurrently and return deduplicated results.
///
/// An empty vector is a valid outcome (everything failed or nothing was
/// found); failures are logged at debug level and never returned.
pub async fn aggregate(
    query: &str,
    adapters: &[Arc<dyn EngineAdapter>],
    per_adapter_timeout: Duration,
) -> Vec<SearchResult> {
    fan_out(query, adapters, per_adapter_timeout).await.results
}

/// Like [`aggregate`], also reporting each adapter's outcome.
pub async fn fan_out(
    query: &str,
    adapters: &[Arc<dyn EngineAdapter>],
    per_adapter_timeout: Duration,
) -> FanOut {
    let started = Instant::now();
    let mut tasks = JoinSet::new();

    for (index, adapter) in adapters.iter().enumerate() {
        let adapter = Arc::clone(adapter);
        let query = query.to_owned();
        tasks.spawn(async move {
            let engine = adapter.id();
            let launched = Instant::now();
            let call = AssertUnwindSafe(adapter.search(&query)).catch_unwind();
            let outcome = match tokio::time::timeout(per_adapter_timeout, call).await {
                Ok(Ok(result)) => result,
                Ok(Err(_panic)) => Err(SearchError::engine(engine, "adapter panicked")),
                Err(_elapsed) => Err(SearchError::EngineTimeout { engine }),
            };
            (index, engine, launched.elapsed(), outcome)
        });
    }

    let mut buckets: Vec<Option<Vec<SearchResult>>> = vec![None; adapters.len()];
    let mut reports: Vec<Option<EngineReport>> = (0..adapters.len()).map(|_| None).collect();

    while let Some(joined) = tasks.join_next().await {
        let (index, engine, elapsed, outcome) = match joined {
            Ok(done) => done,
            Err(e) => {
                // Panics are caught inside the task; this is a runtime shutdown.
                tracing::debug!(error = %e, "fan-out task did not complete");
                continue;
            }
        };

        let outcome = match outcome {
            Ok(results) => {
                tracing::debug!(%engine, count = results.len(), ?elapsed, "engine answered");
                let count = results.len();
                buckets[index] = Some(results);
                Ok(count)
            }
            Err(e) => {
                tracing::debug!(%engine, error = %e, ?elapsed, "engine contributed nothing");
                Err(e)
            }
        };
        reports[index] = Some(EngineReport {
            engine,
            elapsed,
            outcome,
        });
    }

    let merged: Vec<SearchResult> = buckets.into_iter().flatten().flatten().collect();
    let results = deduplicate(merged);
    let reports: Vec<EngineReport> = reports.into_iter().flatten().collect();

    tracing::debug!(
        adapters = adapters.len(),
        answered = reports.iter().filter(|r| r.succeeded()).count(),
        results = results.len(),
        elapsed = ?started.elapsed(),
        "fan-out complete"
    );

    FanOut { results, reports }
}
