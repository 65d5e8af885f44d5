//! In-memory result cache with category-driven freshness.
//!
//! Entries are keyed by the normalised query plus its [`QueryCategory`], so
//! the same text classified differently never collides. Storage and capacity
//! eviction are delegated to [`moka`]; freshness is decided here against an
//! injected [`Clock`] so tests can move time by hand. A stale entry is
//! logically absent from the moment its TTL passes, even while it still
//! occupies a slot until [`CacheStore::cleanup_expired`] runs.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use moka::future::Cache;
use moka::ops::compute::{CompResult, Op};
use serde::Serialize;

use crate::classify::QueryCategory;

/// Source of "now" for freshness checks.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to. For tests and simulations.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// A clock frozen at `start`.
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Move the clock forward by `secs` seconds (backwards if negative).
    pub fn advance_secs(&self, secs: i64) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += chrono::Duration::seconds(secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Utc::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cache key: lowercased, trimmed query text plus its category.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    query: String,
    category: QueryCategory,
}

impl CacheKey {
    /// Build a key. The query is trimmed and lowercased.
    pub fn new(query: &str, category: QueryCategory) -> Self {
        Self {
            query: query.trim().to_lowercase(),
            category,
        }
    }

    /// The normalised query text.
    pub fn query(&self) -> &str {
        &self.query
    }

    /// The category the query was classified under.
    pub fn category(&self) -> QueryCategory {
        self.category
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.query, self.category)
    }
}

/// One stored value and the data needed to judge its freshness.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// Cached value.
    pub value: V,
    /// When the value was stored.
    pub created_at: DateTime<Utc>,
    /// Lifetime taken from the key's category at insertion time.
    pub ttl_secs: u64,
}

impl<V> CacheEntry<V> {
    /// `now - created_at <= ttl`. Entries from "the future" (clock moved
    /// backwards) count as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        let age_ms = (now - self.created_at).num_milliseconds();
        let ttl_ms = i64::try_from(self.ttl_secs.saturating_mul(1000)).unwrap_or(i64::MAX);
        age_ms <= ttl_ms
    }
}

/// Snapshot of cache occupancy and effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    /// Entries physically stored.
    pub entries: u64,
    /// Stored entries still within their TTL.
    pub fresh: u64,
    /// Stored entries past their TTL, awaiting cleanup.
    pub expired: u64,
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing usable.
    pub misses: u64,
    /// `hits / (hits + misses)`, 0.0 before the first lookup.
    pub hit_rate: f64,
}

/// Concurrent cache of values keyed by [`CacheKey`].
///
/// Writes are last-writer-wins per key. A `get` racing with an eviction of
/// the same key sees either the old value or a miss.
pub struct CacheStore<V> {
    inner: Cache<CacheKey, Arc<CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("clock", &self.clock)
            .field("hits", &self.hits.load(Ordering::Relaxed))
            .field("misses", &self.misses.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl<V> CacheStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// A store holding at most `max_entries` values, using the wall clock.
    pub fn new(max_entries: u64) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    /// A store holding at most `max_entries` values, judged by `clock`.
    pub fn with_clock(max_entries: u64, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Cache::builder().max_capacity(max_entries).build(),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Fresh value for `key`, or `None` if absent or stale.
    ///
    /// Stale entries are left in place for [`Self::cleanup_expired`].
    pub async fn get(&self, key: &CacheKey) -> Option<V> {
        let now = self.clock.now();
        match self.inner.get(key).await {
            Some(entry) if entry.is_fresh(now) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(key = %key, "cache entry expired");
                None
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = %key, "cache miss");
                None
            }
        }
    }

    /// Store `value` under `key` with the TTL of the key's category,
    /// replacing any previous entry. Returns `false` without storing when the
    /// category has no TTL.
    pub async fn put(&self, key: CacheKey, value: V) -> bool {
        let ttl_secs = key.category.ttl_secs();
        if ttl_secs == 0 {
            return false;
        }
        let entry = CacheEntry {
            value,
            created_at: self.clock.now(),
            ttl_secs,
        };
        tracing::debug!(key = %key, ttl_secs, "cache store");
        // Shares the per-key compute lock with `cleanup_expired`.
        let entry = Arc::new(entry);
        self.inner
            .entry(key)
            .and_compute_with(move |_| async move { Op::Put(entry) })
            .await;
        true
    }

    /// Evict every stale entry and return how many were evicted.
    ///
    /// Each key is re-checked atomically at eviction time, so an entry
    /// refreshed by a concurrent `put` survives.
    pub async fn cleanup_expired(&self) -> usize {
        let now = self.clock.now();
        let stale: Vec<CacheKey> = self
            .inner
            .iter()
            .filter(|(_, entry)| !entry.is_fresh(now))
            .map(|(key, _)| CacheKey::clone(&key))
            .collect();

        let mut evicted = 0;
        for key in stale {
            let result = self
                .inner
                .entry(key)
                .and_compute_with(|current| async move {
                    match current {
                        Some(e) if !e.value().is_fresh(now) => Op::Remove,
                        _ => Op::Nop,
                    }
                })
                .await;
            if matches!(result, CompResult::Removed(_)) {
                evicted += 1;
            }
        }

        if evicted > 0 {
            tracing::debug!(evicted, "expired cache entries removed");
        }
        evicted
    }

    /// Evict every entry whose query contains `pattern` (case-insensitive),
    /// fresh or not, and return how many were evicted.
    pub async fn invalidate_by_pattern(&self, pattern: &str) -> usize {
        let needle = pattern.trim().to_lowercase();
        if needle.is_empty() {
            return 0;
        }
        let matching: Vec<CacheKey> = self
            .inner
            .iter()
            .filter(|(key, _)| key.query.contains(&needle))
            .map(|(key, _)| CacheKey::clone(&key))
            .collect();

        let mut evicted = 0;
        for key in matching {
            if self.inner.remove(&key).await.is_some() {
                evicted += 1;
            }
        }
        tracing::info!(pattern = %needle, evicted, "cache invalidated by pattern");
        evicted
    }

    /// Current occupancy and hit counters.
    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let (fresh, expired) = self
            .inner
            .iter()
            .fold((0u64, 0u64), |(fresh, expired), (_, entry)| {
                if entry.is_fresh(now) {
                    (fresh + 1, expired)
                } else {
                    (fresh, expired + 1)
                }
            });
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStats {
            entries: fresh + expired,
            fresh,
            expired,
            hits,
            misses,
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
        }
    }
}
