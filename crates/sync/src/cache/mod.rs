//! Process-wide query cache.
//!
//! Wraps a `moka` future cache keyed by [`QueryKey`]. Concurrent reads of the
//! same key are coalesced into a single fetch, and every invalidation is
//! broadcast so views can re-read the keys they display.
//!
//! A fetch that is still running when a matching invalidation happens is
//! superseded: its result goes back to the callers that awaited it but is not
//! kept in the cache, so the next read fetches again.
//!
//! The cache is an explicit service: build it once at startup with
//! [`QueryCache::new`], hand clones to whoever needs it, and call
//! [`QueryCache::shutdown`] on the way out.

mod keys;
mod value;

pub use keys::{Invalidation, QueryKey};
pub use value::{CacheValue, Cached};

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use moka::future::Cache;
use tokio::sync::broadcast;
use tracing::debug;

use crate::config::SyncConfig;

/// Emitted once per invalidation target, after matching entries are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEvent {
    /// Monotonic per-cache sequence number.
    pub epoch: u64,
    /// The target that was invalidated.
    pub target: Invalidation,
    /// How many cached entries it removed.
    pub evicted: usize,
}

/// Keyed store of resolved read results.
///
/// Cheaply cloneable; clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<QueryCacheInner>,
}

struct QueryCacheInner {
    entries: Cache<QueryKey, CacheValue>,
    events: broadcast::Sender<CacheEvent>,
    epoch: AtomicU64,
    /// Fetches currently running, by ticket.
    in_flight: Mutex<HashMap<u64, InFlight>>,
    next_ticket: AtomicU64,
}

struct InFlight {
    key: QueryKey,
    superseded: bool,
}

impl QueryCache {
    /// Create a new cache sized from `config`.
    #[must_use]
    pub fn new(config: &SyncConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.cache_capacity);
        if let Some(ttl) = config.cache_ttl {
            builder = builder.time_to_live(ttl);
        }

        let (events, _) = broadcast::channel(config.event_buffer);

        Self {
            inner: Arc::new(QueryCacheInner {
                entries: builder.build(),
                events,
                epoch: AtomicU64::new(0),
                in_flight: Mutex::new(HashMap::new()),
                next_ticket: AtomicU64::new(0),
            }),
        }
    }

    /// Return the cached value for `key`, running `fetch` on a miss.
    ///
    /// Concurrent callers for the same missing key share one `fetch`; the
    /// others wait for it and receive the same value. If a matching
    /// invalidation runs while `fetch` is pending, the value is returned but
    /// evicted again before this call completes.
    pub async fn get_or_fetch<F>(&self, key: QueryKey, fetch: F) -> CacheValue
    where
        F: Future<Output = CacheValue>,
    {
        let label = key.to_string();
        let mut ticket = None;
        let entry = self
            .inner
            .entries
            .entry(key.clone())
            .or_insert_with(async {
                ticket = Some(self.begin_fetch(&key));
                fetch.await
            })
            .await;

        let superseded = ticket.is_some_and(|ticket| self.finish_fetch(ticket));
        if superseded {
            self.inner.entries.invalidate(&key).await;
            debug!(key = %label, "Fetch superseded by invalidation, not cached");
        } else if entry.is_fresh() {
            debug!(key = %label, "Cache miss, fetched");
        } else {
            debug!(key = %label, "Cache hit");
        }

        entry.into_value()
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<u64, InFlight>> {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn begin_fetch(&self, key: &QueryKey) -> u64 {
        let ticket = self.inner.next_ticket.fetch_add(1, Ordering::Relaxed);
        self.in_flight().insert(
            ticket,
            InFlight {
                key: key.clone(),
                superseded: false,
            },
        );
        ticket
    }

    /// Forget a finished fetch. Returns true if it was superseded.
    fn finish_fetch(&self, ticket: u64) -> bool {
        self.in_flight()
            .remove(&ticket)
            .is_some_and(|fetch| fetch.superseded)
    }

    /// Look up `key` without fetching.
    pub async fn peek(&self, key: &QueryKey) -> Option<CacheValue> {
        self.inner.entries.get(key).await
    }

    /// Drop every entry covered by `target` and broadcast the invalidation.
    ///
    /// Returns the keys that were removed.
    pub async fn invalidate(&self, target: &Invalidation) -> Vec<QueryKey> {
        // Mark pending fetches before sweeping stored entries: a fetch that
        // lands after the sweep is evicted by its own caller.
        {
            let mut in_flight = self.in_flight();
            for fetch in in_flight.values_mut() {
                if target.matches(&fetch.key) {
                    fetch.superseded = true;
                }
            }
        }

        let stale: Vec<QueryKey> = self
            .inner
            .entries
            .iter()
            .filter(|(key, _)| target.matches(key))
            .map(|(key, _)| QueryKey::clone(&key))
            .collect();

        for key in &stale {
            self.inner.entries.invalidate(key).await;
        }

        let epoch = self.inner.epoch.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(invalidation = %target, evicted = stale.len(), epoch, "Invalidated cache entries");

        // No subscribers is fine.
        let _ = self.inner.events.send(CacheEvent {
            epoch,
            target: target.clone(),
            evicted: stale.len(),
        });

        stale
    }

    /// Subscribe to invalidation events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.inner.events.subscribe()
    }

    /// Approximate number of cached entries.
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entries.entry_count()
    }

    /// Number of invalidations performed so far.
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::Relaxed)
    }

    /// Drop every entry and flush moka's pending maintenance.
    pub async fn shutdown(&self) {
        self.inner.entries.invalidate_all();
        self.inner.entries.run_pending_tasks().await;
        debug!("Query cache shut down");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use recipe_box_core::RecipeId;
    use tokio::sync::oneshot;

    use super::*;

    fn cache() -> QueryCache {
        QueryCache::new(&SyncConfig::default())
    }

    #[tokio::test]
    async fn test_hit_skips_fetch() {
        let cache = cache();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_fetch(QueryKey::AllRecipes, async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    CacheValue::Recipes(Vec::new())
                })
                .await;
            assert!(matches!(value, CacheValue::Recipes(_)));
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_fetches_are_coalesced() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let reads = (0..8).map(|_| {
            let cache = cache.clone();
            let calls = Arc::clone(&calls);
            async move {
                cache
                    .get_or_fetch(QueryKey::Recipe(RecipeId::new(1)), async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        tokio::time::sleep(Duration::from_millis(20)).await;
                        CacheValue::Flag(true)
                    })
                    .await
            }
        });

        let values = futures::future::join_all(reads).await;
        assert_eq!(values.len(), 8);
        assert!(values.iter().all(|v| matches!(v, CacheValue::Flag(true))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_invalidate_removes_matching_entries_only() {
        let cache = cache();
        for exclude_own in [true, false] {
            cache
                .get_or_fetch(QueryKey::RecentRecipes { exclude_own }, async {
                    CacheValue::Recipes(Vec::new())
                })
                .await;
        }
        cache
            .get_or_fetch(QueryKey::AllRecipes, async { CacheValue::Recipes(Vec::new()) })
            .await;

        let removed = cache.invalidate(&Invalidation::RecentRecipes).await;

        assert_eq!(removed.len(), 2);
        assert!(cache.peek(&QueryKey::AllRecipes).await.is_some());
        assert!(
            cache
                .peek(&QueryKey::RecentRecipes { exclude_own: true })
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_invalidate_broadcasts_event() {
        let cache = cache();
        let mut events = cache.subscribe();

        cache.invalidate(&Invalidation::CallerProfile).await;

        let event = events.recv().await.expect("event");
        assert_eq!(event.target, Invalidation::CallerProfile);
        assert_eq!(event.evicted, 0);
        assert_eq!(event.epoch, 1);
        assert_eq!(cache.epoch(), 1);
    }

    #[tokio::test]
    async fn test_refetch_after_invalidation() {
        let cache = cache();
        let calls = AtomicUsize::new(0);
        let fetch = || async {
            calls.fetch_add(1, Ordering::SeqCst);
            CacheValue::Flag(false)
        };

        cache.get_or_fetch(QueryKey::IsCallerAdmin, fetch()).await;
        cache.invalidate(&Invalidation::IsCallerAdmin).await;
        cache.get_or_fetch(QueryKey::IsCallerAdmin, fetch()).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidation_during_fetch_is_not_cached() {
        let cache = cache();
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(QueryKey::AllRecipes, async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        CacheValue::Flag(false)
                    })
                    .await
            })
        };

        started_rx.await.expect("fetch started");
        cache.invalidate(&Invalidation::AllRecipes).await;
        release_tx.send(()).expect("fetch pending");

        let value = reader.await.expect("reader task");
        assert!(matches!(value, CacheValue::Flag(false)));
        assert!(cache.peek(&QueryKey::AllRecipes).await.is_none());

        let calls = AtomicUsize::new(0);
        cache
            .get_or_fetch(QueryKey::AllRecipes, async {
                calls.fetch_add(1, Ordering::SeqCst);
                CacheValue::Flag(true)
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unrelated_invalidation_keeps_pending_fetch() {
        let cache = cache();
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_fetch(QueryKey::Recipe(RecipeId::new(1)), async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        CacheValue::Flag(true)
                    })
                    .await
            })
        };

        started_rx.await.expect("fetch started");
        cache.invalidate(&Invalidation::Recipe(RecipeId::new(2))).await;
        cache.invalidate(&Invalidation::CallerProfile).await;
        release_tx.send(()).expect("fetch pending");
        reader.await.expect("reader task");

        assert!(cache.peek(&QueryKey::Recipe(RecipeId::new(1))).await.is_some());
    }

    #[tokio::test]
    async fn test_shutdown_clears_entries() {
        let cache = cache();
        cache
            .get_or_fetch(QueryKey::CallerRole, async {
                CacheValue::Role(recipe_box_core::UserRole::User)
            })
            .await;

        cache.shutdown().await;

        assert!(cache.peek(&QueryKey::CallerRole).await.is_none());
    }
}
