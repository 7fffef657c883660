//! Time- and size-bounded caching of enrichment results.
//!
//! The enricher only depends on [`Cache`], so the in-process [`TtlCache`] can
//! be replaced by a shared cache without touching lookup logic.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::time::Duration;
use tracing::debug;

/// Default entry lifetime (1 hour).
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

/// Default maximum number of entries.
pub const DEFAULT_CAPACITY: usize = 100;

/// Get-or-compute cache keyed by string.
#[async_trait]
pub trait Cache<V>: Send + Sync
where
    V: Clone + Send + 'static,
{
    /// Cached value for `key`, or the result of `compute` (which is then stored).
    /// `compute` is only polled on a miss.
    async fn get_or_compute<'a>(&'a self, key: &'a str, compute: BoxFuture<'a, V>) -> V;
}

/// In-memory cache with per-entry expiry and a capacity bound, backed by `moka`.
///
/// Concurrent misses for the same key share one computation.
pub struct TtlCache<V> {
    inner: moka::future::Cache<String, V>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            inner: moka::future::Cache::builder()
                .max_capacity(capacity as u64)
                .time_to_live(ttl)
                .build(),
        }
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(DEFAULT_TTL, DEFAULT_CAPACITY)
    }
}

#[async_trait]
impl<V> Cache<V> for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get_or_compute<'a>(&'a self, key: &'a str, compute: BoxFuture<'a, V>) -> V {
        self.inner
            .get_with_by_ref(key, async move {
                debug!(key = key, "Cache miss");
                compute.await
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_compute_runs_once_per_key() {
        let cache: TtlCache<String> = TtlCache::default();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = cache
                .get_or_compute(
                    "Naruto",
                    async {
                        calls.fetch_add(1, Ordering::SeqCst);
                        "details".to_string()
                    }
                    .boxed(),
                )
                .await;
            assert_eq!(value, "details");
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache
            .get_or_compute(
                "Berserk",
                async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    "other".to_string()
                }
                .boxed(),
            )
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_computation() {
        let cache: TtlCache<u32> = TtlCache::default();
        let calls = AtomicUsize::new(0);
        let slow = |value: u32| {
            let calls = &calls;
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(50)).await;
                value
            }
            .boxed()
        };

        let (a, b) = tokio::join!(
            cache.get_or_compute("Naruto", slow(7)),
            cache.get_or_compute("Naruto", slow(8)),
        );

        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache: TtlCache<u32> = TtlCache::new(Duration::from_millis(50), 10);
        assert_eq!(cache.get_or_compute("a", async { 1 }.boxed()).await, 1);
        assert_eq!(cache.get_or_compute("a", async { 9 }.boxed()).await, 1);

        tokio::time::sleep(Duration::from_millis(120)).await;
        let recomputed = cache.get_or_compute("a", async { 2 }.boxed()).await;
        assert_eq!(recomputed, 2);
    }
}
