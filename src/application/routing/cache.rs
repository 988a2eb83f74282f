//! Route cache
//!
//! Memoizes provider results by (origin, destination, mode) with
//! coordinates canonicalized to a `"lat,lng"` string. Concurrent misses
//! on the same key collapse into one upstream call: each key owns an
//! inner async mutex, so the first caller fetches while the rest wait
//! and then read the stored snapshot.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::route::{GeoPoint, RouteCacheEntry, TravelMode};
use crate::domain::DomainResult;
use crate::infrastructure::routing::RouteProvider;

/// Canonical `"lat,lng"` form, 6-decimal rounding
fn canonical_coord(p: GeoPoint) -> String {
    format!("{:.6},{:.6}", p.lat, p.lng)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    origin: String,
    destination: String,
    mode: TravelMode,
}

type Slot = Arc<Mutex<Option<RouteCacheEntry>>>;

pub struct RouteCache {
    provider: Arc<dyn RouteProvider>,
    ttl: Duration,
    slots: Mutex<HashMap<CacheKey, Slot>>,
}

impl RouteCache {
    /// `ttl` must be at least the provider rate-limit window; the
    /// configuration floor is 10 minutes.
    pub fn new(provider: Arc<dyn RouteProvider>, ttl: Duration) -> Self {
        Self {
            provider,
            ttl,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Cached lookup; delegates to the provider on miss or stale entry
    pub async fn lookup(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
        mode: TravelMode,
    ) -> DomainResult<RouteCacheEntry> {
        let key = CacheKey {
            origin: canonical_coord(origin),
            destination: canonical_coord(destination),
            mode,
        };

        let slot = {
            let mut slots = self.slots.lock().await;
            slots.entry(key.clone()).or_default().clone()
        };

        // Per-key lock: one fetch per key at a time
        let mut entry = slot.lock().await;
        if let Some(cached) = entry.as_ref() {
            let age = Utc::now().signed_duration_since(cached.fetched_at);
            if age.num_seconds() >= 0 && (age.num_seconds() as u64) < self.ttl.as_secs() {
                debug!("route cache hit: {} -> {}", key.origin, key.destination);
                return Ok(cached.clone());
            }
        }

        debug!("route cache miss: {} -> {}", key.origin, key.destination);
        let summary = self.provider.lookup(origin, destination, mode).await?;
        let fresh = RouteCacheEntry {
            summary,
            fetched_at: Utc::now(),
        };
        *entry = Some(fresh.clone());
        Ok(fresh)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::route::RouteSummary;

    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RouteProvider for CountingProvider {
        async fn lookup(
            &self,
            _origin: GeoPoint,
            _destination: GeoPoint,
            _mode: TravelMode,
        ) -> DomainResult<RouteSummary> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RouteSummary {
                distance_meters: 12_000.0,
                duration_seconds: 1_500.0,
                encoded_polyline: None,
                provider: "test",
            })
        }

        fn name(&self) -> &'static str {
            "test"
        }
    }

    fn cache_with_counter() -> (Arc<RouteCache>, Arc<CountingProvider>) {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let cache = Arc::new(RouteCache::new(
            provider.clone(),
            Duration::from_secs(600),
        ));
        (cache, provider)
    }

    fn sabana() -> GeoPoint {
        GeoPoint::new(4.8612, -74.0334)
    }

    fn portal() -> GeoPoint {
        GeoPoint::new(4.7546, -74.0459)
    }

    #[tokio::test]
    async fn second_lookup_hits_cache() {
        let (cache, provider) = cache_with_counter();
        cache
            .lookup(sabana(), portal(), TravelMode::Driving)
            .await
            .unwrap();
        cache
            .lookup(sabana(), portal(), TravelMode::Driving)
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn different_mode_is_a_different_key() {
        let (cache, provider) = cache_with_counter();
        cache
            .lookup(sabana(), portal(), TravelMode::Driving)
            .await
            .unwrap();
        cache
            .lookup(sabana(), portal(), TravelMode::Walking)
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn concurrent_misses_collapse_to_one_call() {
        let (cache, provider) = cache_with_counter();
        let (a, b) = tokio::join!(
            cache.lookup(sabana(), portal(), TravelMode::Driving),
            cache.lookup(sabana(), portal(), TravelMode::Driving),
        );
        a.unwrap();
        b.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn nearby_coordinates_normalize_to_one_key() {
        let (cache, provider) = cache_with_counter();
        cache
            .lookup(
                GeoPoint::new(4.8612000, -74.0334000),
                portal(),
                TravelMode::Driving,
            )
            .await
            .unwrap();
        cache
            .lookup(
                GeoPoint::new(4.86120004, -74.03340004),
                portal(),
                TravelMode::Driving,
            )
            .await
            .unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }
}
