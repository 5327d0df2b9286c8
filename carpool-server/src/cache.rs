//! Caching layer for geocoding lookups.
//!
//! Nominatim asks clients to avoid repeating identical queries, and a trip
//! plan tends to reverse-geocode the same handful of points repeatedly.
//! Successful lookups are cached in memory; failures are not, so a
//! transient error is retried on the next request.
//!
//! Reverse lookups are keyed on the coordinate rounded to six decimal places
//! (about 0.1 m), which bounds cache cardinality for jittery map clicks.

use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::debug;

use crate::domain::Coordinate;
use crate::geocode::Geocoder;

/// Cache key for reverse lookups: coordinate in micro-degrees.
type ReverseKey = (i64, i64);

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries per lookup direction.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_capacity: 10_000,
        }
    }
}

fn reverse_key(coordinate: &Coordinate) -> ReverseKey {
    (
        (coordinate.lat() * 1e6).round() as i64,
        (coordinate.lng() * 1e6).round() as i64,
    )
}

fn forward_key(address: &str) -> String {
    address.trim().to_lowercase()
}

/// Geocoder with an in-memory cache.
///
/// Wraps any [`Geocoder`] and caches its successful results.
pub struct CachedGeocoder<G> {
    inner: G,
    forward: MokaCache<String, Coordinate>,
    reverse: MokaCache<ReverseKey, String>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// Create a new cached geocoder.
    pub fn new(inner: G, config: &CacheConfig) -> Self {
        let forward = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();
        let reverse = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            inner,
            forward,
            reverse,
        }
    }

    /// Access the underlying geocoder for lookups that bypass the cache.
    pub fn inner(&self) -> &G {
        &self.inner
    }
}

impl<G> Geocoder for CachedGeocoder<G>
where
    G: Geocoder + Sync,
{
    async fn geocode(&self, address: &str) -> Option<Coordinate> {
        let key = forward_key(address);
        if let Some(hit) = self.forward.get(&key).await {
            debug!(address, "Geocode cache hit");
            return Some(hit);
        }

        let coordinate = self.inner.geocode(address).await?;
        self.forward.insert(key, coordinate).await;
        Some(coordinate)
    }

    async fn reverse_geocode(&self, coordinate: Coordinate) -> String {
        let key = reverse_key(&coordinate);
        if let Some(hit) = self.reverse.get(&key).await {
            debug!(coordinate = %coordinate, "Reverse geocode cache hit");
            return hit;
        }

        let name = self.inner.reverse_geocode(coordinate).await;
        if !name.is_empty() {
            self.reverse.insert(key, name.clone()).await;
        }
        name
    }
}
