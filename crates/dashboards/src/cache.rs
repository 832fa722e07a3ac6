//! Memoization of assembled dashboard payloads.

use crate::views::ViewId;
use core_types::{Period, Risk, ViewFilter};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifies one computed dashboard: the view plus every input that shapes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub view: ViewId,
    pub sector: Option<String>,
    pub risk: Option<Risk>,
    pub period: Period,
}

impl CacheKey {
    pub fn new(view: ViewId, filter: &ViewFilter, period: Period) -> Self {
        Self {
            view,
            sector: filter.sector.clone(),
            risk: filter.risk,
            period,
        }
    }
}

/// How long a cached payload stays valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CachePolicy {
    /// Entries live as long as the process. The dataset is read-only, so they never go stale.
    #[default]
    ProcessLifetime,
    /// Entries are recomputed once they are older than the given duration.
    Ttl(Duration),
}

impl CachePolicy {
    pub fn from_ttl(ttl: Option<Duration>) -> Self {
        ttl.map_or(CachePolicy::ProcessLifetime, CachePolicy::Ttl)
    }
}

struct CachedEntry<V> {
    value: Arc<V>,
    stored_at: Instant,
}

/// A concurrent map from `CacheKey` to a shared, immutable payload.
pub struct ResultCache<V> {
    entries: DashMap<CacheKey, CachedEntry<V>>,
    policy: CachePolicy,
}

impl<V> ResultCache<V> {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy,
        }
    }

    fn is_fresh(&self, entry: &CachedEntry<V>) -> bool {
        match self.policy {
            CachePolicy::ProcessLifetime => true,
            CachePolicy::Ttl(ttl) => entry.stored_at.elapsed() < ttl,
        }
    }

    /// Returns the cached value for `key` if present and still fresh.
    pub fn get(&self, key: &CacheKey) -> Option<Arc<V>> {
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry))
            .map(|entry| Arc::clone(&entry.value))
    }

    /// Returns the cached value for `key`, computing and storing it on a miss.
    ///
    /// `compute` runs without any map lock held. Two racing misses for the same
    /// key may both compute; the results are identical and the later insert wins.
    /// A failed computation is not cached. Under a TTL policy every miss also
    /// evicts the entries that have gone stale.
    pub fn get_or_compute<E, F>(&self, key: CacheKey, compute: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(hit) = self.get(&key) {
            tracing::debug!(view = %key.view, "Cache hit.");
            return Ok(hit);
        }

        let value = Arc::new(compute()?);
        self.purge_expired();
        self.entries.insert(
            key,
            CachedEntry {
                value: Arc::clone(&value),
                stored_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Drops every entry that is no longer fresh.
    pub fn purge_expired(&self) {
        if let CachePolicy::Ttl(ttl) = self.policy {
            self.entries.retain(|_, entry| entry.stored_at.elapsed() < ttl);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new(CachePolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::convert::Infallible;

    fn key(sector: Option<&str>) -> CacheKey {
        let filter = ViewFilter::new(sector.map(str::to_string), None);
        CacheKey::new(ViewId::Summary, &filter, Period::Yearly)
    }

    #[test]
    fn second_lookup_reuses_the_first_result() {
        let cache: ResultCache<u32> = ResultCache::default();
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(7)
        };

        let first = cache.get_or_compute(key(None), compute).unwrap();
        let second = cache.get_or_compute(key(None), compute).unwrap();

        assert_eq!(calls.get(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn keys_differ_by_every_filter_field() {
        let cache: ResultCache<u32> = ResultCache::default();
        let base = ViewFilter::new(None, None);
        let keys = [
            CacheKey::new(ViewId::Summary, &base, Period::Yearly),
            CacheKey::new(ViewId::Summary, &base, Period::Quarterly),
            CacheKey::new(ViewId::SectorRisk, &base, Period::Yearly),
            CacheKey::new(ViewId::Summary, &ViewFilter::new(Some("Energy".into()), None), Period::Yearly),
            CacheKey::new(ViewId::Summary, &ViewFilter::new(None, Some(Risk::High)), Period::Yearly),
        ];
        for (i, k) in keys.into_iter().enumerate() {
            cache.get_or_compute(k, || Ok::<_, Infallible>(i as u32)).unwrap();
        }
        assert_eq!(cache.len(), 5);
    }

    #[test]
    fn failed_computation_is_not_stored() {
        let cache: ResultCache<u32> = ResultCache::default();
        let result = cache.get_or_compute(key(None), || Err::<u32, _>("boom"));
        assert_eq!(result, Err("boom"));
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_ttl_always_recomputes() {
        let cache: ResultCache<u32> = ResultCache::new(CachePolicy::Ttl(Duration::ZERO));
        let calls = Cell::new(0);
        let compute = || {
            calls.set(calls.get() + 1);
            Ok::<_, Infallible>(calls.get())
        };

        cache.get_or_compute(key(Some("Energy")), compute).unwrap();
        let second = cache.get_or_compute(key(Some("Energy")), compute).unwrap();

        assert_eq!(calls.get(), 2);
        assert_eq!(*second, 2);
        assert_eq!(cache.len(), 1);
        cache.purge_expired();
        assert!(cache.is_empty());
    }

    #[test]
    fn a_miss_evicts_stale_entries_of_other_keys() {
        let cache: ResultCache<u32> = ResultCache::new(CachePolicy::Ttl(Duration::ZERO));
        for (i, sector) in ["Energy", "Utilities", "Technology"].into_iter().enumerate() {
            cache.get_or_compute(key(Some(sector)), || Ok::<_, Infallible>(i as u32)).unwrap();
            assert_eq!(cache.len(), 1);
        }
        assert!(cache.get(&key(Some("Energy"))).is_none());
    }

    #[test]
    fn process_lifetime_entries_are_never_purged() {
        let cache: ResultCache<u32> = ResultCache::default();
        cache.get_or_compute(key(Some("Energy")), || Ok::<_, Infallible>(1)).unwrap();
        cache.get_or_compute(key(Some("Utilities")), || Ok::<_, Infallible>(2)).unwrap();
        cache.purge_expired();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn ttl_policy_is_built_from_optional_duration() {
        assert_eq!(CachePolicy::from_ttl(None), CachePolicy::ProcessLifetime);
        assert_eq!(
            CachePolicy::from_ttl(Some(Duration::from_secs(60))),
            CachePolicy::Ttl(Duration::from_secs(60))
        );
    }
}
