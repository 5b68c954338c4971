// Candidate pool cache keyed by period and prediction settings.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::candidate::CandidatePool;
use crate::error::Result;
use crate::predict::PredictionMethod;

/// What a cached pool was built for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PoolKey {
    pub period: u32,
    pub method: PredictionMethod,
    pub params: BTreeMap<String, String>,
}

impl PoolKey {
    pub fn new(period: u32, method: PredictionMethod) -> Self {
        Self {
            period,
            method,
            params: BTreeMap::new(),
        }
    }

    pub fn with_param(mut self, name: &str, value: impl ToString) -> Self {
        self.params.insert(name.to_string(), value.to_string());
        self
    }
}

type Slot = Arc<Mutex<Option<Arc<CandidatePool>>>>;

/// Shares built pools across selection runs. Each key has its own slot, so
/// at most one build per key is in flight and builds for different keys do
/// not wait on each other. Failed builds are not cached.
#[derive(Debug, Default)]
pub struct PoolCache {
    slots: Mutex<HashMap<PoolKey, Slot>>,
}

impl PoolCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &PoolKey) -> Slot {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry(key.clone()).or_default().clone()
    }

    /// Return the cached pool for `key`, building it with `build` if absent.
    pub fn get_or_build<F>(&self, key: &PoolKey, build: F) -> Result<Arc<CandidatePool>>
    where
        F: FnOnce() -> Result<CandidatePool>,
    {
        let slot = self.slot(key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(pool) = guard.as_ref() {
            debug!(period = key.period, method = %key.method, "pool cache hit");
            return Ok(Arc::clone(pool));
        }
        let pool = Arc::new(build()?);
        debug!(
            period = key.period,
            method = %key.method,
            candidates = pool.len(),
            "pool cached"
        );
        *guard = Some(Arc::clone(&pool));
        Ok(pool)
    }

    pub fn get(&self, key: &PoolKey) -> Option<Arc<CandidatePool>> {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(key).cloned()
        }?;
        let guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        guard.clone()
    }

    pub fn invalidate(&self, key: &PoolKey) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.remove(key);
    }

    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SelectionError;
    use crate::fixtures::league_pool;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn key(period: u32) -> PoolKey {
        PoolKey::new(period, PredictionMethod::MedianPastScore)
            .with_param("n_previous_weeks", 5)
            .with_param("min_required_weeks", 3)
    }

    #[test]
    fn builds_once_per_key() {
        let cache = PoolCache::new();
        let builds = AtomicUsize::new(0);
        let build = || {
            builds.fetch_add(1, Ordering::SeqCst);
            Ok(league_pool())
        };
        let a = cache.get_or_build(&key(3), build).unwrap();
        let b = cache.get_or_build(&key(3), build).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(builds.load(Ordering::SeqCst), 1);

        cache.get_or_build(&key(4), build).unwrap();
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn params_are_part_of_the_key() {
        let other = key(3).with_param("n_previous_weeks", 6);
        assert_ne!(key(3), other);
    }

    #[test]
    fn concurrent_callers_share_one_build() {
        let cache = PoolCache::new();
        let builds = AtomicUsize::new(0);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    cache
                        .get_or_build(&key(5), || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            Ok(league_pool())
                        })
                        .unwrap();
                });
            }
        });
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = PoolCache::new();
        let err = cache
            .get_or_build(&key(2), || {
                Err(SelectionError::DataPrecondition("no data".into()))
            })
            .unwrap_err();
        assert!(matches!(err, SelectionError::DataPrecondition(_)));
        assert!(cache.get(&key(2)).is_none());
        let pool = cache.get_or_build(&key(2), || Ok(league_pool())).unwrap();
        assert_eq!(pool.len(), 60);
    }

    #[test]
    fn invalidate_and_clear_force_rebuilds() {
        let cache = PoolCache::new();
        cache.get_or_build(&key(1), || Ok(league_pool())).unwrap();
        cache.get_or_build(&key(2), || Ok(league_pool())).unwrap();
        cache.invalidate(&key(1));
        assert!(cache.get(&key(1)).is_none());
        assert!(cache.get(&key(2)).is_some());
        cache.clear();
        assert!(cache.get(&key(2)).is_none());
    }
}
