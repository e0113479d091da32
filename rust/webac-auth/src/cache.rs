use std::{collections::HashMap, sync::Arc, time::Duration};

use parking_lot::{Condvar, Mutex, RwLock};
use sieve_cache::ShardedSieveCache;
use tracing::trace;
use web_time::Instant;
use webac_graph::ResourceId;

use crate::{CacheConfig, EffectiveAcl, WebacAuthError};

type Outcome = Result<Option<EffectiveAcl>, WebacAuthError>;

/// A memoizing cache of [EffectiveAcl]s keyed by the [ResourceId] they were
/// resolved for.
///
/// Only resolved ACLs are stored. A lookup that resolves to no ACL removes
/// whatever entry the key had, so the next lookup resolves again. Failed
/// resolutions are never stored.
///
/// Concurrent misses on the same key share one resolution: the first caller
/// computes while the others wait for its outcome. Should the computing
/// caller unwind before publishing, each waiter computes for itself.
///
/// [EffectiveAclCache::invalidate_all] starts a new generation. A resolution
/// that began in an earlier generation is handed to its callers but never
/// stored.
pub struct EffectiveAclCache {
    entries: ShardedSieveCache<ResourceId, (Instant, EffectiveAcl)>,
    ttl: Option<Duration>,
    generation: RwLock<u64>,
    in_flight: Mutex<HashMap<ResourceId, Arc<Flight>>>,
}

impl std::fmt::Debug for EffectiveAclCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectiveAclCache")
            .field("entries", &self.entries.len())
            .field("ttl", &self.ttl)
            .field("generation", &*self.generation.read())
            .finish()
    }
}

impl EffectiveAclCache {
    /// Create a cache sized by `config`.
    pub fn new(config: &CacheConfig) -> Result<Self, WebacAuthError> {
        let entries = ShardedSieveCache::new(config.capacity).map_err(|error| {
            WebacAuthError::Config(format!(
                "Cannot create a cache with capacity {}: {error}",
                config.capacity
            ))
        })?;

        Ok(Self {
            entries,
            ttl: config.ttl(),
            generation: RwLock::new(0),
            in_flight: Mutex::new(HashMap::new()),
        })
    }

    /// Look up the effective ACL of `id`, invoking `compute` on a miss.
    ///
    /// Anything `compute` derives from state that [EffectiveAclCache::invalidate_all]
    /// guards must be read inside `compute`.
    pub fn get<F>(
        &self,
        id: &ResourceId,
        compute: F,
    ) -> Result<Option<EffectiveAcl>, WebacAuthError>
    where
        F: FnOnce() -> Result<Option<EffectiveAcl>, WebacAuthError>,
    {
        if let Some(acl) = self.lookup(id) {
            trace!(resource = %id, "Effective ACL cache hit");
            return Ok(Some(acl));
        }

        let generation = *self.generation.read();

        let joined = {
            let mut in_flight = self.in_flight.lock();
            // A flight that finished while we waited for the lock has already
            // published to the cache.
            if let Some(acl) = self.lookup(id) {
                return Ok(Some(acl));
            }
            match in_flight.get(id) {
                Some(flight) => Ok(flight.clone()),
                None => {
                    let flight = Arc::new(Flight::default());
                    in_flight.insert(id.clone(), flight.clone());
                    Err(flight)
                }
            }
        };

        let flight = match joined {
            Ok(flight) => {
                trace!(resource = %id, "Waiting for in-flight effective ACL");
                return match flight.wait() {
                    Some(outcome) => outcome,
                    None => {
                        let outcome = compute();
                        self.store(generation, id, &outcome);
                        outcome
                    }
                };
            }
            Err(flight) => flight,
        };

        let landing = Landing {
            cache: self,
            id,
            flight,
        };
        let outcome = compute();
        landing.publish(generation, outcome.clone());
        outcome
    }

    /// Forget the entry for `id`.
    pub fn invalidate(&self, id: &ResourceId) {
        self.entries.remove(id);
    }

    /// Forget every entry, and keep resolutions already under way from
    /// storing what they find.
    pub fn invalidate_all(&self) {
        let mut generation = self.generation.write();
        *generation += 1;
        self.entries.clear();
        self.in_flight.lock().clear();
        trace!(generation = *generation, "Invalidated effective ACL cache");
    }

    /// The number of stored entries, including any that have expired but not
    /// yet been looked up.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, id: &ResourceId) -> Option<EffectiveAcl> {
        let (stored_at, acl) = self.entries.get(id)?;
        if let Some(ttl) = self.ttl {
            if stored_at.elapsed() >= ttl {
                self.entries.remove(id);
                return None;
            }
        }
        Some(acl)
    }

    fn store(&self, generation: u64, id: &ResourceId, outcome: &Outcome) {
        let current = self.generation.read();
        if *current != generation {
            trace!(resource = %id, "Discarding effective ACL from an earlier generation");
            return;
        }
        match outcome {
            Ok(Some(acl)) => {
                self.entries.insert(id.clone(), (Instant::now(), acl.clone()));
            }
            Ok(None) => {
                self.entries.remove(id);
            }
            Err(_) => (),
        }
    }
}

#[derive(Default)]
enum FlightState {
    #[default]
    Pending,
    Abandoned,
    Landed(Outcome),
}

#[derive(Default)]
struct Flight {
    state: Mutex<FlightState>,
    landed: Condvar,
}

impl Flight {
    fn wait(&self) -> Option<Outcome> {
        let mut state = self.state.lock();
        while matches!(*state, FlightState::Pending) {
            self.landed.wait(&mut state);
        }
        match &*state {
            FlightState::Landed(outcome) => Some(outcome.clone()),
            _ => None,
        }
    }
}

/// Retires the in-flight entry of a computing caller. Dropping it without
/// publishing (for example while unwinding) releases waiters to compute on
/// their own.
struct Landing<'a> {
    cache: &'a EffectiveAclCache,
    id: &'a ResourceId,
    flight: Arc<Flight>,
}

impl Landing<'_> {
    fn publish(self, generation: u64, outcome: Outcome) {
        // Retire first so that later callers consult the cache, not this
        // flight.
        self.retire();
        self.cache.store(generation, self.id, &outcome);
        self.land(FlightState::Landed(outcome));
    }

    fn retire(&self) {
        let mut in_flight = self.cache.in_flight.lock();
        if in_flight
            .get(self.id)
            .is_some_and(|flight| Arc::ptr_eq(flight, &self.flight))
        {
            in_flight.remove(self.id);
        }
    }

    fn land(&self, landed: FlightState) {
        let mut state = self.flight.state.lock();
        if matches!(*state, FlightState::Pending) {
            *state = landed;
            self.flight.landed.notify_all();
        }
    }
}

impl Drop for Landing<'_> {
    fn drop(&mut self) {
        self.retire();
        self.land(FlightState::Abandoned);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{AssertUnwindSafe, catch_unwind},
        sync::{
            Barrier,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use anyhow::Result;
    use webac_graph::{Resource, ResourceId, ResourceKind};

    use super::EffectiveAclCache;
    use crate::{Authorization, CacheConfig, EffectiveAcl, WebacAuthError};

    fn cache(ttl_seconds: Option<u64>) -> Result<EffectiveAclCache> {
        Ok(EffectiveAclCache::new(&CacheConfig {
            capacity: 64,
            ttl_seconds,
        })?)
    }

    fn effective_acl(path: &str) -> EffectiveAcl {
        EffectiveAcl::new(
            Resource::new(ResourceId::from_path(path), ResourceKind::Container),
            vec![Authorization::default()],
        )
    }

    #[test]
    fn it_reuses_a_resolved_acl() -> Result<()> {
        let cache = cache(None)?;
        let id = ResourceId::from_path("/a");
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(effective_acl("/a")))
        };

        let first = cache.get(&id, compute)?;
        let second = cache.get(&id, compute)?;

        assert_eq!(first, second);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);

        Ok(())
    }

    #[test]
    fn it_never_keeps_an_empty_result() -> Result<()> {
        let cache = cache(None)?;
        let id = ResourceId::from_path("/a");
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(None)
        };

        assert_eq!(cache.get(&id, compute)?, None);
        assert!(cache.in_flight.lock().is_empty());
        assert_eq!(cache.get(&id, compute)?, None);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty());

        Ok(())
    }

    #[test]
    fn it_drops_a_stale_entry_when_resolution_comes_back_empty() -> Result<()> {
        let cache = cache(None)?;
        let id = ResourceId::from_path("/a");

        cache.get(&id, || Ok(Some(effective_acl("/a"))))?;
        cache.invalidate(&id);
        cache.get(&id, || Ok(None))?;

        assert!(cache.is_empty());

        Ok(())
    }

    #[test]
    fn it_discards_a_resolution_that_straddles_invalidation() -> Result<()> {
        let cache = cache(None)?;
        let id = ResourceId::from_path("/a");

        let stale = cache.get(&id, || {
            cache.invalidate_all();
            Ok(Some(effective_acl("/a")))
        })?;

        assert_eq!(stale, Some(effective_acl("/a")));
        assert!(cache.is_empty());

        cache.get(&id, || Ok(Some(effective_acl("/a"))))?;
        assert_eq!(cache.len(), 1);

        Ok(())
    }

    #[test]
    fn it_does_not_cache_errors() -> Result<()> {
        let cache = cache(None)?;
        let id = ResourceId::from_path("/a");

        let failure = cache.get(&id, || Err(WebacAuthError::Graph("offline".into())));
        let recovered = cache.get(&id, || Ok(Some(effective_acl("/a"))))?;

        assert_eq!(failure, Err(WebacAuthError::Graph("offline".into())));
        assert!(recovered.is_some());

        Ok(())
    }

    #[test]
    fn it_expires_entries_after_their_ttl() -> Result<()> {
        let cache = EffectiveAclCache::new(&CacheConfig {
            capacity: 64,
            ttl_seconds: Some(0),
        })?;
        let id = ResourceId::from_path("/a");
        let calls = AtomicUsize::new(0);
        let compute = || {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(effective_acl("/a")))
        };

        cache.get(&id, compute)?;
        cache.get(&id, compute)?;

        assert_eq!(calls.load(Ordering::SeqCst), 2);

        Ok(())
    }

    #[test]
    fn it_collapses_concurrent_misses_into_one_resolution() -> Result<()> {
        let cache = cache(None)?;
        let id = ResourceId::from_path("/a");
        let calls = AtomicUsize::new(0);
        let threads = 8;
        let barrier = Barrier::new(threads);

        let results = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..threads)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cache.get(&id, || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(Duration::from_millis(50));
                            Ok(Some(effective_acl("/a")))
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread panicked"))
                .collect::<Vec<_>>()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        for result in results {
            assert_eq!(result?, Some(effective_acl("/a")));
        }

        Ok(())
    }

    #[test]
    fn it_recovers_when_the_computing_caller_panics() -> Result<()> {
        let cache = cache(None)?;
        let id = ResourceId::from_path("/a");

        let panicked = catch_unwind(AssertUnwindSafe(|| {
            cache.get(&id, || panic!("resolution failed"))
        }));
        let recovered = cache.get(&id, || Ok(Some(effective_acl("/a"))))?;

        assert!(panicked.is_err());
        assert!(recovered.is_some());

        Ok(())
    }

    #[test]
    fn it_rejects_a_zero_capacity() {
        assert!(
            EffectiveAclCache::new(&CacheConfig {
                capacity: 0,
                ttl_seconds: None,
            })
            .is_err()
        );
    }
}
