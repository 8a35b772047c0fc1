//! Single-slot challenge cache with TTL expiry and in-flight request
//! deduplication.
//!
//! At most one cache entry and at most one in-flight load exist per cache
//! instance. The cache is constructor-injected (never module-level state)
//! so independent instances can live side by side in tests. Expiry is
//! evaluated at read time; no background timer runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::core::types::{Challenge, Level, Mode};
use crate::errors::{EngineError, EngineResult};

/// Default entry lifetime: five minutes.
pub const CHALLENGE_TTL: Duration = Duration::from_secs(300);

/// A load future shared between a prefetch and any caller that attaches
/// to the same network round-trip.
pub type SharedChallengeLoad = Shared<BoxFuture<'static, EngineResult<Challenge>>>;

/// Source of fresh challenges; the content provider chain in production,
/// a mock in tests.
#[async_trait]
pub trait ChallengeLoader: Send + Sync {
    async fn load(&self, level: Level, mode: Mode) -> EngineResult<Challenge>;
}

struct CacheEntry {
    challenge: Challenge,
    created_at: Instant,
    level: Level,
    mode: Mode,
}

struct InFlight {
    level: Level,
    mode: Mode,
    generation: u64,
    future: SharedChallengeLoad,
}

/// The mutable slots: one cache entry, one in-flight load. Shared with
/// the settler task each load spawns. The generation counter lets a
/// settler tell whether the in-flight slot still holds its own load
/// before clearing it.
struct Slots {
    entry: Mutex<Option<CacheEntry>>,
    in_flight: Mutex<Option<InFlight>>,
    generation: AtomicU64,
}

/// Single-slot, key-scoped challenge cache.
pub struct ChallengeCache {
    loader: Arc<dyn ChallengeLoader>,
    ttl: Duration,
    slots: Arc<Slots>,
}

impl ChallengeCache {
    pub fn new(loader: Arc<dyn ChallengeLoader>) -> Self {
        Self::with_ttl(loader, CHALLENGE_TTL)
    }

    pub fn with_ttl(loader: Arc<dyn ChallengeLoader>, ttl: Duration) -> Self {
        Self {
            loader,
            ttl,
            slots: Arc::new(Slots {
                entry: Mutex::new(None),
                in_flight: Mutex::new(None),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Returns the cached challenge only if it matches `(level, mode)` and
    /// is younger than the TTL. A key mismatch is treated identically to
    /// an expired entry. No side effects: a stale entry is rejected by the
    /// validity check, not evicted early.
    pub fn get_cached(&self, level: Level, mode: Mode) -> Option<Challenge> {
        let entry = self.slots.entry.lock();
        match entry.as_ref() {
            Some(e) if e.level == level && e.mode == mode && e.created_at.elapsed() < self.ttl => {
                debug!(level = level.as_str(), mode = mode.as_str(), "Cache hit");
                Some(e.challenge.clone())
            }
            Some(_) => {
                debug!(
                    level = level.as_str(),
                    mode = mode.as_str(),
                    "Cache miss (stale or key mismatch)"
                );
                None
            }
            None => None,
        }
    }

    /// Exposes the shared in-flight future for this key, if any, so a
    /// caller can await the round-trip a prefetch already started instead
    /// of duplicating it.
    pub fn get_in_flight(&self, level: Level, mode: Mode) -> Option<SharedChallengeLoad> {
        let in_flight = self.slots.in_flight.lock();
        in_flight
            .as_ref()
            .filter(|load| load.level == level && load.mode == mode)
            .map(|load| load.future.clone())
    }

    /// Unconditionally drops the cache entry and any in-flight reference,
    /// forcing the next request to hit the network.
    pub fn clear(&self) {
        *self.slots.entry.lock() = None;
        *self.slots.in_flight.lock() = None;
        debug!("Challenge cache cleared");
    }

    /// Fire-and-forget speculative load. A no-op when a valid entry exists
    /// or a request is already in flight. Never surfaces errors: a failed
    /// prefetch simply leaves the cache empty. The in-flight check and the
    /// slot write happen under one lock acquisition, so two truly parallel
    /// prefetches cannot both start loads.
    pub fn prefetch(&self, level: Level, mode: Mode) {
        if self.get_cached(level, mode).is_some() {
            return;
        }
        let mut in_flight = self.slots.in_flight.lock();
        if in_flight.is_some() {
            debug!("Prefetch skipped: request already in flight");
            return;
        }
        self.begin_load_locked(&mut in_flight, level, mode);
    }

    /// Explicit load: cache hit, else attach to the in-flight request for
    /// the same key, else start a fresh load. On an error the entry is
    /// dropped, and the failed load's own in-flight reference with it, so
    /// a subsequent retry is guaranteed to hit the network.
    pub async fn get_or_fetch(&self, level: Level, mode: Mode) -> EngineResult<Challenge> {
        if let Some(challenge) = self.get_cached(level, mode) {
            return Ok(challenge);
        }

        let (generation, future) = {
            let mut in_flight = self.slots.in_flight.lock();
            match in_flight
                .as_ref()
                .filter(|load| load.level == level && load.mode == mode)
            {
                Some(load) => {
                    debug!("Attaching to in-flight challenge load");
                    (load.generation, load.future.clone())
                }
                None => self.begin_load_locked(&mut in_flight, level, mode),
            }
        };

        match future.await {
            Ok(challenge) => Ok(challenge),
            Err(err) => {
                // Only the failed load's own in-flight reference is
                // dropped; a newer load that replaced it keeps its dedup
                // slot.
                *self.slots.entry.lock() = None;
                let mut in_flight = self.slots.in_flight.lock();
                if in_flight
                    .as_ref()
                    .is_some_and(|load| load.generation == generation)
                {
                    *in_flight = None;
                }
                Err(err)
            }
        }
    }

    /// Starts a load, records it in the caller-held in-flight slot, and
    /// spawns a settler that drives the shared future to completion even
    /// if every external awaiter goes away. The settler writes the entry
    /// on success and releases the slot, unless a newer load has taken it.
    fn begin_load_locked(
        &self,
        slot: &mut Option<InFlight>,
        level: Level,
        mode: Mode,
    ) -> (u64, SharedChallengeLoad) {
        let loader = self.loader.clone();
        let future: SharedChallengeLoad = async move { loader.load(level, mode).await }
            .boxed()
            .shared();

        let generation = self.slots.generation.fetch_add(1, Ordering::Relaxed);
        *slot = Some(InFlight {
            level,
            mode,
            generation,
            future: future.clone(),
        });

        let slots = Arc::clone(&self.slots);
        let settle = future.clone();
        tokio::spawn(async move {
            let result = settle.await;

            // A newer load may have replaced this one after a clear();
            // a superseded load must neither overwrite the newer load's
            // entry nor drop its in-flight reference. The entry is written
            // before the in-flight slot is released so a concurrent caller
            // always sees one or the other.
            let mut in_flight = slots.in_flight.lock();
            let current = in_flight
                .as_ref()
                .is_some_and(|load| load.generation == generation);

            match result {
                Ok(challenge) if current => {
                    info!(
                        level = level.as_str(),
                        mode = mode.as_str(),
                        topic = %challenge.topic,
                        "Challenge load settled, populating cache"
                    );
                    // Population is atomic: text and audio arrive together
                    // inside the Challenge, so no partial entry is ever
                    // observable.
                    *slots.entry.lock() = Some(CacheEntry {
                        challenge,
                        created_at: Instant::now(),
                        level,
                        mode,
                    });
                }
                Ok(challenge) => {
                    debug!(
                        topic = %challenge.topic,
                        "Superseded challenge load settled, result discarded"
                    );
                }
                Err(err) => {
                    warn!(
                        level = level.as_str(),
                        mode = mode.as_str(),
                        error = %err,
                        "Challenge load failed"
                    );
                }
            }

            if current {
                *in_flight = None;
            }
        });

        (generation, future)
    }
}
