//! Concurrency-safe, TTL- and size-bounded cache of resolved SDK configs.
//!
//! All state (entries plus the janitor latch) sits behind one mutex. The lock
//! is never held across an `.await`: a miss computes its value unlocked and
//! re-checks before inserting, so concurrent misses on the same key may both
//! compute but only one value is ever stored.
//!
//! Entries live in an [`LruCache`] ordered by recency. Every touch refreshes
//! `last_used` under the lock, so the LRU tail is always the entry with the
//! oldest timestamp. Capacity eviction and TTL expiry both work from the tail.

use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use lru::LruCache;
use sdkcache_core::{CacheConfig, ConfigError};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::key::CacheKey;

struct CacheEntry<V> {
    value: V,
    last_used: Instant,
}

/// Janitor latch. Moves forward only: `Idle -> Running -> Stopped`.
enum JanitorState {
    Idle,
    Running(CancellationToken),
    Stopped,
}

struct CacheState<V> {
    entries: LruCache<CacheKey, CacheEntry<V>>,
    janitor: JanitorState,
}

/// Cache from [`CacheKey`] to a resolved config value.
pub struct ConfigCache<V> {
    state: Mutex<CacheState<V>>,
    ttl: Duration,
    max_entries: NonZeroUsize,
}

impl<V: Clone> ConfigCache<V> {
    pub fn new(ttl: Duration, max_entries: NonZeroUsize) -> Self {
        Self {
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                janitor: JanitorState::Idle,
            }),
            ttl,
            max_entries,
        }
    }

    /// Build from validated [`CacheConfig`] knobs.
    pub fn from_config(config: &CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let max_entries =
            NonZeroUsize::new(config.max_entries).ok_or_else(|| ConfigError::InvalidValue {
                key: "AWS_CONFIG_CACHE_MAX_ENTRIES",
                reason: "must be greater than zero".to_string(),
            })?;
        Ok(Self::new(config.ttl(), max_entries))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries.get()
    }

    /// Janitor period: a fifth of the TTL.
    pub fn scan_interval(&self) -> Duration {
        (self.ttl / 5).max(Duration::from_millis(1))
    }

    // The map is consistent between statements, so a poisoned lock is safe to reuse.
    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up `key`, refreshing its timestamp in the same critical section.
    pub fn get(&self, key: &CacheKey) -> Option<V> {
        let mut state = self.lock();
        let entry = state.entries.get_mut(key)?;
        entry.last_used = Instant::now();
        Some(entry.value.clone())
    }

    /// Whether `key` is cached. Does not count as a use.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().entries.contains(key)
    }

    /// Return the cached value for `key`, or compute, store and return it.
    ///
    /// `compute` runs without the lock. If another caller stored the same key
    /// in the meantime, the freshly computed value is dropped and the stored
    /// one returned. A failed `compute` leaves the cache untouched and its
    /// error is returned as-is.
    pub async fn get_or_insert_with<F, Fut, E>(&self, key: &CacheKey, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            debug!(cache_key = %key.short(), "cache hit");
            return Ok(value);
        }

        debug!(cache_key = %key.short(), "cache miss, computing value");
        let value = compute().await?;

        let mut state = self.lock();
        if let Some(existing) = state.entries.get_mut(key) {
            existing.last_used = Instant::now();
            debug!(cache_key = %key.short(), "using value stored by a concurrent caller");
            return Ok(existing.value.clone());
        }

        state.entries.put(
            key.clone(),
            CacheEntry {
                value: value.clone(),
                last_used: Instant::now(),
            },
        );
        self.enforce_capacity(&mut state);
        Ok(value)
    }

    /// Insert or replace `key` unconditionally, then enforce capacity.
    pub fn insert(&self, key: CacheKey, value: V) {
        let mut state = self.lock();
        state.entries.put(
            key,
            CacheEntry {
                value,
                last_used: Instant::now(),
            },
        );
        self.enforce_capacity(&mut state);
    }

    /// Remove `key`. Returns whether it was present.
    pub fn remove(&self, key: &CacheKey) -> bool {
        let removed = self.lock().entries.pop(key).is_some();
        debug!(cache_key = %key.short(), removed, "cache entry removal");
        removed
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        let mut state = self.lock();
        let count = state.entries.len();
        state.entries.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// Snapshot of cached keys, most recently used first.
    pub fn keys(&self) -> Vec<CacheKey> {
        self.lock().entries.iter().map(|(k, _)| k.clone()).collect()
    }

    /// Remove every entry idle for longer than the TTL. Returns the count.
    ///
    /// Walks from the LRU tail and stops at the first fresh entry, so the lock
    /// is held only for the entries actually expiring.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut state = self.lock();
        let mut removed = 0;

        while let Some((_, entry)) = state.entries.peek_lru() {
            if now.saturating_duration_since(entry.last_used) <= self.ttl {
                break;
            }
            if let Some((key, _)) = state.entries.pop_lru() {
                debug!(cache_key = %key.short(), "removed stale config from cache");
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(removed, remaining = state.entries.len(), "expired cache entries evicted");
        }
        removed
    }

    /// Evict the least recently used entry when over capacity.
    ///
    /// Inserts grow the map by one, so one eviction restores the bound. The
    /// entry just inserted sits at the head and is never the victim.
    fn enforce_capacity(&self, state: &mut CacheState<V>) {
        if state.entries.len() <= self.max_entries.get() {
            return;
        }
        if let Some((key, _)) = state.entries.pop_lru() {
            debug!(
                cache_key = %key.short(),
                max_entries = self.max_entries.get(),
                "evicted oldest config to stay under limit"
            );
        }
    }

    /// Whether the background janitor is currently running.
    pub fn janitor_running(&self) -> bool {
        matches!(self.lock().janitor, JanitorState::Running(_))
    }

    /// Stop the janitor. Later calls to [`start_janitor`](Self::start_janitor)
    /// are no-ops. Returns whether a running janitor was stopped.
    pub fn stop_janitor(&self) -> bool {
        let previous = std::mem::replace(&mut self.lock().janitor, JanitorState::Stopped);
        match previous {
            JanitorState::Running(token) => {
                token.cancel();
                info!("config cache janitor stopped");
                true
            }
            JanitorState::Idle | JanitorState::Stopped => false,
        }
    }
}

impl<V: Clone + Send + 'static> ConfigCache<V> {
    /// Spawn the background janitor on the current tokio runtime.
    ///
    /// Idempotent: returns `false` if a janitor is already running, was
    /// stopped before, or no runtime is available.
    pub fn start_janitor(self: &Arc<Self>) -> bool {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("no tokio runtime, config cache janitor not started");
            return false;
        };

        let token = {
            let mut state = self.lock();
            if !matches!(state.janitor, JanitorState::Idle) {
                return false;
            }
            let token = CancellationToken::new();
            state.janitor = JanitorState::Running(token.clone());
            token
        };

        let period = self.scan_interval();
        handle.spawn(run_janitor(Arc::downgrade(self), period, token));
        info!(
            ttl_secs = self.ttl.as_secs(),
            scan_every_ms = period.as_millis() as u64,
            "config cache janitor started"
        );
        true
    }
}

impl<V> Drop for ConfigCache<V> {
    fn drop(&mut self) {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let JanitorState::Running(token) = &state.janitor {
            token.cancel();
        }
    }
}

/// Janitor loop: scan on every tick until stopped or the cache is gone.
async fn run_janitor<V: Clone + Send + 'static>(
    cache: Weak<ConfigCache<V>>,
    period: Duration,
    stop: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Skip the immediate first tick
    ticker.tick().await;

    loop {
        tokio::select! {
            biased;
            _ = stop.cancelled() => break,
            _ = ticker.tick() => {
                let Some(cache) = cache.upgrade() else { break };
                debug!("cleaning up stale AWS configs");
                cache.evict_expired();
            }
        }
    }

    debug!("config cache janitor exited");
}
