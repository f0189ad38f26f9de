//! Async cache backed by `tokio::sync::RwLock`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tracing::trace;

use super::config::{CacheConfig, EvictionPolicy};
use super::stats::{CacheStats, MetricsCollector};
use crate::time::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    last_accessed: Instant,
    access_count: u64,
    insertion_order: u64,
    ttl: Option<Duration>,
}

#[derive(Debug)]
struct CacheStorage<K, V> {
    data: HashMap<K, CacheEntry<V>>,
    insertion_counter: u64,
}

/// Async cache with TTL freshness, optional capacity bound and predicate
/// invalidation.
///
/// Clones share storage and counters.
pub struct AsyncCache<K, V, C = SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    storage: Arc<RwLock<CacheStorage<K, V>>>,
    config: CacheConfig,
    metrics: MetricsCollector,
    clock: C,
}

impl<K, V> AsyncCache<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Cache driven by the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }
}

impl<K, V, C> AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    /// Cache driven by an explicit clock.
    pub fn with_clock(config: CacheConfig, clock: C) -> Self {
        Self {
            storage: Arc::new(RwLock::new(CacheStorage {
                data: HashMap::new(),
                insertion_counter: 0,
            })),
            config,
            metrics: MetricsCollector::default(),
            clock,
        }
    }

    /// Insert using the configured default TTL.
    pub async fn insert(&self, key: K, value: V) {
        self.insert_entry(key, value, self.config.ttl).await;
    }

    /// Insert with a TTL that overrides the configured default.
    pub async fn insert_with_ttl(&self, key: K, value: V, ttl: Duration) {
        self.insert_entry(key, value, Some(ttl)).await;
    }

    async fn insert_entry(&self, key: K, value: V, ttl: Option<Duration>) {
        let now = self.clock.now();
        let mut storage = self.storage.write().await;

        if let Some(max_size) = self.config.max_size {
            if storage.data.len() >= max_size && !storage.data.contains_key(&key) {
                self.evict_one(&mut storage);
            }
        }

        let entry = CacheEntry {
            value,
            inserted_at: now,
            last_accessed: now,
            access_count: 0,
            insertion_order: storage.insertion_counter,
            ttl,
        };
        storage.insertion_counter += 1;
        storage.data.insert(key, entry);
        self.metrics.record_insert();
    }

    /// Fresh value for `key`, if any. Stale entries are dropped on read.
    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut storage = self.storage.write().await;

        let expired = match storage.data.get(key) {
            Some(entry) => self.is_expired(entry, now),
            None => {
                self.metrics.record_miss();
                return None;
            }
        };

        if expired {
            storage.data.remove(key);
            self.metrics.record_expirations(1);
            self.metrics.record_miss();
            return None;
        }

        let entry = storage.data.get_mut(key)?;
        entry.last_accessed = now;
        entry.access_count += 1;
        self.metrics.record_hit();
        Some(entry.value.clone())
    }

    /// Remove `key`, returning its value even if stale.
    pub async fn remove(&self, key: &K) -> Option<V> {
        let mut storage = self.storage.write().await;
        storage.data.remove(key).map(|entry| entry.value)
    }

    /// Whether a fresh entry exists for `key`. Does not count as a read.
    pub async fn contains_key(&self, key: &K) -> bool {
        let now = self.clock.now();
        let storage = self.storage.read().await;
        storage.data.get(key).is_some_and(|entry| !self.is_expired(entry, now))
    }

    /// Number of stored entries, stale ones included.
    pub async fn len(&self) -> usize {
        self.storage.read().await.data.len()
    }

    /// `true` when nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.storage.read().await.data.is_empty()
    }

    /// Remove every entry whose key matches `predicate` and return the
    /// removed keys. Stale entries are removed too and counted as
    /// invalidated.
    pub async fn invalidate_where<F>(&self, mut predicate: F) -> Vec<K>
    where
        F: FnMut(&K) -> bool,
    {
        let mut storage = self.storage.write().await;
        let doomed: Vec<K> = storage.data.keys().filter(|key| predicate(key)).cloned().collect();

        for key in &doomed {
            storage.data.remove(key);
        }

        self.metrics.record_invalidations(doomed.len() as u64);
        doomed
    }

    /// Remove stale entries and return how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut storage = self.storage.write().await;
        let before = storage.data.len();
        storage.data.retain(|_, entry| !self.is_expired(entry, now));
        let removed = before - storage.data.len();
        self.metrics.record_expirations(removed as u64);
        removed
    }

    /// Counter snapshot. Size reads 0 if the lock is busy.
    pub fn stats(&self) -> CacheStats {
        let size = self.storage.try_read().map(|s| s.data.len()).unwrap_or(0);
        self.metrics.snapshot(size, self.config.max_size)
    }

    fn is_expired(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        entry
            .ttl
            .or(self.config.ttl)
            .is_some_and(|ttl| now.duration_since(entry.inserted_at) > ttl)
    }

    fn evict_one(&self, storage: &mut CacheStorage<K, V>) {
        let victim = match self.config.eviction_policy {
            EvictionPolicy::LRU => storage
                .data
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone()),
            EvictionPolicy::LFU => storage
                .data
                .iter()
                .min_by_key(|(_, entry)| entry.access_count)
                .map(|(key, _)| key.clone()),
            EvictionPolicy::FIFO => storage
                .data
                .iter()
                .min_by_key(|(_, entry)| entry.insertion_order)
                .map(|(key, _)| key.clone()),
            EvictionPolicy::None => None,
        };

        if let Some(key) = victim {
            storage.data.remove(&key);
            self.metrics.record_eviction();
            trace!(policy = ?self.config.eviction_policy, "evicted cache entry");
        }
    }
}

impl<K, V, C> Clone for AsyncCache<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: Clock + Clone,
{
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
            config: self.config.clone(),
            metrics: self.metrics.clone(),
            clock: self.clock.clone(),
        }
    }
}
