//! Cache configuration and builder.

use std::time::Duration;

/// What to drop when the cache is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionPolicy {
    /// Least recently read entry
    #[default]
    LRU,
    /// Least frequently read entry
    LFU,
    /// Oldest insertion
    FIFO,
    /// Never evict; inserts beyond capacity still succeed
    None,
}

/// Configuration for [`AsyncCache`](super::AsyncCache).
#[derive(Debug, Clone, Default)]
pub struct CacheConfig {
    /// Maximum number of entries (`None` = unlimited)
    pub max_size: Option<usize>,

    /// Default time-to-live (`None` = entries never go stale)
    pub ttl: Option<Duration>,

    /// Eviction policy once `max_size` is reached
    pub eviction_policy: EvictionPolicy,
}

impl CacheConfig {
    /// Start a builder.
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Unbounded cache whose entries expire after `ttl`.
    pub fn ttl(ttl: Duration) -> Self {
        Self { max_size: None, ttl: Some(ttl), eviction_policy: EvictionPolicy::None }
    }

    /// Bounded LRU cache without expiry.
    pub fn lru(max_size: usize) -> Self {
        Self { max_size: Some(max_size), ttl: None, eviction_policy: EvictionPolicy::LRU }
    }

    /// Bounded LRU cache whose entries also expire after `ttl`.
    pub fn ttl_lru(ttl: Duration, max_size: usize) -> Self {
        Self { max_size: Some(max_size), ttl: Some(ttl), eviction_policy: EvictionPolicy::LRU }
    }
}

/// Fluent builder for [`CacheConfig`].
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Cap the number of entries.
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = Some(size);
        self
    }

    /// Default time-to-live.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.config.ttl = Some(ttl);
        self
    }

    /// Eviction policy.
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.config.eviction_policy = policy;
        self
    }

    /// Finish.
    pub fn build(self) -> CacheConfig {
        self.config
    }
}
