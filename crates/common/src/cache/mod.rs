//! Async key/value cache with TTL freshness and bounded capacity.
//!
//! The cache backs the analytics layer: entries carry an insertion instant
//! that acts as their freshness marker, a per-entry TTL may override the
//! configured default, and callers can drop whole groups of keys with
//! [`AsyncCache::invalidate_where`].
//!
//! ```
//! use std::time::Duration;
//!
//! use dashsync_common::cache::{AsyncCache, CacheConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache: AsyncCache<String, u32> =
//!     AsyncCache::new(CacheConfig::ttl_lru(Duration::from_secs(60), 128));
//!
//! cache.insert("campaigns".to_string(), 7).await;
//! assert_eq!(cache.get(&"campaigns".to_string()).await, Some(7));
//!
//! let removed = cache.invalidate_where(|key| key.starts_with("camp")).await;
//! assert_eq!(removed.len(), 1);
//! # }
//! ```

mod async_core;
mod config;
mod stats;

pub use async_core::AsyncCache;
pub use config::{CacheConfig, CacheConfigBuilder, EvictionPolicy};
pub use stats::CacheStats;
