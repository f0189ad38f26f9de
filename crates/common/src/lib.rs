//! Shared runtime utilities for the DashSync crates.
//!
//! # Feature Tiers
//!
//! - `runtime`: async TTL cache and the [`time::Clock`] abstraction
//! - `test-utils`: exposes [`time::MockClock`] to downstream test suites

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

// Runtime tier
// --------------------------------------------------------------------
#[cfg(feature = "runtime")]
pub mod cache;
#[cfg(feature = "runtime")]
pub mod time;

#[cfg(feature = "runtime")]
pub use cache::{AsyncCache, CacheConfig, CacheConfigBuilder, CacheStats, EvictionPolicy};
#[cfg(any(feature = "test-utils", test))]
pub use time::MockClock;
#[cfg(feature = "runtime")]
pub use time::{Clock, SystemClock};
