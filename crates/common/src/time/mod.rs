//! Time sources used by the cache for freshness checks.

mod clock;

#[cfg(any(feature = "test-utils", test))]
pub use clock::MockClock;
pub use clock::{Clock, SystemClock};
