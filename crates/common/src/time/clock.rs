//! Clock abstraction so TTL behaviour can be driven deterministically.

use std::sync::Arc;
use std::time::{Instant, SystemTime};

/// Source of monotonic and wall-clock time.
pub trait Clock: Send + Sync + 'static {
    /// Current monotonic instant.
    fn now(&self) -> Instant;

    /// Current wall-clock time.
    fn system_time(&self) -> SystemTime;
}

/// Real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn system_time(&self) -> SystemTime {
        SystemTime::now()
    }
}

impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn system_time(&self) -> SystemTime {
        (**self).system_time()
    }
}

#[cfg(any(feature = "test-utils", test))]
pub use mock::MockClock;

#[cfg(any(feature = "test-utils", test))]
mod mock {
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant, SystemTime};

    use super::Clock;

    /// Manually advanced clock for tests.
    ///
    /// Clones share the same elapsed counter, so a clock handed to a cache
    /// can still be advanced from the test body.
    #[derive(Debug, Clone)]
    pub struct MockClock {
        start: Instant,
        elapsed: Arc<Mutex<Duration>>,
    }

    impl MockClock {
        /// Create a clock frozen at the current instant.
        pub fn new() -> Self {
            Self { start: Instant::now(), elapsed: Arc::new(Mutex::new(Duration::ZERO)) }
        }

        /// Move the clock forward.
        pub fn advance(&self, duration: Duration) {
            if let Ok(mut elapsed) = self.elapsed.lock() {
                *elapsed += duration;
            }
        }

        /// Total time advanced so far.
        pub fn elapsed(&self) -> Duration {
            self.elapsed.lock().map(|e| *e).unwrap_or(Duration::ZERO)
        }
    }

    impl Default for MockClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl Clock for MockClock {
        fn now(&self) -> Instant {
            self.start + self.elapsed()
        }

        fn system_time(&self) -> SystemTime {
            SystemTime::UNIX_EPOCH + self.elapsed()
        }
    }
}
