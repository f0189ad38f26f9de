//! Handles for de-duplicating concurrent async work.
//!
//! A [`Flight`] keeps only a weak reference to the shared future. Once every
//! caller awaiting it has gone away the work is dropped, which lets drop
//! guards inside it run, and the next caller starts fresh.

use std::sync::atomic::{AtomicU64, Ordering};

use futures::future::{BoxFuture, Shared, WeakShared};
use futures::FutureExt;

pub(crate) type SharedWork<T> = Shared<BoxFuture<'static, T>>;

pub(crate) struct Flight<T: Clone> {
    token: u64,
    handle: WeakShared<BoxFuture<'static, T>>,
}

impl<T: Clone> Flight<T> {
    /// Shared handle to the work if anyone is still awaiting it.
    pub(crate) fn join(&self) -> Option<SharedWork<T>> {
        self.handle.upgrade()
    }

    pub(crate) fn is(&self, token: u64) -> bool {
        self.token == token
    }
}

/// Monotonic token source so completed work only clears its own entry.
#[derive(Debug, Default)]
pub(crate) struct FlightTokens(AtomicU64);

impl FlightTokens {
    pub(crate) fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
}

/// Wrap `work` for sharing. Returns the strong handle for the caller and the
/// weak [`Flight`] to register; `None` only if the future already finished.
pub(crate) fn launch<T>(
    token: u64,
    work: BoxFuture<'static, T>,
) -> (SharedWork<T>, Option<Flight<T>>)
where
    T: Clone + Send + Sync + 'static,
{
    let shared = work.shared();
    let flight = shared.downgrade().map(|handle| Flight { token, handle });
    (shared, flight)
}
