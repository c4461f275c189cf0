/*!
 * Request throttling for model calls.
 *
 * Fragments are dispatched all at once; the throttle decides how many
 * calls may actually run together and how far apart their starts must be.
 * The default throttle imposes no limit at all.
 */

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::Instant;

/// Held for the duration of one call; dropping it frees a concurrency slot
#[derive(Debug)]
pub struct ThrottlePermit {
    _permit: Option<OwnedSemaphorePermit>,
}

/// Concurrency cap plus minimum spacing between call starts
#[derive(Debug, Clone)]
pub struct RequestThrottle {
    /// Limits concurrent calls when set
    semaphore: Option<Arc<Semaphore>>,
    /// Maximum concurrent calls, kept for reporting
    max_concurrent_requests: Option<usize>,
    /// Minimum time between two call starts
    min_interval: Duration,
    /// Earliest instant the next call may start
    next_start: Arc<Mutex<Instant>>,
}

impl Default for RequestThrottle {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RequestThrottle {
    /// A throttle that lets every call through immediately
    pub fn unbounded() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Create a throttle; `None` or `Some(0)` means no concurrency cap
    pub fn new(max_concurrent_requests: Option<usize>, min_interval: Duration) -> Self {
        let max_concurrent_requests = max_concurrent_requests.filter(|n| *n > 0);
        Self {
            semaphore: max_concurrent_requests.map(|n| Arc::new(Semaphore::new(n))),
            max_concurrent_requests,
            min_interval,
            next_start: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// The configured concurrency cap, if any
    pub fn max_concurrent_requests(&self) -> Option<usize> {
        self.max_concurrent_requests
    }

    /// Whether this throttle ever delays a call
    pub fn is_unbounded(&self) -> bool {
        self.semaphore.is_none() && self.min_interval.is_zero()
    }

    /// Wait for a free slot and for the start interval to pass
    pub async fn acquire(&self) -> ThrottlePermit {
        let permit = match &self.semaphore {
            // The semaphore is never closed, so acquiring only fails if it was
            Some(semaphore) => Arc::clone(semaphore).acquire_owned().await.ok(),
            None => None,
        };

        if !self.min_interval.is_zero() {
            let start_at = {
                let mut next_start = self.next_start.lock();
                let start_at = (*next_start).max(Instant::now());
                *next_start = start_at + self.min_interval;
                start_at
            };
            tokio::time::sleep_until(start_at).await;
        }

        ThrottlePermit { _permit: permit }
    }
}
