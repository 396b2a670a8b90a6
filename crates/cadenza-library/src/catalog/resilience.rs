//! Resilience primitives for catalog clients.

use std::sync::Mutex;
use std::thread::sleep;
use std::time::{Duration, Instant};

use backon::{BlockingRetryable, ExponentialBuilder};

use crate::error::{CatalogError, CatalogResult};

/// Number of retries after the first attempt of a transient failure.
const MAX_RETRIES: usize = 3;

/// Delay before the first retry. Doubles on every further retry.
#[cfg(not(test))]
const RETRY_DELAY: Duration = Duration::from_secs(1);
#[cfg(test)]
const RETRY_DELAY: Duration = Duration::from_millis(10);

/// Per-source rate limiter.
///
/// Limits throughput to a configurable number of requests per second by
/// spacing consecutive requests at least one interval apart.
#[derive(Debug)]
pub struct RateLimiter {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a new `RateLimiter` that allows at most
    /// `requests_per_second` requests per second.
    pub fn new(requests_per_second: u32) -> Self {
        Self {
            interval: Duration::from_millis(1000 / u64::from(requests_per_second.max(1))),
            last: Mutex::new(None),
        }
    }

    /// The minimum spacing between two requests.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Blocks until a request slot is available and claims it.
    pub fn acquire(&self) {
        let mut last = match self.last.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                sleep(self.interval - elapsed);
            }
        }
        *last = Some(Instant::now());
    }
}

/// Run `op`, retrying transient catalog failures with exponential backoff.
pub fn with_retry<T>(what: &str, op: impl FnMut() -> CatalogResult<T>) -> CatalogResult<T> {
    let backoff = ExponentialBuilder::default()
        .with_min_delay(RETRY_DELAY)
        .with_max_times(MAX_RETRIES);

    op.retry(backoff)
        .sleep(sleep)
        .when(CatalogError::is_transient)
        .notify(|err: &CatalogError, after: Duration| {
            log::debug!("{what} failed ({err}), retrying in {after:?}");
        })
        .call()
}
