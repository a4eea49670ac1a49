//! Sliding-window concurrency limiter
//!
//! Bounds the number of in-flight operations with a counting semaphore. A
//! slot freed by a finished operation is immediately taken by the next
//! waiting item, so a slow straggler never stalls the rest of the batch.
//!
//! One limiter is shared by every batch of a run, so the ceiling holds
//! across the whole run and not per container.

use std::future::Future;
use std::sync::Arc;

use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use tracing::trace;

/// Runs async operations with at most `max` of them in flight
#[derive(Debug, Clone)]
pub struct ConcurrencyLimiter {
    semaphore: Arc<Semaphore>,
    max: usize,
}

impl ConcurrencyLimiter {
    /// Creates a limiter allowing `max` concurrent operations (at least 1)
    pub fn new(max: usize) -> Self {
        let max = max.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            max,
        }
    }

    /// The concurrency ceiling
    pub fn max_concurrent(&self) -> usize {
        self.max
    }

    /// Slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Applies `f` to every item, keeping at most `max` invocations in flight
    ///
    /// `f` is only called once a slot has been acquired, and the slot is
    /// held until the future it returned completes. Resolves once every item
    /// has completed; results are returned in input order.
    pub async fn run_all<T, R, F, Fut>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
    {
        let total = items.len();
        let f = &f;
        let semaphore = &self.semaphore;

        let mut in_flight: FuturesUnordered<_> = items
            .into_iter()
            .enumerate()
            .map(|(index, item)| async move {
                // The semaphore is never closed, so acquisition cannot fail.
                let _permit = semaphore.acquire().await.ok();
                trace!(index, "slot acquired");
                (index, f(item).await)
            })
            .collect();

        let mut results: Vec<Option<R>> = (0..total).map(|_| None).collect();
        while let Some((index, result)) = in_flight.next().await {
            results[index] = Some(result);
        }

        results.into_iter().flatten().collect()
    }
}

impl Default for ConcurrencyLimiter {
    fn default() -> Self {
        Self::new(10)
    }
}
