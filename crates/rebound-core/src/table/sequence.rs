use std::time::Duration;

use tracing::debug;

use rebound_model::BackoffCategory;

use crate::backoff::{BackoffFunction, RandomSource, ThreadRandom, bound_ms};
use crate::metrics::MetricsHandle;

/// A retry sequence tagged with the failure category it backs off for.
///
/// Wraps a [`BackoffFunction`], logs every computed delay and reports it to the metrics backend.
/// It makes no retry decisions: the caller still decides whether to call it again.
pub struct CategoryBackoff<R = ThreadRandom> {
    category: BackoffCategory,
    inner: BackoffFunction<R>,
    metrics: MetricsHandle,
}

impl<R: RandomSource> CategoryBackoff<R> {
    pub fn new(category: BackoffCategory, inner: BackoffFunction<R>, metrics: MetricsHandle) -> Self {
        Self {
            category,
            inner,
            metrics,
        }
    }

    /// Computes the next delay in milliseconds, see [`BackoffFunction::next_delay_ms`].
    pub fn next_delay_ms(&mut self, max_delay_ms: u64) -> u64 {
        let attempt = self.inner.attempts();
        let (delay_ms, clamped) = self.inner.step(max_delay_ms);

        debug!(
            category = %self.category,
            attempt,
            delay_ms,
            clamped,
            "backing off"
        );
        self.metrics.record_backoff(
            self.category.as_label(),
            self.inner.jitter().as_label(),
            delay_ms,
            clamped,
        );
        delay_ms
    }

    /// Computes the next delay, see [`BackoffFunction::next_delay`].
    pub fn next_delay(&mut self, max: Option<Duration>) -> Duration {
        Duration::from_millis(self.next_delay_ms(bound_ms(max)))
    }

    #[inline]
    pub fn category(&self) -> BackoffCategory {
        self.category
    }

    #[inline]
    pub fn attempts(&self) -> u64 {
        self.inner.attempts()
    }

    /// The underlying calculator.
    #[inline]
    pub fn function(&self) -> &BackoffFunction<R> {
        &self.inner
    }
}

impl<R> std::fmt::Debug for CategoryBackoff<R>
where
    R: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryBackoff")
            .field("category", &self.category)
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
