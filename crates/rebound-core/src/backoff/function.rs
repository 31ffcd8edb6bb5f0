use std::time::Duration;

use tracing::trace;

use rebound_model::{BackoffStrategy, JitterStrategy};

use super::{RandomSource, ThreadRandom};

/// Delay calculator for a single retry sequence.
///
/// Every call to [`BackoffFunction::next_delay_ms`] computes
/// `v = min(cap, base * 2^attempts)`, applies the configured jitter, optionally clamps
/// the result, then advances the attempt counter and remembers the delay.
///
/// The function is not synchronized: one instance belongs to one retry sequence.
/// Concurrent sequences create their own instances and may share a [`RandomSource`].
///
/// `cap_ms < base_ms` is a precondition violation. Delays are still bounded by `cap_ms`,
/// but configuration layers should reject such triples (see [`BackoffStrategy::validate`]).
///
/// # Examples
/// ```
/// use rebound_core::BackoffFunction;
/// use rebound_model::JitterStrategy;
///
/// let mut backoff = BackoffFunction::create(100, 10_000, JitterStrategy::NoJitter);
/// assert_eq!(backoff.next_delay_ms(0), 100);
/// assert_eq!(backoff.next_delay_ms(0), 200);
/// assert_eq!(backoff.attempts(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct BackoffFunction<R = ThreadRandom> {
    base_ms: u64,
    cap_ms: u64,
    jitter: JitterStrategy,
    attempts: u64,
    last_delay_ms: u64,
    rng: R,
}

impl BackoffFunction<ThreadRandom> {
    /// Creates a calculator drawing jitter from the thread-local generator.
    pub fn create(base_ms: u64, cap_ms: u64, jitter: JitterStrategy) -> Self {
        Self::with_random(base_ms, cap_ms, jitter, ThreadRandom)
    }

    /// Creates a calculator from a configured strategy.
    pub fn from_strategy(s: &BackoffStrategy) -> Self {
        Self::create(s.base_ms, s.cap_ms, s.jitter)
    }
}

impl<R: RandomSource> BackoffFunction<R> {
    /// Creates a calculator drawing jitter from `rng`.
    pub fn with_random(base_ms: u64, cap_ms: u64, jitter: JitterStrategy, rng: R) -> Self {
        Self {
            base_ms,
            cap_ms,
            jitter,
            attempts: 0,
            last_delay_ms: base_ms,
            rng,
        }
    }

    /// Computes the next delay in milliseconds.
    ///
    /// `max_delay_ms > 0` clamps the result; `0` means no bound beyond the configured cap.
    /// The attempt counter and the remembered delay advance on every call, clamped or not.
    pub fn next_delay_ms(&mut self, max_delay_ms: u64) -> u64 {
        self.step(max_delay_ms).0
    }

    /// Same as [`BackoffFunction::next_delay_ms`], with durations.
    ///
    /// `None` and a zero duration both mean "no additional bound".
    /// A positive bound shorter than a millisecond clamps to 1 ms.
    pub fn next_delay(&mut self, max: Option<Duration>) -> Duration {
        Duration::from_millis(self.next_delay_ms(bound_ms(max)))
    }

    /// Computes the next delay and reports whether `max_delay_ms` clamped it.
    pub(crate) fn step(&mut self, max_delay_ms: u64) -> (u64, bool) {
        let v = expo(self.base_ms, self.cap_ms, self.attempts);
        let sleep = match self.jitter {
            JitterStrategy::NoJitter => v,
            JitterStrategy::FullJitter => self.draw(v),
            JitterStrategy::EqualJitter => v / 2 + self.draw(v / 2),
            JitterStrategy::DecorrJitter => {
                // Non-positive range collapses to `base`.
                let range = self
                    .last_delay_ms
                    .saturating_mul(3)
                    .saturating_sub(self.base_ms);
                self.cap_ms
                    .min(self.base_ms.saturating_add(self.draw(range)))
            }
        };

        let clamped = max_delay_ms > 0 && sleep > max_delay_ms;
        let sleep = if clamped { max_delay_ms } else { sleep };

        trace!(
            base_ms = self.base_ms,
            cap_ms = self.cap_ms,
            jitter = %self.jitter,
            attempt = self.attempts,
            delay_ms = sleep,
            clamped,
            "backoff computed"
        );

        self.attempts += 1;
        self.last_delay_ms = sleep;
        (sleep, clamped)
    }

    /// Uniform draw in `[0, n)`; an empty range yields `0`.
    #[inline]
    fn draw(&self, n: u64) -> u64 {
        if n == 0 { 0 } else { self.rng.below(n) }
    }

    /// Number of delays computed so far.
    #[inline]
    pub fn attempts(&self) -> u64 {
        self.attempts
    }

    /// Most recently returned delay, or `base_ms` before the first call.
    #[inline]
    pub fn last_delay_ms(&self) -> u64 {
        self.last_delay_ms
    }

    #[inline]
    pub fn base_ms(&self) -> u64 {
        self.base_ms
    }

    #[inline]
    pub fn cap_ms(&self) -> u64 {
        self.cap_ms
    }

    #[inline]
    pub fn jitter(&self) -> JitterStrategy {
        self.jitter
    }
}

/// Converts an optional duration bound into the millisecond form of `next_delay_ms`.
///
/// Non-zero durations never map to `0`, which would lift the bound.
pub(crate) fn bound_ms(max: Option<Duration>) -> u64 {
    match max {
        Some(d) if !d.is_zero() => u64::try_from(d.as_millis()).unwrap_or(u64::MAX).max(1),
        _ => 0,
    }
}

/// `min(cap, base * 2^n)` computed in floating point so large `n` cannot overflow.
fn expo(base_ms: u64, cap_ms: u64, n: u64) -> u64 {
    if base_ms == 0 {
        return 0;
    }
    let exp = i32::try_from(n).unwrap_or(i32::MAX);
    let v = base_ms as f64 * 2f64.powi(exp);
    v.min(cap_ms as f64) as u64
}
