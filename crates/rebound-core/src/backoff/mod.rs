//! Exponential backoff with jitter.
//!
//! A [`BackoffFunction`] is the per-retry-sequence state: it owns the attempt counter and the
//! previous delay, and turns them into the next delay on every call. It never sleeps; waiting
//! (and cancelling the wait) belongs to the caller.
//!
//! Randomness is injected through [`RandomSource`] so jitter can be driven by a seeded or
//! scripted source in tests.
mod function;
pub use function::BackoffFunction;
pub(crate) use function::bound_ms;

mod random;
pub use random::{RandomHandle, RandomSource, SeededRandom, ThreadRandom};
