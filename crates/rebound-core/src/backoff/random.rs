use std::sync::{Arc, Mutex, PoisonError};

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Source of uniformly distributed integers used for jitter.
///
/// Implementations must be callable from many retry sequences at once.
pub trait RandomSource: Send + Sync {
    /// Returns a uniformly distributed integer in `[0, n)`.
    ///
    /// Callers guarantee `n > 0`.
    fn below(&self, n: u64) -> u64;
}

/// Shared handle to a random source.
pub type RandomHandle = Arc<dyn RandomSource>;

impl<T: RandomSource + ?Sized> RandomSource for Arc<T> {
    #[inline]
    fn below(&self, n: u64) -> u64 {
        (**self).below(n)
    }
}

/// Thread-local generator. Each thread draws from its own `rand::thread_rng()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    #[inline]
    fn below(&self, n: u64) -> u64 {
        rand::thread_rng().gen_range(0..n)
    }
}

/// Deterministic generator seeded once, for reproducible simulations and tests.
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn below(&self, n: u64) -> u64 {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_random_stays_in_range() {
        let rng = ThreadRandom;
        for n in [1, 2, 3, 10, 1_000, u64::MAX] {
            for _ in 0..100 {
                assert!(rng.below(n) < n);
            }
        }
    }

    #[test]
    fn below_one_is_always_zero() {
        assert_eq!(ThreadRandom.below(1), 0);
        assert_eq!(SeededRandom::new(7).below(1), 0);
    }

    #[test]
    fn same_seed_same_sequence() {
        let a = SeededRandom::new(42);
        let b = SeededRandom::new(42);
        let xs: Vec<u64> = (0..32).map(|_| a.below(1_000)).collect();
        let ys: Vec<u64> = (0..32).map(|_| b.below(1_000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn shared_handle_is_usable_across_threads() {
        let rng: RandomHandle = Arc::new(SeededRandom::new(1));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let rng = Arc::clone(&rng);
                std::thread::spawn(move || (0..100).all(|_| rng.below(50) < 50))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
    }
}
