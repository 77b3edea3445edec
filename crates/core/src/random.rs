//! Random sources
//!
//! Everything random in SortPot goes through [`RandomSource::next_index`], so
//! the generator can be swapped between the OS source, a thread-local PRNG and
//! a seeded generator for reproducible tests.

use rand::rngs::{OsRng, StdRng};
use rand::{Rng, RngCore, SeedableRng};

/// Uniform index draws
pub trait RandomSource {
    /// Draw an index in `[0, bound)`.
    ///
    /// `bound <= 1` returns 0 without drawing.
    fn next_index(&mut self, bound: usize) -> usize;

    /// Draw an integer in `[low, high]` inclusive
    fn next_in_range(&mut self, low: u32, high: u32) -> u32 {
        debug_assert!(low <= high, "empty range {}..={}", low, high);
        let span = (high - low) as usize + 1;
        low + self.next_index(span) as u32
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn next_index(&mut self, bound: usize) -> usize {
        (**self).next_index(bound)
    }
}

/// Prefers the OS cryptographic generator, falling back to the thread-local
/// PRNG when the OS source is unavailable.
#[derive(Clone, Debug, Default)]
pub struct SystemRandom;

impl RandomSource for SystemRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }

        let mut bytes = [0u8; 8];
        match OsRng.try_fill_bytes(&mut bytes) {
            Ok(()) => (u64::from_le_bytes(bytes) % bound as u64) as usize,
            Err(e) => {
                tracing::debug!(error = %e, "OS random source unavailable, using thread rng");
                rand::thread_rng().gen_range(0..bound)
            }
        }
    }
}

/// Fast non-cryptographic source backed by `rand::thread_rng`
#[derive(Clone, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..bound)
    }
}

/// Deterministic source for tests and replays.
/// Same seed, same sequence of draws.
#[derive(Clone, Debug)]
pub struct SeededRandom {
    inner: StdRng,
}

impl SeededRandom {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        if bound <= 1 {
            return 0;
        }
        self.inner.gen_range(0..bound)
    }
}
