//! Random source used by the occupancy simulation.
//!
//! All randomness goes through [`RandomSource`] so the transition logic can be
//! driven by a seeded generator in production and by scripted values in tests.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub mod mock;

pub trait RandomSource {
    /// Uniform sample in `[0, 1)`.
    fn roll(&mut self) -> f64;

    /// Uniform sample in `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn pick(&mut self, len: usize) -> usize;

    /// Bernoulli trial. A probability of 0 never fires and 1 always fires.
    fn chance(&mut self, probability: f64) -> bool {
        self.roll() < probability
    }
}

/// Seedable ChaCha-backed source.
#[derive(Debug, Clone)]
pub struct SimRng(ChaCha8Rng);

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }
}

impl RandomSource for SimRng {
    fn roll(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.0.gen_range(low..=high)
    }

    fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }
}
