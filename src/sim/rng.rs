//! Random source used by the simulation
//!
//! Every stochastic decision (flyer selection, enemy direction, fire rolls,
//! drop rolls) goes through [`RandomSource`] so runs are reproducible from a
//! seed and tests can script outcomes exactly.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Uniform draws consumed by the simulation
pub trait RandomSource {
    /// Uniform value in [0, 1)
    fn next_unit(&mut self) -> f32;

    /// Uniform index in `0..n` (`n` must be non-zero)
    fn pick(&mut self, n: usize) -> usize {
        debug_assert!(n > 0);
        ((self.next_unit() * n as f32) as usize).min(n - 1)
    }

    /// True with probability `p`
    fn chance(&mut self, p: f32) -> bool {
        self.next_unit() < p
    }
}

impl RandomSource for Pcg32 {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }

    fn pick(&mut self, n: usize) -> usize {
        self.random_range(0..n)
    }
}

/// Seeded production source
pub fn seeded(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Replays a fixed sequence of unit draws, cycling when exhausted.
///
/// An empty script behaves like a source that always returns `0.5`.
#[derive(Debug, Clone, Default)]
pub struct FixedRandom {
    values: Vec<f32>,
    cursor: usize,
}

impl FixedRandom {
    pub fn new(values: Vec<f32>) -> Self {
        Self { values, cursor: 0 }
    }

    /// A source that returns `value` forever
    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for FixedRandom {
    fn next_unit(&mut self) -> f32 {
        if self.values.is_empty() {
            return 0.5;
        }
        let v = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        v
    }
}
