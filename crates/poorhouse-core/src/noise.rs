//! Seeded random source for noise, phase scatter and pitch drift.
//!
//! Wraps a [`SmallRng`] so every voice owns an independent, reproducible
//! stream. Nothing here allocates or touches global state.

use core::f32::consts::TAU;
use libm::{cosf, logf, sqrtf};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Per-voice random generator.
///
/// # Example
///
/// ```rust
/// use poorhouse_core::NoiseSource;
///
/// let mut rng = NoiseSource::new(7);
/// let white = rng.bipolar();
/// assert!((-1.0..1.0).contains(&white));
/// ```
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: SmallRng,
}

impl NoiseSource {
    /// Create a generator from a seed. Equal seeds produce equal streams.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Uniform sample in [0, 1).
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Uniform sample in [-1, 1).
    #[inline]
    pub fn bipolar(&mut self) -> f32 {
        self.unit() * 2.0 - 1.0
    }

    /// Normally distributed sample with mean 0 and the given deviation.
    ///
    /// Box–Muller transform over two uniform draws.
    pub fn gaussian(&mut self, std_dev: f32) -> f32 {
        let u1 = 1.0 - self.unit();
        let u2 = self.unit();
        sqrtf(-2.0 * logf(u1)) * cosf(TAU * u2) * std_dev
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(0x5EED)
    }
}
