//! Shared utilities: the random source used by shuffle and creation effects.

use std::f64::consts::TAU;

use rand::seq::SliceRandom;
use rand::Rng as _;
use rand_xoshiro::rand_core::{RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;

/// Smallest `u1` fed to the Box-Muller logarithm.
/// Caps a single draw at about 4.3 standard deviations.
pub const GAUSSIAN_MIN_U1: f64 = 1e-4;

/// Source of randomness for effects.
///
/// Object safe so engines can take `&mut dyn RandomSource`. Only `next_u64`
/// is required; the rest derive from it, but implementations may override
/// them with better-suited algorithms.
pub trait RandomSource: Send {
    /// Next raw 64 random bits
    fn next_u64(&mut self) -> u64;

    /// Uniform float in [0, 1)
    fn unit(&mut self) -> f64 {
        // 53 high bits -> exactly representable in f64
        (self.next_u64() >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Uniform index in [0, n). Returns 0 when `n == 0`.
    fn index(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        // Lemire's multiply-shift; bias is below 2^-64 * n
        ((u128::from(self.next_u64()) * n as u128) >> 64) as usize
    }

    /// Uniform float in [lo, hi]
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        let t = self.unit() as f32;
        (lo + (hi - lo) * t).clamp(lo.min(hi), lo.max(hi))
    }

    /// Standard normal sample via the Box-Muller transform
    fn gaussian(&mut self) -> f64 {
        // 1 - [0,1) is (0,1]; the floor keeps ln() finite
        let u1 = (1.0 - self.unit()).max(GAUSSIAN_MIN_U1);
        let u2 = self.unit();
        (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
    }

    /// Fisher-Yates shuffle of an index list in place
    fn shuffle_indices(&mut self, indices: &mut [usize]) {
        for i in (1..indices.len()).rev() {
            let j = self.index(i + 1);
            indices.swap(i, j);
        }
    }

    /// Uniformly random permutation of `0..n`
    fn shuffled_indices(&mut self, n: usize) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..n).collect();
        self.shuffle_indices(&mut indices);
        indices
    }
}

/// Seedable RNG backed by Xoshiro256**.
/// The same seed always yields the same sequence of draws.
pub struct Rng {
    inner: Xoshiro256StarStar,
    seed: u64,
}

impl Rng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Xoshiro256StarStar::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an RNG with a seed drawn from the thread-local generator
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this generator started from (log it to reproduce a run)
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl Default for Rng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for Rng {
    #[inline]
    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    #[inline]
    fn unit(&mut self) -> f64 {
        self.inner.random::<f64>()
    }

    #[inline]
    fn index(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        self.inner.random_range(0..n)
    }

    fn shuffle_indices(&mut self, indices: &mut [usize]) {
        indices.shuffle(&mut self.inner);
    }
}

/// Hash-based pseudo-random value for a pixel coordinate and seed.
/// Returns a value in [0.0, 1.0). Used where every pixel needs its own
/// independent stream, such as data-parallel kernels.
#[inline]
pub fn hash_unit(x: u32, y: u32, salt: u32, seed: u64) -> f64 {
    let mut h = (seed as u32)
        .wrapping_add((seed >> 32) as u32)
        .wrapping_add(x)
        .wrapping_mul(374761393);
    h = h.wrapping_add(y).wrapping_mul(668265263);
    h = h.wrapping_add(salt).wrapping_mul(2147483647);
    h = (h ^ (h >> 13)).wrapping_mul(1274126177);
    h ^= h >> 16;
    f64::from(h) / (f64::from(u32::MAX) + 1.0)
}
