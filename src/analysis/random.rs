use std::ops::{Range, RangeInclusive};

use rand::{rngs::StdRng, Rng, SeedableRng};

/// Source of every random draw the simulator makes. Swappable so tests can
/// script delays and values.
pub trait RandomSource: Send {
    /// Uniform in the half-open range.
    fn uniform_u64(&mut self, range: Range<u64>) -> u64;
    fn uniform_u32(&mut self, range: RangeInclusive<u32>) -> u32;
    fn uniform_f64(&mut self, range: RangeInclusive<f64>) -> f64;
    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;
    /// Uniform index into a collection of `len` items.
    fn pick(&mut self, len: usize) -> usize;
}

pub struct RngSource<R> {
    rng: R,
}

impl<R: Rng + Send> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSource<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng + Send> RandomSource for RngSource<R> {
    fn uniform_u64(&mut self, range: Range<u64>) -> u64 {
        if range.is_empty() {
            return range.start;
        }
        self.rng.gen_range(range)
    }

    fn uniform_u32(&mut self, range: RangeInclusive<u32>) -> u32 {
        self.rng.gen_range(range)
    }

    fn uniform_f64(&mut self, range: RangeInclusive<f64>) -> f64 {
        self.rng.gen_range(range)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    fn pick(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}
