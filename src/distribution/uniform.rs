//! Uniform random key selection
//!
//! Uses xoshiro256++, which is fast enough to call once per generated record.

use super::Distribution;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Every index in the range is equally likely
pub struct UniformDistribution {
    rng: Xoshiro256PlusPlus,
}

impl UniformDistribution {
    /// Seeded from the OS
    pub fn new() -> Self {
        Self {
            rng: Xoshiro256PlusPlus::from_entropy(),
        }
    }

    /// Reproducible sequence
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }
}

impl Default for UniformDistribution {
    fn default() -> Self {
        Self::new()
    }
}

impl Distribution for UniformDistribution {
    #[inline(always)]
    fn next_index(&mut self, len: u64) -> u64 {
        if len == 0 {
            return 0;
        }
        self.rng.gen_range(0..len)
    }
}
