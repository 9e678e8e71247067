//! Beta key selection
//!
//! Draws `x ~ Beta(alpha, beta)` on [0, 1] and maps it onto the key range.
//! `alpha < beta` leans toward low indices (the earliest inserted keys), and
//! both below 1 pile traffic onto the two ends.

use super::Distribution;
use crate::Result;
use anyhow::Context;
use rand::SeedableRng;
use rand_distr::{Beta, Distribution as _};
use rand_xoshiro::Xoshiro256PlusPlus;

pub struct BetaDistribution {
    beta: Beta<f64>,
    rng: Xoshiro256PlusPlus,
}

impl BetaDistribution {
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        Self::with_rng(alpha, beta, Xoshiro256PlusPlus::from_entropy())
    }

    pub fn with_seed(alpha: f64, beta: f64, seed: u64) -> Result<Self> {
        Self::with_rng(alpha, beta, Xoshiro256PlusPlus::seed_from_u64(seed))
    }

    fn with_rng(alpha: f64, beta: f64, rng: Xoshiro256PlusPlus) -> Result<Self> {
        let shape = Beta::new(alpha, beta)
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid beta parameters alpha={} beta={}", alpha, beta))?;
        Ok(Self { beta: shape, rng })
    }
}

impl Distribution for BetaDistribution {
    fn next_index(&mut self, len: u64) -> u64 {
        if len == 0 {
            return 0;
        }
        let x = self.beta.sample(&mut self.rng);
        ((x * len as f64) as u64).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beta_in_range() {
        let mut dist = BetaDistribution::with_seed(0.2, 0.6, 1).unwrap();
        for _ in 0..1000 {
            assert!(dist.next_index(50) < 50);
        }
        assert_eq!(dist.next_index(0), 0);
    }

    #[test]
    fn test_beta_leans_low_when_alpha_small() {
        let mut dist = BetaDistribution::with_seed(1.0, 5.0, 42).unwrap();
        let len = 1000u64;
        let low = (0..10000).filter(|_| dist.next_index(len) < len / 2).count();
        assert!(low > 9000, "only {} of 10000 in the lower half", low);
    }

    #[test]
    fn test_beta_invalid_parameters() {
        assert!(BetaDistribution::new(0.0, 1.0).is_err());
        assert!(BetaDistribution::new(1.0, -2.0).is_err());
    }
}
