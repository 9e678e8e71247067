//! Zipf key selection
//!
//! Power law over key rank: P(k) ∝ 1 / k^theta. Small theta (0.5) is close to
//! uniform, large theta (2.0) concentrates traffic on a few hot keys.
//!
//! # Example
//!
//! ```
//! use kvreplay::distribution::{Distribution, zipf::ZipfDistribution};
//!
//! let mut dist = ZipfDistribution::with_seed(1.2, 3).unwrap();
//! assert!(dist.next_index(1000) < 1000);
//! ```

use super::Distribution;
use crate::Result;
use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

/// Largest rank table built; bigger ranges are scaled onto it
const MAX_RANKS: u64 = 1_000_000;

/// Zipf distribution sampled by inverse transform over a precomputed CDF
pub struct ZipfDistribution {
    /// Exponent (theta), within [0.0, 3.0]
    s: f64,
    cdf: Vec<f64>,
    /// Range the CDF was built for
    built_for: u64,
    rng: Xoshiro256PlusPlus,
}

fn check_theta(theta: f64) -> Result<()> {
    if !(0.0..=3.0).contains(&theta) {
        anyhow::bail!("zipf theta must be in range [0.0, 3.0], got {}", theta);
    }
    Ok(())
}

impl ZipfDistribution {
    pub fn new(theta: f64) -> Result<Self> {
        check_theta(theta)?;
        Ok(Self::with_rng(theta, Xoshiro256PlusPlus::from_entropy()))
    }

    pub fn with_seed(theta: f64, seed: u64) -> Result<Self> {
        check_theta(theta)?;
        Ok(Self::with_rng(theta, Xoshiro256PlusPlus::seed_from_u64(seed)))
    }

    fn with_rng(theta: f64, rng: Xoshiro256PlusPlus) -> Self {
        Self {
            s: theta,
            cdf: Vec::new(),
            built_for: 0,
            rng,
        }
    }

    /// CDF[k] = sum of P(i) for i = 1..=k+1, over at most MAX_RANKS ranks
    fn compute_cdf(&mut self, len: u64) {
        let n = len.min(MAX_RANKS) as usize;

        let h_n_s: f64 = (1..=n).map(|i| (i as f64).powf(-self.s)).sum();

        self.cdf = Vec::with_capacity(n);
        let mut cumulative = 0.0;
        for i in 1..=n {
            cumulative += (i as f64).powf(-self.s) / h_n_s;
            self.cdf.push(cumulative);
        }
        self.built_for = len;
    }
}

impl Distribution for ZipfDistribution {
    fn next_index(&mut self, len: u64) -> u64 {
        if len == 0 {
            return 0;
        }
        if self.built_for != len {
            self.compute_cdf(len);
        }

        let u: f64 = self.rng.gen();
        let rank = self.cdf.partition_point(|&c| c < u);

        // Scale rank from [0, cdf.len()) onto [0, len)
        let index = ((rank as u128 * len as u128) / self.cdf.len() as u128) as u64;
        index.min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zipf_in_range() {
        let mut dist = ZipfDistribution::new(1.2).unwrap();
        for _ in 0..100 {
            assert!(dist.next_index(1000) < 1000);
        }
        assert_eq!(dist.next_index(0), 0);
    }

    #[test]
    fn test_zipf_seeded() {
        let mut dist1 = ZipfDistribution::with_seed(1.2, 12345).unwrap();
        let mut dist2 = ZipfDistribution::with_seed(1.2, 12345).unwrap();
        for _ in 0..10 {
            assert_eq!(dist1.next_index(1000), dist2.next_index(1000));
        }
    }

    #[test]
    fn test_zipf_skew() {
        let mut dist = ZipfDistribution::with_seed(1.5, 42).unwrap();
        let len = 1000u64;
        let mut buckets = vec![0u32; 10];

        for _ in 0..10000 {
            let index = dist.next_index(len);
            buckets[(index * 10 / len) as usize] += 1;
        }

        assert!(
            buckets[0] > buckets[9] * 2,
            "Zipf skew insufficient: bucket[0]={} should be > 2 * bucket[9]={}",
            buckets[0],
            buckets[9]
        );
    }

    #[test]
    fn test_zipf_rebuilds_for_new_range() {
        let mut dist = ZipfDistribution::with_seed(1.0, 5).unwrap();
        for _ in 0..20 {
            assert!(dist.next_index(1000) < 1000);
        }
        for _ in 0..20 {
            assert!(dist.next_index(10) < 10);
        }
    }

    #[test]
    fn test_zipf_invalid_theta() {
        assert!(ZipfDistribution::new(3.5).is_err());
        assert!(ZipfDistribution::with_seed(-0.5, 1).is_err());
    }
}
