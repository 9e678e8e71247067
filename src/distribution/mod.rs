//! Key selection distributions
//!
//! The workload generator picks which loaded key each point query or update
//! touches by drawing an index in `[0, len)` from one of these distributions.
//!
//! # Distributions
//!
//! - **Uniform**: every key equally likely
//! - **Zipf**: power law over key rank (hot/cold keys)
//! - **Beta**: skew shaped by `alpha` and `beta` over the key space
//!
//! # Example
//!
//! ```
//! use kvreplay::distribution::{Distribution, uniform::UniformDistribution};
//!
//! let mut dist = UniformDistribution::with_seed(7);
//! let index = dist.next_index(1024);
//! assert!(index < 1024);
//! ```

pub mod beta;
pub mod uniform;
pub mod zipf;

use crate::config::workload::KeyDistribution;
use crate::Result;

/// Source of key indices
///
/// Each generator owns its own instance; implementations hold their own RNG.
pub trait Distribution: Send {
    /// Next index in `[0, len)`; returns 0 when `len` is 0
    fn next_index(&mut self, len: u64) -> u64;
}

/// Build the distribution selected by `selection`
///
/// With `seed` the sequence is reproducible; without it the RNG is seeded
/// from the OS.
pub fn build(selection: &KeyDistribution, seed: Option<u64>) -> Result<Box<dyn Distribution>> {
    let dist: Box<dyn Distribution> = match *selection {
        KeyDistribution::Uniform => Box::new(match seed {
            Some(seed) => uniform::UniformDistribution::with_seed(seed),
            None => uniform::UniformDistribution::new(),
        }),
        KeyDistribution::Zipf { theta } => Box::new(match seed {
            Some(seed) => zipf::ZipfDistribution::with_seed(theta, seed)?,
            None => zipf::ZipfDistribution::new(theta)?,
        }),
        KeyDistribution::Beta { alpha, beta } => Box::new(match seed {
            Some(seed) => beta::BetaDistribution::with_seed(alpha, beta, seed)?,
            None => beta::BetaDistribution::new(alpha, beta)?,
        }),
    };
    Ok(dist)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_each_kind() {
        let selections = [
            KeyDistribution::Uniform,
            KeyDistribution::Zipf { theta: 1.2 },
            KeyDistribution::Beta { alpha: 0.2, beta: 0.6 },
        ];
        for selection in selections {
            let mut dist = build(&selection, Some(1)).unwrap();
            for _ in 0..50 {
                assert!(dist.next_index(100) < 100);
            }
        }
    }

    #[test]
    fn test_build_rejects_bad_parameters() {
        assert!(build(&KeyDistribution::Zipf { theta: 4.0 }, None).is_err());
        assert!(build(&KeyDistribution::Beta { alpha: 0.0, beta: 1.0 }, None).is_err());
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let selection = KeyDistribution::Zipf { theta: 0.9 };
        let mut a = build(&selection, Some(99)).unwrap();
        let mut b = build(&selection, Some(99)).unwrap();
        for _ in 0..20 {
            assert_eq!(a.next_index(500), b.next_index(500));
        }
    }
}
