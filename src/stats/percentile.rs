//! Interpolated percentiles over latency samples
//!
//! Uses the linear-interpolation estimator: for `n` sorted samples the
//! fractional rank of percentile `p` is `pos = p/100 * (n-1)`, and the result
//! interpolates between the order statistics at `floor(pos)` and the next one.
//! `p = 0` yields the minimum and `p = 100` the maximum exactly.
//!
//! Samples arrive in recording order, so they are always sorted here before
//! indexing.
//!
//! # Example
//!
//! ```
//! use kvreplay::stats::percentile::percentile;
//!
//! let samples = [40, 10, 30, 20];
//! assert_eq!(percentile(&samples, 50.0).unwrap(), 25.0);
//! assert_eq!(percentile(&samples, 100.0).unwrap(), 40.0);
//! assert_eq!(percentile(&[], 50.0).unwrap(), 0.0);
//! assert!(percentile(&samples, 101.0).is_err());
//! ```

use crate::workload::OperationKind;
use thiserror::Error;

/// Percentiles written to the stats report, in order
pub const REPORT_PERCENTILES: [f64; 5] = [0.0, 25.0, 50.0, 75.0, 95.0];

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum PercentileError {
    #[error("percentile {0} is outside [0, 100]")]
    OutOfRange(f64),
}

fn check_domain(p: f64) -> Result<(), PercentileError> {
    if (0.0..=100.0).contains(&p) {
        Ok(())
    } else {
        Err(PercentileError::OutOfRange(p))
    }
}

/// Percentile `p` of `samples` in any order
///
/// Returns 0 for an empty sample set. `p` outside `[0, 100]` (or NaN) is an error.
pub fn percentile(samples: &[u64], p: f64) -> Result<f64, PercentileError> {
    check_domain(p)?;
    if samples.is_empty() {
        return Ok(0.0);
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    Ok(interpolate(&sorted, p))
}

/// `sorted` must be non-empty and in non-decreasing order; `p` within domain
fn interpolate(sorted: &[u64], p: f64) -> f64 {
    let len = sorted.len();
    let pos = (p / 100.0) * (len - 1) as f64;
    let idx = pos as usize;
    let frac = pos - idx as f64;

    let lower = sorted[idx] as f64;
    if idx + 1 < len {
        let upper = sorted[idx + 1] as f64;
        lower * (1.0 - frac) + upper * frac
    } else {
        lower
    }
}

/// Fixed set of percentiles for one operation kind
#[derive(Debug, Clone, PartialEq)]
pub struct PercentileSummary {
    pub kind: OperationKind,
    /// Number of samples summarized
    pub count: usize,
    /// `(percentile, value)` pairs in the order requested
    pub values: Vec<(f64, f64)>,
}

impl PercentileSummary {
    /// Summarize `samples` at each of `percentiles`, sorting once
    pub fn compute(
        kind: OperationKind,
        samples: &[u64],
        percentiles: &[f64],
    ) -> Result<Self, PercentileError> {
        for &p in percentiles {
            check_domain(p)?;
        }

        let mut sorted = samples.to_vec();
        sorted.sort_unstable();

        let values = percentiles
            .iter()
            .map(|&p| {
                let value = if sorted.is_empty() { 0.0 } else { interpolate(&sorted, p) };
                (p, value)
            })
            .collect();

        Ok(Self {
            kind,
            count: sorted.len(),
            values,
        })
    }

    /// Value computed for `p`, if it was requested
    pub fn get(&self, p: f64) -> Option<f64> {
        self.values.iter().find(|(q, _)| *q == p).map(|&(_, v)| v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [u64; 4] = [10, 20, 30, 40];

    #[test]
    fn test_hand_computed_values() {
        assert_eq!(percentile(&SAMPLES, 0.0).unwrap(), 10.0);
        assert_eq!(percentile(&SAMPLES, 50.0).unwrap(), 25.0);
        assert_eq!(percentile(&SAMPLES, 100.0).unwrap(), 40.0);
        // pos = 0.25 * 3 = 0.75, between 10 and 20
        assert_eq!(percentile(&SAMPLES, 25.0).unwrap(), 17.5);
        // pos = 0.75 * 3 = 2.25, between 30 and 40
        assert_eq!(percentile(&SAMPLES, 75.0).unwrap(), 32.5);
    }

    #[test]
    fn test_unsorted_input_is_sorted_first() {
        let chronological = [40, 10, 30, 20];
        assert_eq!(percentile(&chronological, 50.0).unwrap(), 25.0);
        assert_eq!(percentile(&chronological, 0.0).unwrap(), 10.0);
        assert_eq!(percentile(&chronological, 100.0).unwrap(), 40.0);
    }

    #[test]
    fn test_empty_is_zero() {
        for p in [0.0, 25.0, 50.0, 100.0] {
            assert_eq!(percentile(&[], p).unwrap(), 0.0);
        }
    }

    #[test]
    fn test_out_of_domain() {
        assert_eq!(percentile(&SAMPLES, -0.1), Err(PercentileError::OutOfRange(-0.1)));
        assert_eq!(percentile(&SAMPLES, 100.5), Err(PercentileError::OutOfRange(100.5)));
        assert!(percentile(&SAMPLES, f64::NAN).is_err());
        assert!(percentile(&[], 150.0).is_err());
    }

    #[test]
    fn test_single_sample() {
        for p in [0.0, 33.0, 95.0, 100.0] {
            assert_eq!(percentile(&[7], p).unwrap(), 7.0);
        }
    }

    #[test]
    fn test_result_within_min_max() {
        let samples = [5, 900, 13, 13, 250, 77, 1, 4000];
        for step in 0..=200 {
            let p = step as f64 / 2.0;
            let value = percentile(&samples, p).unwrap();
            assert!((1.0..=4000.0).contains(&value), "p{} = {}", p, value);
        }
        assert_eq!(percentile(&samples, 0.0).unwrap(), 1.0);
        assert_eq!(percentile(&samples, 100.0).unwrap(), 4000.0);
    }

    #[test]
    fn test_monotonic_in_p() {
        let samples = [3, 1, 4, 1, 5, 9, 2, 6, 5, 3, 5];
        let mut previous = f64::MIN;
        for p in 0..=100 {
            let value = percentile(&samples, p as f64).unwrap();
            assert!(value >= previous - 1e-9, "p{} = {} < {}", p, value, previous);
            previous = value;
        }
    }

    #[test]
    fn test_summary_matches_percentile() {
        let summary =
            PercentileSummary::compute(OperationKind::Insert, &[40, 10, 30, 20], &REPORT_PERCENTILES)
                .unwrap();

        assert_eq!(summary.count, 4);
        assert_eq!(summary.values.len(), 5);
        for &p in &REPORT_PERCENTILES {
            assert_eq!(summary.get(p), Some(percentile(&SAMPLES, p).unwrap()));
        }
        assert_eq!(summary.get(99.0), None);
    }

    #[test]
    fn test_summary_rejects_bad_percentile() {
        let result = PercentileSummary::compute(OperationKind::Update, &SAMPLES, &[50.0, 120.0]);
        assert_eq!(result, Err(PercentileError::OutOfRange(120.0)));
    }
}
