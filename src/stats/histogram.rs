//! Latency histogram using HdrHistogram
//!
//! Backs the console summary (mean, standard deviation, tail percentiles).
//! The stats report file uses the exact interpolated percentiles from
//! [`percentile`](super::percentile) instead.
//!
//! # Example
//!
//! ```
//! use kvreplay::stats::histogram::LatencyHistogram;
//!
//! let hist = LatencyHistogram::from_samples(&[100, 150, 200]).unwrap();
//! assert_eq!(hist.len(), 3);
//! assert!(hist.percentile(99.0).is_some());
//! ```

use crate::Result;
use anyhow::Context;
use hdrhistogram::Histogram;
use std::time::Duration;

/// Highest trackable latency: 1 hour in nanoseconds
const MAX_NANOS: u64 = 3_600_000_000_000;

/// Latency histogram wrapper
///
/// Tracks latencies from 1 nanosecond to 1 hour with 3 significant digits
/// (values accurate to within 0.1%).
#[derive(Debug)]
pub struct LatencyHistogram {
    histogram: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create an empty histogram
    pub fn new() -> Result<Self> {
        let histogram = Histogram::new_with_bounds(1, MAX_NANOS, 3)
            .context("Failed to create latency histogram")?;

        Ok(Self { histogram })
    }

    /// Build a histogram from nanosecond samples
    pub fn from_samples(samples: &[u64]) -> Result<Self> {
        let mut hist = Self::new()?;
        for &nanos in samples {
            hist.record_nanos(nanos);
        }
        Ok(hist)
    }

    /// Record a latency sample in nanoseconds
    ///
    /// Values above one hour are recorded as one hour.
    #[inline]
    pub fn record_nanos(&mut self, nanos: u64) {
        self.histogram.saturating_record(nanos);
    }

    /// Value at `percentile` (0.0 - 100.0), or None if empty
    pub fn percentile(&self, percentile: f64) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.value_at_percentile(percentile)))
    }

    pub fn min(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.min()))
    }

    pub fn max(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.max()))
    }

    pub fn mean(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.mean() as u64))
    }

    pub fn stddev(&self) -> Option<Duration> {
        if self.is_empty() {
            return None;
        }
        Some(Duration::from_nanos(self.histogram.stdev() as u64))
    }

    /// Number of samples recorded
    pub fn len(&self) -> u64 {
        self.histogram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.len() == 0
    }
}
