//! Latency statistics collection
//!
//! The [`LatencyRecorder`] keeps every elapsed-time sample of a run, grouped
//! by operation kind, and remembers the order samples were recorded in so the
//! raw event stream can be replayed for the latency report.
//!
//! Nothing is evicted or capped: memory grows with the workload. A run has a
//! single writer, and samples are only read once the workload is exhausted.
//!
//! # Example
//!
//! ```
//! use kvreplay::stats::LatencyRecorder;
//! use kvreplay::workload::OperationKind;
//!
//! let mut recorder = LatencyRecorder::new(true);
//! recorder.record(OperationKind::Insert, 1_200);
//! recorder.record(OperationKind::PointQuery, 300);
//! recorder.record(OperationKind::Insert, 900);
//!
//! assert_eq!(recorder.samples(OperationKind::Insert), &[1_200, 900]);
//! assert_eq!(recorder.events().count(), 3);
//! ```

pub mod histogram;
pub mod percentile;

use crate::workload::OperationKind;
use percentile::{PercentileError, PercentileSummary};
use serde::Serialize;

/// One timed store call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LatencySample {
    pub kind: OperationKind,
    pub elapsed_nanos: u64,
}

/// Per-kind latency samples for one run
///
/// When constructed disabled, [`record`](Self::record) is a no-op.
#[derive(Debug, Default, Clone)]
pub struct LatencyRecorder {
    enabled: bool,
    per_kind: [Vec<u64>; OperationKind::COUNT],
    order: Vec<OperationKind>,
}

impl LatencyRecorder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Append a sample for `kind`
    #[inline]
    pub fn record(&mut self, kind: OperationKind, elapsed_nanos: u64) {
        if !self.enabled {
            return;
        }
        self.per_kind[kind.index()].push(elapsed_nanos);
        self.order.push(kind);
    }

    /// Samples for `kind` in recording order (not sorted)
    pub fn samples(&self, kind: OperationKind) -> &[u64] {
        &self.per_kind[kind.index()]
    }

    /// Kinds that have at least one sample, in report order
    pub fn kinds(&self) -> Vec<OperationKind> {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| !self.per_kind[kind.index()].is_empty())
            .collect()
    }

    /// Total samples across all kinds
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Percentile summary for each kind with samples
    pub fn summaries(&self, percentiles: &[f64]) -> Result<Vec<PercentileSummary>, PercentileError> {
        self.kinds()
            .into_iter()
            .map(|kind| PercentileSummary::compute(kind, self.samples(kind), percentiles))
            .collect()
    }

    /// Every sample across all kinds, in recording order
    pub fn events(&self) -> Events<'_> {
        Events {
            recorder: self,
            position: 0,
            cursors: [0; OperationKind::COUNT],
        }
    }
}

/// Iterator over recorded samples in the order they were taken
pub struct Events<'a> {
    recorder: &'a LatencyRecorder,
    position: usize,
    cursors: [usize; OperationKind::COUNT],
}

impl Iterator for Events<'_> {
    type Item = LatencySample;

    fn next(&mut self) -> Option<Self::Item> {
        let kind = *self.recorder.order.get(self.position)?;
        self.position += 1;

        let cursor = &mut self.cursors[kind.index()];
        let elapsed_nanos = self.recorder.per_kind[kind.index()][*cursor];
        *cursor += 1;

        Some(LatencySample {
            kind,
            elapsed_nanos,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.recorder.order.len() - self.position;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Events<'_> {}
