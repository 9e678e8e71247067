//! Operation dispatch
//!
//! The [`Dispatcher`] turns each workload [`Operation`] into exactly one
//! [`Store`] call. When measurement is enabled it reads the monotonic clock
//! immediately before and after that call and hands the elapsed time to its
//! [`LatencyRecorder`]. Parsing and logging stay outside the timed window.
//!
//! Measured and unmeasured runs issue the same store calls in the same order
//! and treat failures the same way. The only difference is whether samples
//! are kept.
//!
//! # Status handling
//!
//! - `Ok`: counted
//! - `NotFound` on a point query or point delete: counted as a miss, never logged
//! - any other non-ok status: logged to the error channel, replay continues
//!
//! # Example
//!
//! ```
//! use kvreplay::dispatch::Dispatcher;
//! use kvreplay::store::memory::MemoryStore;
//! use kvreplay::workload::{parse_line, OperationKind};
//!
//! let mut store = MemoryStore::new();
//! let mut dispatcher = Dispatcher::new(&mut store, true);
//! dispatcher.dispatch(&parse_line(b"I a 1").unwrap());
//! dispatcher.dispatch(&parse_line(b"P z").unwrap());
//!
//! let (recorder, summary) = dispatcher.finish();
//! assert_eq!(summary.not_found(OperationKind::PointQuery), 1);
//! assert_eq!(recorder.len(), 2);
//! ```

use crate::stats::LatencyRecorder;
use crate::store::{Status, Store};
use crate::util::fast_time::FastInstant;
use crate::workload::{Operation, OperationKind, Payload, WorkloadReader};
use std::io::{self, BufRead};
use std::time::Duration;
use tracing::{debug, error};

/// Counters for one replay
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReplaySummary {
    operations: [u64; OperationKind::COUNT],
    failures: [u64; OperationKind::COUNT],
    not_found: [u64; OperationKind::COUNT],
    /// Entries visited by range queries
    pub entries_scanned: u64,
    /// Workload lines skipped by the reader
    pub skipped_lines: u64,
    /// Wall time spent replaying, including parsing
    pub elapsed: Duration,
}

impl ReplaySummary {
    /// Operations of `kind` dispatched, whatever their outcome
    pub fn operations(&self, kind: OperationKind) -> u64 {
        self.operations[kind.index()]
    }

    /// Operations of `kind` that returned an error status
    pub fn failures(&self, kind: OperationKind) -> u64 {
        self.failures[kind.index()]
    }

    /// Point queries or deletes that found no key
    pub fn not_found(&self, kind: OperationKind) -> u64 {
        self.not_found[kind.index()]
    }

    pub fn total_operations(&self) -> u64 {
        self.operations.iter().sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.failures.iter().sum()
    }
}

const MALFORMED_RECORD: &str = "malformed record: payload does not match operation kind";

/// Whether `NotFound` is an expected outcome for `kind`
fn tolerates_not_found(kind: OperationKind) -> bool {
    matches!(kind, OperationKind::PointQuery | OperationKind::PointDelete)
}

/// Verb used in per-operation error diagnostics
fn action(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Insert => "inserting",
        OperationKind::Update => "updating",
        OperationKind::Merge => "merging",
        OperationKind::PointQuery => "point querying",
        OperationKind::PointDelete => "point deleting",
        OperationKind::RangeDelete => "range deleting",
        OperationKind::RangeQuery => "range querying",
    }
}

/// Maps operations onto a borrowed store, optionally timing each call
pub struct Dispatcher<'a, S: Store + ?Sized> {
    store: &'a mut S,
    recorder: LatencyRecorder,
    summary: ReplaySummary,
    /// Reused across point queries
    value_buf: Vec<u8>,
}

impl<'a, S: Store + ?Sized> Dispatcher<'a, S> {
    pub fn new(store: &'a mut S, measurement_enabled: bool) -> Self {
        Self {
            store,
            recorder: LatencyRecorder::new(measurement_enabled),
            summary: ReplaySummary::default(),
            value_buf: Vec::new(),
        }
    }

    /// Issue the store call for `op` and return its status
    ///
    /// A record whose payload does not fit its kind fails without a store
    /// call or a latency sample.
    pub fn dispatch(&mut self, op: &Operation) -> Status {
        let (status, scanned) = if op.is_well_formed() {
            let start = self.recorder.is_enabled().then(FastInstant::now);
            let result = self.call(op);
            if let Some(start) = start {
                let elapsed = FastInstant::now().nanos_since(start);
                self.recorder.record(op.kind, elapsed);
            }
            result
        } else {
            (Status::error(MALFORMED_RECORD), 0)
        };

        let kind = op.kind;
        self.summary.operations[kind.index()] += 1;
        self.summary.entries_scanned += scanned;

        match &status {
            Status::Ok => {}
            Status::NotFound if tolerates_not_found(kind) => {
                self.summary.not_found[kind.index()] += 1;
            }
            Status::NotFound | Status::Error(_) => {
                self.summary.failures[kind.index()] += 1;
                error!(
                    key = %String::from_utf8_lossy(&op.key),
                    "Error {}: {}",
                    action(kind),
                    status
                );
            }
        }

        status
    }

    /// The store call alone; nothing else belongs in the timed window
    #[inline]
    fn call(&mut self, op: &Operation) -> (Status, u64) {
        let key = op.key.as_slice();
        match (op.kind, &op.payload) {
            (OperationKind::Insert | OperationKind::Update, Payload::Value(value)) => {
                (self.store.put(key, value), 0)
            }
            (OperationKind::Merge, Payload::Value(operand)) => (self.store.merge(key, operand), 0),
            (OperationKind::PointQuery, Payload::None) => {
                (self.store.get(key, &mut self.value_buf), 0)
            }
            (OperationKind::PointDelete, Payload::None) => (self.store.delete(key), 0),
            (OperationKind::RangeDelete, Payload::RangeEnd(end)) => {
                (self.store.delete_range(key, end), 0)
            }
            (OperationKind::RangeQuery, Payload::RangeEnd(end)) => self.store.scan(key, end),
            _ => (Status::error(MALFORMED_RECORD), 0),
        }
    }

    /// Dispatch every operation `reader` yields
    ///
    /// Per-operation failures are logged and skipped. Only a read error on the
    /// workload source itself stops the replay.
    pub fn replay<R: BufRead>(&mut self, reader: &mut WorkloadReader<R>) -> io::Result<()> {
        let started = FastInstant::now();
        for op in reader.by_ref() {
            let op = op?;
            self.dispatch(&op);
        }
        self.summary.elapsed += started.elapsed();
        self.summary.skipped_lines += reader.skipped();

        debug!(
            operations = self.summary.total_operations(),
            failures = self.summary.total_failures(),
            skipped = reader.skipped(),
            "replay finished"
        );
        Ok(())
    }

    pub fn summary(&self) -> &ReplaySummary {
        &self.summary
    }

    pub fn recorder(&self) -> &LatencyRecorder {
        &self.recorder
    }

    /// Release the store borrow and hand back samples and counters
    pub fn finish(self) -> (LatencyRecorder, ReplaySummary) {
        (self.recorder, self.summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::{MockStore, StoreCall};
    use crate::workload::parse_line;
    use std::io::Cursor;

    const SCENARIO: &str = "I a 1\nI b 2\nU a 9\nP a\nP z\n";

    fn replay_text(store: &mut MockStore, text: &str, measure: bool) -> (LatencyRecorder, ReplaySummary) {
        let mut reader = WorkloadReader::new(Cursor::new(text.as_bytes().to_vec()));
        let mut dispatcher = Dispatcher::new(store, measure);
        dispatcher.replay(&mut reader).unwrap();
        dispatcher.finish()
    }

    #[test]
    fn test_end_to_end_scenario() {
        let mut store = MockStore::new();
        let (recorder, summary) = replay_text(&mut store, SCENARIO, true);

        assert_eq!(
            store.table().entries(),
            vec![
                (b"a".to_vec(), b"9".to_vec()),
                (b"b".to_vec(), b"2".to_vec()),
            ]
        );
        assert_eq!(summary.not_found(OperationKind::PointQuery), 1);
        assert_eq!(summary.total_failures(), 0);

        let writes = recorder.samples(OperationKind::Insert).len()
            + recorder.samples(OperationKind::Update).len();
        assert_eq!(writes, 3);
        assert_eq!(recorder.samples(OperationKind::PointQuery).len(), 2);

        let kinds: Vec<_> = recorder.events().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::Insert,
                OperationKind::Insert,
                OperationKind::Update,
                OperationKind::PointQuery,
                OperationKind::PointQuery,
            ]
        );
    }

    #[test]
    fn test_point_query_not_found_is_not_a_failure() {
        let mut store = MockStore::new();
        let mut dispatcher = Dispatcher::new(&mut store, false);

        let status = dispatcher.dispatch(&parse_line(b"P missing").unwrap());
        assert_eq!(status, Status::NotFound);
        assert_eq!(dispatcher.summary().failures(OperationKind::PointQuery), 0);
        assert_eq!(dispatcher.summary().not_found(OperationKind::PointQuery), 1);
    }

    #[test]
    fn test_failure_does_not_stop_replay() {
        let mut store = MockStore::new();
        store.set_write_failure(Some("disk full"));
        let (_, summary) = replay_text(&mut store, "I a 1\nI b 2\nP a\n", false);

        assert_eq!(summary.failures(OperationKind::Insert), 2);
        assert_eq!(summary.not_found(OperationKind::PointQuery), 1);
        assert_eq!(summary.total_operations(), 3);
        assert_eq!(store.calls().len(), 3);
        assert!(store.table().is_empty());
    }

    #[test]
    fn test_measurement_does_not_change_store_calls() {
        let workload = "I a 1\nM a 2\nP a\nS a z\nD a\nR a z\nX bogus\nU b 3\n";

        let mut measured = MockStore::new();
        let (recorder, measured_summary) = replay_text(&mut measured, workload, true);

        let mut unmeasured = MockStore::new();
        let (silent, unmeasured_summary) = replay_text(&mut unmeasured, workload, false);

        assert_eq!(measured.calls(), unmeasured.calls());
        assert_eq!(measured.table().entries(), unmeasured.table().entries());
        assert_eq!(recorder.len(), 7);
        assert!(silent.is_empty());
        assert_eq!(
            measured_summary.total_operations(),
            unmeasured_summary.total_operations()
        );
        assert_eq!(measured_summary.skipped_lines, 1);
    }

    #[test]
    fn test_each_kind_maps_to_one_call() {
        let mut store = MockStore::new();
        let (_, summary) = replay_text(&mut store, "I k v\nM k w\nS a z\nR a z\nD k\n", false);

        assert_eq!(
            store.calls(),
            &[
                StoreCall::Put { key: b"k".to_vec(), value: b"v".to_vec() },
                StoreCall::Merge { key: b"k".to_vec(), operand: b"w".to_vec() },
                StoreCall::Scan { start: b"a".to_vec(), end: b"z".to_vec() },
                StoreCall::DeleteRange { start: b"a".to_vec(), end: b"z".to_vec() },
                StoreCall::Delete { key: b"k".to_vec() },
            ]
        );
        assert_eq!(summary.entries_scanned, 1);
    }

    #[test]
    fn test_unknown_opcode_does_not_stop_later_lines() {
        let mut store = MockStore::new();
        let (_, summary) = replay_text(&mut store, "I a 1\nQ nope\nI b 2\n", false);

        assert_eq!(summary.operations(OperationKind::Insert), 2);
        assert_eq!(summary.skipped_lines, 1);
        assert_eq!(store.table().len(), 2);
    }

    #[test]
    fn test_replay_is_repeatable_on_fresh_stores() {
        let workload = "I a 1\nI b 2\nM a x\nD b\nI c 3\n";

        let mut first = MockStore::new();
        replay_text(&mut first, workload, true);
        let mut second = MockStore::new();
        replay_text(&mut second, workload, true);

        assert_eq!(first.table().entries(), second.table().entries());
        assert_eq!(
            first.table().entries(),
            vec![(b"a".to_vec(), b"1x".to_vec()), (b"c".to_vec(), b"3".to_vec())]
        );
    }

    #[test]
    fn test_dispatch_through_trait_object() {
        let mut store: Box<dyn Store> = Box::new(MockStore::new());
        let mut dispatcher = Dispatcher::new(store.as_mut(), true);
        assert!(dispatcher.dispatch(&parse_line(b"I a 1").unwrap()).ok());
        assert_eq!(dispatcher.recorder().len(), 1);
    }

    #[test]
    fn test_read_failure_is_counted_and_replay_continues() {
        let mut store = MockStore::new();
        store.set_read_failure(Some("io"));
        let (recorder, summary) = replay_text(&mut store, "P a\nS a z\nI b 1\n", true);

        assert_eq!(summary.failures(OperationKind::PointQuery), 1);
        assert_eq!(summary.failures(OperationKind::RangeQuery), 1);
        assert_eq!(summary.not_found(OperationKind::PointQuery), 0);
        assert_eq!(summary.failures(OperationKind::Insert), 0);
        assert_eq!(summary.total_operations(), 3);
        assert_eq!(store.table().entries(), vec![(b"b".to_vec(), b"1".to_vec())]);
        assert_eq!(recorder.len(), 3);
    }

    #[test]
    fn test_mismatched_payload_fails_without_store_call() {
        let mut store = MockStore::new();
        let mut dispatcher = Dispatcher::new(&mut store, true);

        let op = Operation {
            kind: OperationKind::Insert,
            key: b"a".to_vec(),
            payload: Payload::None,
        };
        let status = dispatcher.dispatch(&op);
        assert!(matches!(&status, Status::Error(detail) if detail.starts_with("malformed record")));

        let range = Operation {
            kind: OperationKind::RangeQuery,
            key: b"a".to_vec(),
            payload: Payload::Value(b"z".to_vec()),
        };
        assert!(matches!(dispatcher.dispatch(&range), Status::Error(_)));

        let (recorder, summary) = dispatcher.finish();
        assert_eq!(summary.failures(OperationKind::Insert), 1);
        assert_eq!(summary.failures(OperationKind::RangeQuery), 1);
        assert_eq!(summary.total_operations(), 2);
        assert!(recorder.is_empty());
        assert!(store.calls().is_empty());
    }
}
