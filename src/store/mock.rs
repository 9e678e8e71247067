//! Mock store for testing
//!
//! Behaves like the in-memory backend but records every call in order and can
//! be told to fail writes, reads, or close with a given detail.
//!
//! # Example
//!
//! ```
//! use kvreplay::store::{Store, Status};
//! use kvreplay::store::mock::{MockStore, StoreCall};
//!
//! let mut store = MockStore::new();
//! store.set_write_failure(Some("disk full"));
//! assert_eq!(store.put(b"k", b"v"), Status::Error("disk full".to_string()));
//! assert_eq!(store.calls(), &[StoreCall::Put { key: b"k".to_vec(), value: b"v".to_vec() }]);
//! ```

use super::memory::MemTable;
use super::{Status, Store};

/// Record of a call made against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Put { key: Vec<u8>, value: Vec<u8> },
    Get { key: Vec<u8> },
    Merge { key: Vec<u8>, operand: Vec<u8> },
    Delete { key: Vec<u8> },
    DeleteRange { start: Vec<u8>, end: Vec<u8> },
    Scan { start: Vec<u8>, end: Vec<u8> },
    Close,
}

/// Store that tracks calls and injects failures
#[derive(Debug, Default)]
pub struct MockStore {
    table: MemTable,
    calls: Vec<StoreCall>,
    write_failure: Option<String>,
    read_failure: Option<String>,
    close_failure: Option<String>,
    statistics: Option<String>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every mutating call with `detail` (or stop failing with `None`)
    pub fn set_write_failure(&mut self, detail: Option<&str>) {
        self.write_failure = detail.map(str::to_string);
    }

    /// Fail every get and scan with `detail`
    pub fn set_read_failure(&mut self, detail: Option<&str>) {
        self.read_failure = detail.map(str::to_string);
    }

    pub fn set_close_failure(&mut self, detail: Option<&str>) {
        self.close_failure = detail.map(str::to_string);
    }

    /// Text returned from [`Store::statistics`]
    pub fn set_statistics(&mut self, statistics: Option<&str>) {
        self.statistics = statistics.map(str::to_string);
    }

    /// Every call made so far, in order
    pub fn calls(&self) -> &[StoreCall] {
        &self.calls
    }

    pub fn table(&self) -> &MemTable {
        &self.table
    }

    fn write_status(&self) -> Status {
        match &self.write_failure {
            Some(detail) => Status::error(detail.clone()),
            None => Status::Ok,
        }
    }

    fn read_status(&self) -> Status {
        match &self.read_failure {
            Some(detail) => Status::error(detail.clone()),
            None => Status::Ok,
        }
    }
}

impl Store for MockStore {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Status {
        self.calls.push(StoreCall::Put {
            key: key.to_vec(),
            value: value.to_vec(),
        });
        let status = self.write_status();
        if status.ok() {
            self.table.put(key, value);
        }
        status
    }

    fn get(&mut self, key: &[u8], value: &mut Vec<u8>) -> Status {
        self.calls.push(StoreCall::Get { key: key.to_vec() });
        value.clear();
        let status = self.read_status();
        if !status.ok() {
            return status;
        }
        match self.table.get(key) {
            Some(found) => {
                value.extend_from_slice(found);
                Status::Ok
            }
            None => Status::NotFound,
        }
    }

    fn merge(&mut self, key: &[u8], operand: &[u8]) -> Status {
        self.calls.push(StoreCall::Merge {
            key: key.to_vec(),
            operand: operand.to_vec(),
        });
        let status = self.write_status();
        if status.ok() {
            self.table.merge(key, operand);
        }
        status
    }

    fn delete(&mut self, key: &[u8]) -> Status {
        self.calls.push(StoreCall::Delete { key: key.to_vec() });
        let status = self.write_status();
        if status.ok() {
            self.table.delete(key);
        }
        status
    }

    fn delete_range(&mut self, start: &[u8], end: &[u8]) -> Status {
        self.calls.push(StoreCall::DeleteRange {
            start: start.to_vec(),
            end: end.to_vec(),
        });
        let status = self.write_status();
        if status.ok() {
            self.table.delete_range(start, end);
        }
        status
    }

    fn scan(&mut self, start: &[u8], end: &[u8]) -> (Status, u64) {
        self.calls.push(StoreCall::Scan {
            start: start.to_vec(),
            end: end.to_vec(),
        });
        let status = self.read_status();
        if !status.ok() {
            return (status, 0);
        }
        (Status::Ok, self.table.scan(start, end))
    }

    fn close(&mut self) -> Status {
        self.calls.push(StoreCall::Close);
        match &self.close_failure {
            Some(detail) => Status::error(detail.clone()),
            None => Status::Ok,
        }
    }

    fn statistics(&self) -> Option<String> {
        self.statistics.clone()
    }
}
