//! In-memory store backend
//!
//! Keeps every entry in an ordered map. Nothing is persisted, so destroy is a
//! no-op. The [`MemTable`] here is also the index behind the log backend and
//! the mock.

use super::{Status, Store};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Ordered key-value table with merge and range semantics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemTable {
    map: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl MemTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.map.insert(key.to_vec(), value.to_vec());
    }

    pub fn get(&self, key: &[u8]) -> Option<&[u8]> {
        self.map.get(key).map(Vec::as_slice)
    }

    /// String-append merge: the operand is appended to the existing value
    pub fn merge(&mut self, key: &[u8], operand: &[u8]) {
        match self.map.get_mut(key) {
            Some(existing) => existing.extend_from_slice(operand),
            None => {
                self.map.insert(key.to_vec(), operand.to_vec());
            }
        }
    }

    /// Returns true if the key was present
    pub fn delete(&mut self, key: &[u8]) -> bool {
        self.map.remove(key).is_some()
    }

    /// Remove `[start, end)`, returning how many entries went away
    pub fn delete_range(&mut self, start: &[u8], end: &[u8]) -> usize {
        if start >= end {
            return 0;
        }
        let mut tail = self.map.split_off(start);
        let mut after = tail.split_off(end);
        self.map.append(&mut after);
        tail.len()
    }

    /// Walk `[start, end)`, returning the entry count
    pub fn scan(&self, start: &[u8], end: &[u8]) -> u64 {
        if start >= end {
            return 0;
        }
        let mut count = 0u64;
        let mut bytes = 0usize;
        let range = (Bound::Included(start), Bound::Excluded(end));
        for (key, value) in self.map.range::<[u8], _>(range) {
            count += 1;
            bytes += key.len() + value.len();
        }
        std::hint::black_box(bytes);
        count
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Every live entry, in key order
    pub fn entries(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.map.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Store backend holding everything in a [`MemTable`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: MemTable,
    closed: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &MemTable {
        &self.table
    }

    fn check_open(&self) -> Result<(), Status> {
        if self.closed {
            Err(Status::error("store is closed"))
        } else {
            Ok(())
        }
    }
}

impl Store for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Status {
        if let Err(status) = self.check_open() {
            return status;
        }
        self.table.put(key, value);
        Status::Ok
    }

    fn get(&mut self, key: &[u8], value: &mut Vec<u8>) -> Status {
        value.clear();
        if let Err(status) = self.check_open() {
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
        if let Err(status) = self.check_open() {
            return status;
        }
        self.table.merge(key, operand);
        Status::Ok
    }

    fn delete(&mut self, key: &[u8]) -> Status {
        if let Err(status) = self.check_open() {
            return status;
        }
        self.table.delete(key);
        Status::Ok
    }

    fn delete_range(&mut self, start: &[u8], end: &[u8]) -> Status {
        if let Err(status) = self.check_open() {
            return status;
        }
        self.table.delete_range(start, end);
        Status::Ok
    }

    fn scan(&mut self, start: &[u8], end: &[u8]) -> (Status, u64) {
        if let Err(status) = self.check_open() {
            return (status, 0);
        }
        (Status::Ok, self.table.scan(start, end))
    }

    fn close(&mut self) -> Status {
        if let Err(status) = self.check_open() {
            return status;
        }
        self.closed = true;
        Status::Ok
    }
}
