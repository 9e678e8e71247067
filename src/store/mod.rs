//! Store abstraction
//!
//! The replay core drives a key-value store only through the [`Store`] trait.
//! Backends differ in how they persist data; the dispatcher is agnostic to that,
//! so the engine under test is selected at run time from the store options file.
//!
//! # Backends
//!
//! - **log**: append-only log file in a database directory, with an in-memory index
//! - **memory**: ordered in-process map, nothing persisted
//! - **mock**: records every call and can inject failures (tests)
//!
//! # Lifecycle
//!
//! 1. [`open_store`] with the loaded [`StoreOptions`](crate::config::StoreOptions)
//! 2. Issue operations; each returns a [`Status`]
//! 3. [`Store::close`]
//! 4. [`destroy_store`] to remove whatever the backend left on disk

pub mod log;
pub mod memory;
pub mod mock;

use crate::config::{EngineType, StoreOptions};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Outcome of a single store call
///
/// `NotFound` is kept apart from `Error` so callers can match on it instead of
/// inspecting error strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    Error(String),
}

impl Status {
    /// Build an error status from any description
    pub fn error(detail: impl Into<String>) -> Self {
        Status::Error(detail.into())
    }

    #[inline]
    pub fn ok(&self) -> bool {
        matches!(self, Status::Ok)
    }

    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Status::NotFound)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Ok => write!(f, "OK"),
            Status::NotFound => write!(f, "NotFound"),
            Status::Error(detail) => write!(f, "Error: {}", detail),
        }
    }
}

impl From<io::Error> for Status {
    fn from(e: io::Error) -> Self {
        Status::Error(format!("IO error: {}", e))
    }
}

/// Capability set the replay core needs from a key-value store
///
/// Every call is synchronous; the dispatcher times it from just before the
/// call to just after it returns.
pub trait Store {
    /// Short backend name for logs and reports
    fn name(&self) -> &'static str;

    /// Write `value` under `key`, replacing any previous value
    fn put(&mut self, key: &[u8], value: &[u8]) -> Status;

    /// Read the value for `key` into `value`
    ///
    /// `value` is cleared first. Returns `NotFound` when the key is absent.
    fn get(&mut self, key: &[u8], value: &mut Vec<u8>) -> Status;

    /// Append `operand` to the current value of `key` (or store it if absent)
    fn merge(&mut self, key: &[u8], operand: &[u8]) -> Status;

    /// Remove `key`; removing an absent key is not an error
    fn delete(&mut self, key: &[u8]) -> Status;

    /// Remove every key in `[start, end)`
    fn delete_range(&mut self, start: &[u8], end: &[u8]) -> Status;

    /// Visit every entry in `[start, end)`, returning how many were seen
    fn scan(&mut self, start: &[u8], end: &[u8]) -> (Status, u64);

    /// Flush and release the store
    fn close(&mut self) -> Status;

    /// Backend counters, if the store keeps any
    fn statistics(&self) -> Option<String> {
        None
    }
}

/// Setup and teardown failures; these abort a run
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("couldn't open db at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("corrupt log {path} at offset {offset}: {reason}")]
    Corrupt {
        path: PathBuf,
        offset: u64,
        reason: String,
    },

    #[error("couldn't destroy db at {path}: {source}")]
    Destroy {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Open the backend selected by `options` at `path`
pub fn open_store(options: &StoreOptions, path: &Path) -> Result<Box<dyn Store>, StoreError> {
    let store: Box<dyn Store> = match options.engine {
        EngineType::Log => Box::new(log::LogStore::open(path, &options.log)?),
        EngineType::Memory => Box::new(memory::MemoryStore::new()),
    };
    tracing::debug!(engine = store.name(), path = %path.display(), "opened store");
    Ok(store)
}

/// Remove on-disk state left by the backend selected by `options`
pub fn destroy_store(options: &StoreOptions, path: &Path) -> Result<(), StoreError> {
    match options.engine {
        EngineType::Log => log::LogStore::destroy(path),
        EngineType::Memory => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(Status::Ok.ok());
        assert!(!Status::Ok.is_not_found());
        assert!(Status::NotFound.is_not_found());
        assert!(!Status::NotFound.ok());

        let err = Status::error("disk full");
        assert!(!err.ok());
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "Error: disk full");
    }

    #[test]
    fn test_status_from_io_error() {
        let status: Status = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(matches!(status, Status::Error(ref d) if d.contains("boom")));
    }

    #[test]
    fn test_open_memory_store() {
        let options = StoreOptions {
            engine: EngineType::Memory,
            ..Default::default()
        };
        let dir = tempfile::tempdir().unwrap();
        let mut store = open_store(&options, dir.path()).unwrap();

        assert_eq!(store.name(), "memory");
        assert!(store.put(b"k", b"v").ok());
        assert!(store.close().ok());
        destroy_store(&options, dir.path()).unwrap();
    }

    #[test]
    fn test_open_log_store_and_destroy() {
        let options = StoreOptions::default();
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("db");

        let mut store = open_store(&options, &db).unwrap();
        assert_eq!(store.name(), "log");
        assert!(store.put(b"k", b"v").ok());
        assert!(store.close().ok());
        assert!(db.exists());

        destroy_store(&options, &db).unwrap();
        assert!(!db.exists());
    }
}
