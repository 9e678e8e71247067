//! kvreplay - workload replay benchmark for key-value stores
//!
//! kvreplay reads a log of textual operation records, replays each one against
//! a key-value store, and reports per-operation-kind latency percentiles.
//!
//! # Architecture
//!
//! - **Workload reader**: streams and parses records, skipping malformed lines
//! - **Dispatcher**: one store call per record, timed only when measuring
//! - **Stores**: append-only log, in-memory map, and a recording mock
//! - **Statistics**: exact interpolated percentiles plus HdrHistogram summaries
//! - **Reports**: percentile text file and raw JSON latency events
//! - **Generator**: synthetic load/query/update workloads (`kvreplay-gen`)

pub mod config;
pub mod dispatch;
pub mod distribution;
pub mod output;
pub mod runner;
pub mod stats;
pub mod store;
pub mod util;
pub mod workload;

// Re-export commonly used types
pub use config::ReplayConfig;
pub use store::{Status, Store};

/// Result type used throughout kvreplay
pub type Result<T> = anyhow::Result<T>;
