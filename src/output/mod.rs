//! Output formatting
//!
//! - [`report`]: percentile summary file, one block per operation kind
//! - [`json`]: raw per-operation latency events
//! - [`text`]: human-readable console summary
//!
//! Report files hold results only. Diagnostics go through `tracing` to stderr.

pub mod json;
pub mod report;
pub mod text;
