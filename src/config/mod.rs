//! Configuration module
//!
//! Handles CLI argument parsing, the TOML store options file, and validation.

pub mod cli;
pub mod cli_convert;
pub mod toml;
pub mod validator;
pub mod workload;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Store options file contents
///
/// ```toml
/// engine = "log"
///
/// [log]
/// sync_writes = false
/// write_buffer_size = 65536
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreOptions {
    /// Store backend
    #[serde(default)]
    pub engine: EngineType,
    /// Options for the log backend
    #[serde(default)]
    pub log: LogOptions,
}

/// Store backend type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineType {
    /// Append-only log file with an in-memory index
    #[default]
    Log,
    /// Ordered in-process map
    Memory,
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineType::Log => write!(f, "log"),
            EngineType::Memory => write!(f, "memory"),
        }
    }
}

/// Log backend options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogOptions {
    /// fsync the log after every write
    #[serde(default)]
    pub sync_writes: bool,
    /// Bytes buffered before the log writer flushes
    #[serde(default = "default_write_buffer_size")]
    pub write_buffer_size: usize,
    /// Create the database directory if it does not exist
    #[serde(default = "default_true")]
    pub create_if_missing: bool,
    /// Refuse to open a directory that already holds a log
    #[serde(default)]
    pub error_if_exists: bool,
}

fn default_write_buffer_size() -> usize {
    64 * 1024
}

fn default_true() -> bool {
    true
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            sync_writes: false,
            write_buffer_size: default_write_buffer_size(),
            create_if_missing: true,
            error_if_exists: false,
        }
    }
}

/// Complete configuration for one replay run
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// Store options file
    pub store_options_path: PathBuf,
    /// Workload file
    pub workload_path: PathBuf,
    /// Percentile summary output, if measuring
    pub stats_path: Option<PathBuf>,
    /// Raw latency event output, if measuring
    pub latency_path: Option<PathBuf>,
    /// Database directory
    pub db_path: PathBuf,
    /// Record per-operation latencies
    pub measurement_enabled: bool,
    /// Leave the database on disk after the run
    pub keep_db: bool,
}

impl fmt::Display for ReplayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Store options: {}", self.store_options_path.display())?;
        writeln!(f, "Workload:      {}", self.workload_path.display())?;
        writeln!(f, "Database:      {}", self.db_path.display())?;
        write!(
            f,
            "Measurement:   {}",
            if self.measurement_enabled { "enabled" } else { "disabled" }
        )?;
        if let Some(path) = &self.stats_path {
            write!(f, "\nStats file:    {}", path.display())?;
        }
        if let Some(path) = &self.latency_path {
            write!(f, "\nLatency file:  {}", path.display())?;
        }
        Ok(())
    }
}
