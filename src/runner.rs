//! Replay run lifecycle
//!
//! A run opens the workload, loads the store options, opens the store, replays
//! every operation, closes the store, destroys the database, and writes the
//! reports. Any failure in those setup and teardown steps ends the run with
//! an error. Per-operation failures never do.

use crate::config::toml::parse_store_options_file;
use crate::config::validator::validate_store_options;
use crate::config::{ReplayConfig, StoreOptions};
use crate::dispatch::{Dispatcher, ReplaySummary};
use crate::output::{json, report};
use crate::stats::LatencyRecorder;
use crate::store::{destroy_store, open_store, Status, Store};
use crate::workload::WorkloadReader;
use crate::Result;
use anyhow::Context;
use std::io::BufRead;
use tracing::{debug, info};

/// What a finished run produced
#[derive(Debug)]
pub struct RunOutcome {
    pub summary: ReplaySummary,
    pub recorder: LatencyRecorder,
    /// Backend counters captured before close
    pub store_statistics: Option<String>,
}

/// Execute one replay as described by `config`
pub fn run(config: &ReplayConfig) -> Result<RunOutcome> {
    let mut reader = WorkloadReader::open(&config.workload_path)?;

    let options = parse_store_options_file(&config.store_options_path)?;
    validate_store_options(&options).context("Invalid store options")?;

    let mut store = open_store(&options, &config.db_path)
        .with_context(|| format!("Failed to open {} store", options.engine))?;
    let outcome = replay_store(config, &mut reader, store.as_mut())?;
    drop(store);

    teardown(&options, config)?;
    write_reports(config, &outcome)?;
    Ok(outcome)
}

/// Replay the workload into an open store, then close it
///
/// Store statistics are captured before close. A close failure is fatal.
pub fn replay_store<R: BufRead>(
    config: &ReplayConfig,
    reader: &mut WorkloadReader<R>,
    store: &mut dyn Store,
) -> Result<RunOutcome> {
    info!(
        engine = store.name(),
        db = %config.db_path.display(),
        measure = config.measurement_enabled,
        "replaying workload"
    );

    let mut dispatcher = Dispatcher::new(&mut *store, config.measurement_enabled);
    dispatcher.replay(reader).with_context(|| {
        format!(
            "Failed reading workload file {} near line {}",
            config.workload_path.display(),
            reader.line_number()
        )
    })?;
    let (recorder, summary) = dispatcher.finish();

    let store_statistics = store.statistics();
    match store.close() {
        Status::Ok => {}
        status => anyhow::bail!("Failed to close store: {}", status),
    }

    Ok(RunOutcome {
        summary,
        recorder,
        store_statistics,
    })
}

/// Destroy the database unless the run asked to keep it
pub fn teardown(options: &StoreOptions, config: &ReplayConfig) -> Result<()> {
    if config.keep_db {
        debug!(db = %config.db_path.display(), "keeping database");
        return Ok(());
    }
    destroy_store(options, &config.db_path).context("Failed to destroy store")
}

/// Write the stats and latency files the run was asked for
pub fn write_reports(config: &ReplayConfig, outcome: &RunOutcome) -> Result<()> {
    if let Some(path) = &config.stats_path {
        report::write_stats_file(path, &outcome.recorder, outcome.store_statistics.as_deref())?;
    }
    if let Some(path) = &config.latency_path {
        json::write_latency_file(path, &outcome.recorder)?;
    }
    Ok(())
}
