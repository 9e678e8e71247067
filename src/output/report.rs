//! Percentile summary report
//!
//! For every operation kind with samples, in kind order:
//!
//! ```text
//! insert (ns)
//! p0,812
//! p25,1043.5
//! p50,1190
//! p75,1402.25
//! p95,2210.8
//! ```
//!
//! When the store exposes its own counters they follow in a
//! `[store.statistics]` section.

use crate::stats::percentile::{PercentileSummary, REPORT_PERCENTILES};
use crate::stats::LatencyRecorder;
use crate::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Header line of the optional store counters section
pub const STORE_STATISTICS_HEADER: &str = "[store.statistics]";

/// Write percentile blocks followed by optional store statistics
pub fn write_stats<W: Write>(
    mut out: W,
    summaries: &[PercentileSummary],
    store_statistics: Option<&str>,
) -> io::Result<()> {
    for summary in summaries {
        writeln!(out, "{} (ns)", summary.kind.label())?;
        for (p, value) in &summary.values {
            writeln!(out, "p{},{}", p, value)?;
        }
    }

    if let Some(statistics) = store_statistics {
        writeln!(out, "{}", STORE_STATISTICS_HEADER)?;
        out.write_all(statistics.as_bytes())?;
        if !statistics.ends_with('\n') {
            writeln!(out)?;
        }
    }

    out.flush()
}

/// Summarize `recorder` at the report percentiles and write it to `path`
pub fn write_stats_file(
    path: &Path,
    recorder: &LatencyRecorder,
    store_statistics: Option<&str>,
) -> Result<()> {
    let summaries = recorder.summaries(&REPORT_PERCENTILES)?;

    let file = File::create(path)
        .with_context(|| format!("Failed to create stats file: {}", path.display()))?;
    write_stats(BufWriter::new(file), &summaries, store_statistics)
        .with_context(|| format!("Failed to write stats file: {}", path.display()))?;

    tracing::info!(path = %path.display(), kinds = summaries.len(), "wrote stats report");
    Ok(())
}
