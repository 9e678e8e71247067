//! Human-readable text output

use crate::dispatch::ReplaySummary;
use crate::stats::histogram::LatencyHistogram;
use crate::stats::LatencyRecorder;
use crate::util::time::{calculate_ops_per_sec, format_duration, format_number, format_rate};
use crate::workload::OperationKind;
use crate::Result;
use std::io::{self, Write};
use std::time::Duration;

const RULE: &str = "═══════════════════════════════════════════════════════════";

/// Print replay results to stdout
///
/// Displays:
/// - Elapsed time and overall rate
/// - Per-kind operation counts with failures and misses
/// - Per-kind latency (min, mean, max, tail percentiles) when measured
pub fn print_results(summary: &ReplaySummary, recorder: &LatencyRecorder) -> Result<()> {
    let stdout = io::stdout();
    write_results(stdout.lock(), summary, recorder)
}

/// Render the results to any writer
pub fn write_results<W: Write>(
    mut out: W,
    summary: &ReplaySummary,
    recorder: &LatencyRecorder,
) -> Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "                    REPLAY RESULTS")?;
    writeln!(out, "{}", RULE)?;
    writeln!(out)?;

    writeln!(out, "Elapsed Time: {:.3}s", summary.elapsed.as_secs_f64())?;
    writeln!(out)?;

    writeln!(out, "Operations:")?;
    for kind in OperationKind::ALL {
        let ops = summary.operations(kind);
        if ops == 0 {
            continue;
        }
        write!(out, "  {:<13} {:>12} ops", format!("{}:", kind.label()), format_number(ops))?;
        if summary.failures(kind) > 0 {
            write!(out, ", {} failed", format_number(summary.failures(kind)))?;
        }
        if summary.not_found(kind) > 0 {
            write!(out, ", {} not found", format_number(summary.not_found(kind)))?;
        }
        writeln!(out)?;
    }

    let total = summary.total_operations();
    let rate = calculate_ops_per_sec(total, summary.elapsed);
    writeln!(out, "  {:<13} {:>12} ops - {} ops/s", "Total:", format_number(total), format_rate(rate))?;
    if summary.skipped_lines > 0 {
        writeln!(out, "  Skipped lines: {}", format_number(summary.skipped_lines))?;
    }
    if summary.entries_scanned > 0 {
        writeln!(out, "  Entries scanned: {}", format_number(summary.entries_scanned))?;
    }
    writeln!(out)?;

    writeln!(out, "Latency:")?;
    if !recorder.is_enabled() {
        writeln!(out, "  Measurement disabled")?;
    } else if recorder.is_empty() {
        writeln!(out, "  No latency data collected")?;
    } else {
        writeln!(
            out,
            "  {:<13} {:>10} {:>10} {:>10} {:>10} {:>10}",
            "", "min", "mean", "p50", "p99", "max"
        )?;
        for kind in recorder.kinds() {
            let hist = LatencyHistogram::from_samples(recorder.samples(kind))?;
            writeln!(
                out,
                "  {:<13} {:>10} {:>10} {:>10} {:>10} {:>10}",
                format!("{}:", kind.label()),
                show(hist.min()),
                show(hist.mean()),
                show(hist.percentile(50.0)),
                show(hist.percentile(99.0)),
                show(hist.max()),
            )?;
        }
    }
    writeln!(out)?;

    out.flush()?;
    Ok(())
}

fn show(value: Option<Duration>) -> String {
    value.map(format_duration).unwrap_or_else(|| "-".to_string())
}
