//! Raw latency event output
//!
//! Writes every recorded sample as a JSON array in recording order:
//!
//! ```json
//! [{"operation":"insert","latency":1043},{"operation":"point query","latency":388}]
//! ```
//!
//! Events are streamed straight from the recorder, so no second copy of the
//! samples is built.

use crate::stats::{LatencyRecorder, LatencySample};
use crate::Result;
use anyhow::Context;
use serde::{Deserialize, Serialize, Serializer};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// One line of the latency report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonLatencyEvent {
    /// Operation kind label, e.g. `"point query"`
    pub operation: String,
    /// Elapsed nanoseconds of the store call
    pub latency: u64,
}

impl From<LatencySample> for JsonLatencyEvent {
    fn from(sample: LatencySample) -> Self {
        Self {
            operation: sample.kind.label().to_string(),
            latency: sample.elapsed_nanos,
        }
    }
}

/// Serialize every event in `recorder` to `writer`
pub fn write_latency_events<W: Write>(writer: W, recorder: &LatencyRecorder, pretty: bool) -> Result<()> {
    let events = recorder.events().map(JsonLatencyEvent::from);

    if pretty {
        let mut ser = serde_json::Serializer::pretty(writer);
        ser.collect_seq(events)?;
        ser.into_inner().flush()?;
    } else {
        let mut ser = serde_json::Serializer::new(writer);
        ser.collect_seq(events)?;
        ser.into_inner().flush()?;
    }

    Ok(())
}

/// Write the latency report to `path`
pub fn write_latency_file(path: &Path, recorder: &LatencyRecorder) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create latency file: {}", path.display()))?;
    write_latency_events(BufWriter::new(file), recorder, false)
        .with_context(|| format!("Failed to write latency file: {}", path.display()))?;

    tracing::info!(path = %path.display(), events = recorder.len(), "wrote latency report");
    Ok(())
}
