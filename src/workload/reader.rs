//! Streaming workload reader
//!
//! Reads one line at a time, so logs of any length replay in constant memory.
//! Lines that fail to parse are reported and skipped; the replay goes on.

use super::{parse_line, Operation};
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::warn;

/// Forward-only iterator of operations over a line-oriented source
pub struct WorkloadReader<R> {
    source: R,
    buf: Vec<u8>,
    line_number: u64,
    skipped: u64,
}

impl WorkloadReader<BufReader<File>> {
    /// Open a workload file
    ///
    /// Fails before any record is produced if the file cannot be opened.
    pub fn open(path: &Path) -> crate::Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Could not open workload file: {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> WorkloadReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            source,
            buf: Vec::new(),
            line_number: 0,
            skipped: 0,
        }
    }

    /// Lines read so far, including skipped and empty ones
    pub fn line_number(&self) -> u64 {
        self.line_number
    }

    /// Non-empty lines skipped because they did not parse
    pub fn skipped(&self) -> u64 {
        self.skipped
    }
}

impl<R: BufRead> Iterator for WorkloadReader<R> {
    type Item = io::Result<Operation>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.source.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e)),
            }
            self.line_number += 1;

            let mut line = self.buf.as_slice();
            if let Some(stripped) = line.strip_suffix(b"\n") {
                line = stripped;
            }
            if let Some(stripped) = line.strip_suffix(b"\r") {
                line = stripped;
            }
            if line.is_empty() {
                continue;
            }

            match parse_line(line) {
                Ok(op) => return Some(Ok(op)),
                Err(e) => {
                    warn!(line = self.line_number, "skipping workload record: {}", e);
                    self.skipped += 1;
                }
            }
        }
    }
}
