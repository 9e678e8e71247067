//! Log-structured store backend
//!
//! Every mutation is appended to a single log file inside the database
//! directory and applied to an in-memory [`MemTable`] index. Opening an
//! existing directory replays the log to rebuild the index.
//!
//! # Record layout
//!
//! ```text
//! record_type 1 byte | key_size 4 bytes LE | value_size 4 bytes LE | key | value
//! ```
//!
//! For range deletes the value field carries the exclusive range end.
//!
//! A failed append cuts the log back to the end of the last complete record
//! and leaves the store unusable: every later call, `close` included, returns
//! [`Status::Error`].

use super::memory::MemTable;
use super::{Status, Store, StoreError};
use crate::config::LogOptions;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name of the log file inside the database directory
pub const LOG_FILE: &str = "kv.log";

const HEADER_LEN: usize = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
enum RecordType {
    Put = 0,
    Merge = 1,
    Delete = 2,
    DeleteRange = 3,
}

impl RecordType {
    fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(RecordType::Put),
            1 => Some(RecordType::Merge),
            2 => Some(RecordType::Delete),
            3 => Some(RecordType::DeleteRange),
            _ => None,
        }
    }
}

/// Counters reported through [`Store::statistics`]
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogCounters {
    pub recovered_records: u64,
    pub puts: u64,
    pub merges: u64,
    pub deletes: u64,
    pub range_deletes: u64,
    pub gets: u64,
    pub get_hits: u64,
    pub scans: u64,
    pub scanned_entries: u64,
    pub bytes_written: u64,
    pub syncs: u64,
}

/// Log file handle under the store's buffered writer
struct LogFile {
    file: File,
    /// Simulated file size cap, like `RLIMIT_FSIZE`
    #[cfg(test)]
    size_limit: Option<u64>,
}

impl LogFile {
    fn new(file: File) -> Self {
        Self {
            file,
            #[cfg(test)]
            size_limit: None,
        }
    }
}

impl Write for LogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        #[cfg(test)]
        if let Some(limit) = self.size_limit {
            let len = self.file.metadata()?.len();
            if len >= limit {
                return Err(io::Error::new(io::ErrorKind::Other, "File too large"));
            }
            let room = (limit - len) as usize;
            if buf.len() > room {
                return self.file.write(&buf[..room]);
            }
        }
        self.file.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Append-only log store
pub struct LogStore {
    dir: PathBuf,
    writer: Option<BufWriter<LogFile>>,
    table: MemTable,
    sync_writes: bool,
    counters: LogCounters,
    /// Log length up to the end of the last complete record
    committed_len: u64,
    /// Set once an append fails
    poisoned: Option<String>,
}

impl LogStore {
    /// Open (or create) the store in `dir`
    pub fn open(dir: &Path, options: &LogOptions) -> Result<Self, StoreError> {
        let open_err = |source: io::Error| StoreError::Open {
            path: dir.to_path_buf(),
            source,
        };

        let log_path = dir.join(LOG_FILE);
        if !dir.exists() {
            if !options.create_if_missing {
                return Err(open_err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "database directory does not exist and create_if_missing is false",
                )));
            }
            fs::create_dir_all(dir).map_err(open_err)?;
        } else if options.error_if_exists && log_path.exists() {
            return Err(open_err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "database exists and error_if_exists is true",
            )));
        }

        let mut counters = LogCounters::default();
        let table = if log_path.exists() {
            let (table, recovered) = replay(&log_path)?;
            counters.recovered_records = recovered;
            table
        } else {
            MemTable::new()
        };
        if counters.recovered_records > 0 {
            warn!(
                records = counters.recovered_records,
                keys = table.len(),
                path = %log_path.display(),
                "database already holds data, replay starts from the recovered state"
            );
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
            .map_err(open_err)?;
        let committed_len = file.metadata().map_err(open_err)?.len();

        Ok(Self {
            dir: dir.to_path_buf(),
            writer: Some(BufWriter::with_capacity(
                options.write_buffer_size,
                LogFile::new(file),
            )),
            table,
            sync_writes: options.sync_writes,
            counters,
            committed_len,
            poisoned: None,
        })
    }

    /// Remove the database directory and everything in it
    pub fn destroy(dir: &Path) -> Result<(), StoreError> {
        if !dir.exists() {
            return Ok(());
        }
        fs::remove_dir_all(dir).map_err(|source| StoreError::Destroy {
            path: dir.to_path_buf(),
            source,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn table(&self) -> &MemTable {
        &self.table
    }

    pub fn counters(&self) -> &LogCounters {
        &self.counters
    }

    /// Status returned by every call once the writer is gone
    fn unavailable(&self) -> Status {
        match &self.poisoned {
            Some(detail) => Status::error(format!("store unusable after failed write: {}", detail)),
            None => Status::error("store is closed"),
        }
    }

    fn append(&mut self, record_type: RecordType, key: &[u8], value: &[u8]) -> Status {
        let Some(writer) = self.writer.as_mut() else {
            return self.unavailable();
        };
        if key.len() > u32::MAX as usize || value.len() > u32::MAX as usize {
            return Status::error("record field exceeds 4 GiB");
        }

        let result = write_record(writer, record_type, key, value).and_then(|written| {
            if self.sync_writes {
                writer.flush()?;
                writer.get_ref().file.sync_data()?;
            }
            Ok(written)
        });

        match result {
            Ok(written) => {
                self.committed_len += written as u64;
                self.counters.bytes_written += written as u64;
                if self.sync_writes {
                    self.counters.syncs += 1;
                }
                Status::Ok
            }
            Err(e) => self.poison(e),
        }
    }

    /// Drop the writer after a failed append and cut any partial record
    fn poison(&mut self, error: io::Error) -> Status {
        let detail = error.to_string();
        if let Some(writer) = self.writer.take() {
            // Buffered bytes are discarded, never flushed behind a failure
            let (log_file, _unflushed) = writer.into_parts();
            let truncated = log_file.file.metadata().and_then(|meta| {
                if meta.len() > self.committed_len {
                    log_file.file.set_len(self.committed_len)?;
                }
                Ok(meta.len())
            });
            match truncated {
                Ok(len) if len < self.committed_len => warn!(
                    dir = %self.dir.display(),
                    on_disk = len,
                    committed = self.committed_len,
                    "log write failed before buffered records reached disk"
                ),
                Ok(_) => {}
                Err(e) => warn!(
                    dir = %self.dir.display(),
                    "could not truncate log after failed write: {}",
                    e
                ),
            }
        }
        self.poisoned = Some(detail.clone());
        Status::error(detail)
    }

    /// Cap the log file size so the next append past it fails
    #[cfg(test)]
    fn set_size_limit(&mut self, limit: u64) {
        if let Some(writer) = self.writer.as_mut() {
            writer.get_mut().size_limit = Some(limit);
        }
    }
}

fn write_record<W: Write>(
    writer: &mut W,
    record_type: RecordType,
    key: &[u8],
    value: &[u8],
) -> io::Result<usize> {
    let mut header = [0u8; HEADER_LEN];
    header[0] = record_type as u8;
    header[1..5].copy_from_slice(&(key.len() as u32).to_le_bytes());
    header[5..9].copy_from_slice(&(value.len() as u32).to_le_bytes());

    writer.write_all(&header)?;
    writer.write_all(key)?;
    writer.write_all(value)?;
    Ok(HEADER_LEN + key.len() + value.len())
}

/// Rebuild the index from the log, returning it with the record count
fn replay(path: &Path) -> Result<(MemTable, u64), StoreError> {
    let data = fs::read(path).map_err(|source| StoreError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let corrupt = |offset: usize, reason: &str| StoreError::Corrupt {
        path: path.to_path_buf(),
        offset: offset as u64,
        reason: reason.to_string(),
    };

    let mut table = MemTable::new();
    let mut records = 0u64;
    let mut offset = 0usize;

    while offset < data.len() {
        let Some(header) = data.get(offset..offset + HEADER_LEN) else {
            return Err(corrupt(offset, "truncated record header"));
        };
        let record_type =
            RecordType::from_u8(header[0]).ok_or_else(|| corrupt(offset, "unknown record type"))?;
        let key_len = u32::from_le_bytes([header[1], header[2], header[3], header[4]]) as usize;
        let value_len = u32::from_le_bytes([header[5], header[6], header[7], header[8]]) as usize;

        let key_start = offset + HEADER_LEN;
        let value_start = key_start + key_len;
        let end = value_start + value_len;
        if end > data.len() {
            return Err(corrupt(offset, "truncated record body"));
        }
        let key = &data[key_start..value_start];
        let value = &data[value_start..end];

        match record_type {
            RecordType::Put => table.put(key, value),
            RecordType::Merge => table.merge(key, value),
            RecordType::Delete => {
                table.delete(key);
            }
            RecordType::DeleteRange => {
                table.delete_range(key, value);
            }
        }

        records += 1;
        offset = end;
    }

    Ok((table, records))
}

impl Store for LogStore {
    fn name(&self) -> &'static str {
        "log"
    }

    fn put(&mut self, key: &[u8], value: &[u8]) -> Status {
        let status = self.append(RecordType::Put, key, value);
        if status.ok() {
            self.table.put(key, value);
            self.counters.puts += 1;
        }
        status
    }

    fn get(&mut self, key: &[u8], value: &mut Vec<u8>) -> Status {
        value.clear();
        if self.writer.is_none() {
            return self.unavailable();
        }
        self.counters.gets += 1;
        match self.table.get(key) {
            Some(found) => {
                value.extend_from_slice(found);
                self.counters.get_hits += 1;
                Status::Ok
            }
            None => Status::NotFound,
        }
    }

    fn merge(&mut self, key: &[u8], operand: &[u8]) -> Status {
        let status = self.append(RecordType::Merge, key, operand);
        if status.ok() {
            self.table.merge(key, operand);
            self.counters.merges += 1;
        }
        status
    }

    fn delete(&mut self, key: &[u8]) -> Status {
        let status = self.append(RecordType::Delete, key, &[]);
        if status.ok() {
            self.table.delete(key);
            self.counters.deletes += 1;
        }
        status
    }

    fn delete_range(&mut self, start: &[u8], end: &[u8]) -> Status {
        let status = self.append(RecordType::DeleteRange, start, end);
        if status.ok() {
            self.table.delete_range(start, end);
            self.counters.range_deletes += 1;
        }
        status
    }

    fn scan(&mut self, start: &[u8], end: &[u8]) -> (Status, u64) {
        if self.writer.is_none() {
            return (self.unavailable(), 0);
        }
        let count = self.table.scan(start, end);
        self.counters.scans += 1;
        self.counters.scanned_entries += count;
        (Status::Ok, count)
    }

    fn close(&mut self) -> Status {
        if self.poisoned.is_some() {
            return self.unavailable();
        }
        let Some(mut writer) = self.writer.take() else {
            return Status::error("store is already closed");
        };
        let result = writer.flush().and_then(|_| writer.get_ref().file.sync_all());
        match result {
            Ok(()) => Status::Ok,
            Err(e) => e.into(),
        }
    }

    fn statistics(&self) -> Option<String> {
        let c = &self.counters;
        let rows = [
            ("recovered.records", c.recovered_records),
            ("keys.written", c.puts),
            ("keys.merged", c.merges),
            ("keys.deleted", c.deletes),
            ("ranges.deleted", c.range_deletes),
            ("keys.read", c.gets),
            ("keys.read.hit", c.get_hits),
            ("scans", c.scans),
            ("scans.entries", c.scanned_entries),
            ("bytes.written", c.bytes_written),
            ("wal.synced", c.syncs),
            ("live.keys", self.table.len() as u64),
        ];

        let mut out = String::new();
        for (name, value) in rows {
            out.push_str(&format!("log.{} COUNT : {}\n", name, value));
        }
        Some(out)
    }
}
