//! Append-only audit records, one `timestamp,command,args` line each.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{Local, NaiveDateTime};
use log::debug;

use crate::error::LogError;

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub trait Clock: Send + Sync {
    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn now(&self) -> NaiveDateTime { Local::now().naive_local() }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub command: String,
    pub arguments: String,
}

impl LogRecord {
    pub fn new(timestamp: NaiveDateTime, command: &str, args: &[String]) -> Self {
        LogRecord { timestamp, command: command.to_string(), arguments: args.join(" ") }
    }
}

// Commas inside arguments are written as-is; the format has no escaping.
impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.timestamp.format(TIMESTAMP_FORMAT), self.command, self.arguments)
    }
}

pub trait ActionLog: Send + Sync {
    fn append(&self, record: &LogRecord) -> Result<(), LogError>;
}

/// Appends records to a text file, creating it on first use.
#[derive(Debug)]
pub struct FileActionLog {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileActionLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        FileActionLog { path: path.as_ref().to_path_buf(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }
}

impl ActionLog for FileActionLog {
    fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        // one writer at a time so concurrent sessions never interleave partial lines
        let _guard = self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let io = |source: std::io::Error| LogError::Io { path: self.path.clone(), source };
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path).map_err(io)?;
        let line = format!("{record}\n");
        file.write_all(line.as_bytes()).map_err(io)?;
        file.flush().map_err(io)?;
        debug!("action log {}: {}", self.path.display(), record);
        Ok(())
    }
}

/// Keeps records in memory; for embedding and tests.
#[derive(Debug, Default)]
pub struct MemoryActionLog {
    records: Mutex<Vec<LogRecord>>,
}

impl MemoryActionLog {
    pub fn new() -> Self { Self::default() }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }
}

impl ActionLog for MemoryActionLog {
    fn append(&self, record: &LogRecord) -> Result<(), LogError> {
        self.records.lock().unwrap_or_else(|poisoned| poisoned.into_inner()).push(record.clone());
        Ok(())
    }
}
