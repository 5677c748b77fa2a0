//! Log pane — bounded ring of recent log records, fed by a `log` backend while the TUI owns the terminal.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

/// A timestamped log record.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: SystemTime,
    pub level: Level,
    pub message: String,
}

/// Circular buffer of recent log records.
#[derive(Debug, Clone)]
pub struct LogRing {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

/// Log ring shared between the logger and the UI thread.
pub type SharedLog = Arc<Mutex<LogRing>>;

impl LogRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a record, evicting the oldest if at capacity.
    pub fn push(&mut self, level: Level, message: String) {
        if self.capacity == 0 {
            return;
        }
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(LogEntry {
            timestamp: SystemTime::now(),
            level,
            message,
        });
    }

    /// The N most recent entries (newest last).
    pub fn recent(&self, n: usize) -> Vec<&LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new(200)
    }
}

/// `log` backend that appends to a [`SharedLog`] instead of writing to the terminal.
pub struct TuiLogger {
    ring: SharedLog,
    level: LevelFilter,
}

impl TuiLogger {
    pub fn new(ring: SharedLog, level: LevelFilter) -> Self {
        Self { ring, level }
    }

    /// Install as the global logger and return the ring it feeds.
    pub fn install(level: LevelFilter) -> Result<SharedLog, SetLoggerError> {
        let ring = SharedLog::default();
        log::set_boxed_logger(Box::new(Self::new(ring.clone(), level)))?;
        log::set_max_level(level);
        Ok(ring)
    }
}

impl Log for TuiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut ring) = self.ring.lock() {
            ring.push(record.level(), record.args().to_string());
        }
    }

    fn flush(&self) {}
}
