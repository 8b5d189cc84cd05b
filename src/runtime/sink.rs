//! Log sinks for tracker messages

use std::sync::Mutex;

/// Tag every tracker message is logged under
pub const LOGGER_TAG: &str = "RecompositionTracker";

/// Destination for tracker messages
pub trait LogSink: Send + Sync {
    fn debug(&self, tag: &str, message: &str);
    fn error(&self, tag: &str, message: &str);
}

/// Forwards to the `log` facade with the tag as target
#[derive(Debug, Clone, Copy, Default)]
pub struct LogCrateSink;

impl LogSink for LogCrateSink {
    fn debug(&self, tag: &str, message: &str) {
        log::debug!(target: tag, "{}", message);
    }

    fn error(&self, tag: &str, message: &str) {
        log::error!(target: tag, "{}", message);
    }
}

/// Prints `tag: message` lines; errors go to stderr
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn debug(&self, tag: &str, message: &str) {
        println!("{}: {}", tag, message);
    }

    fn error(&self, tag: &str, message: &str) {
        eprintln!("{}: {}", tag, message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Error,
}

/// One recorded message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub level: LogLevel,
    pub tag: String,
    pub message: String,
}

/// Keeps every message in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<LogRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: LogLevel, tag: &str, message: &str) {
        let record = LogRecord {
            level,
            tag: tag.to_string(),
            message: message.to_string(),
        };
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Messages of the debug channel, in order
    pub fn messages(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|record| record.level == LogLevel::Debug)
            .map(|record| record.message)
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.records()
            .into_iter()
            .filter(|record| record.level == LogLevel::Error)
            .map(|record| record.message)
            .collect()
    }

    pub fn clear(&self) {
        match self.records.lock() {
            Ok(mut records) => records.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }
}

impl LogSink for MemorySink {
    fn debug(&self, tag: &str, message: &str) {
        self.push(LogLevel::Debug, tag, message);
    }

    fn error(&self, tag: &str, message: &str) {
        self.push(LogLevel::Error, tag, message);
    }
}
