//! Fixed-capacity in-memory log buffer for the log viewer.
//!
//! Text is redacted before the write lock is taken, so nothing
//! unredacted is ever stored. Errors are projected to
//! [`RedactedThrowableInfo`] at the boundary; the error value and its source
//! chain are never retained.

use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

use futures::stream::{BoxStream, StreamExt};
use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::redactor::redact;

/// Log severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogPriority {
    Verbose,
    Debug,
    Info,
    Warn,
    Error,
    Assert,
}

impl LogPriority {
    /// Single-letter label used in exported lines.
    pub fn letter(self) -> char {
        match self {
            LogPriority::Verbose => 'V',
            LogPriority::Debug => 'D',
            LogPriority::Info => 'I',
            LogPriority::Warn => 'W',
            LogPriority::Error => 'E',
            LogPriority::Assert => 'A',
        }
    }
}

impl From<log::Level> for LogPriority {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => LogPriority::Error,
            log::Level::Warn => LogPriority::Warn,
            log::Level::Info => LogPriority::Info,
            log::Level::Debug => LogPriority::Debug,
            log::Level::Trace => LogPriority::Verbose,
        }
    }
}

/// Data-only projection of an error: short type name and redacted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedactedThrowableInfo {
    pub type_name: String,
    pub message: String,
}

impl RedactedThrowableInfo {
    pub fn new(type_name: impl Into<String>, message: &str) -> Self {
        Self {
            type_name: type_name.into(),
            message: redact(message),
        }
    }

    /// Capture `error`'s type and display text. Sources are not walked.
    pub fn from_error<E: Error + ?Sized>(error: &E) -> Self {
        Self::new(
            short_type_name(std::any::type_name::<E>()),
            &error.to_string(),
        )
    }
}

impl fmt::Display for RedactedThrowableInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)
    }
}

/// `alloc::vec::Vec<u8>` -> `Vec`, `my_crate::error::StoreError` -> `StoreError`
fn short_type_name(full: &str) -> &str {
    let without_generics = full.split('<').next().unwrap_or(full);
    without_generics
        .rsplit("::")
        .next()
        .unwrap_or(without_generics)
        .trim_start_matches("dyn ")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferedLogEntry {
    /// Unix epoch milliseconds
    pub timestamp_ms: i64,
    pub priority: LogPriority,
    pub tag: Option<String>,
    /// Already redacted
    pub message: String,
    pub throwable: Option<RedactedThrowableInfo>,
}

impl BufferedLogEntry {
    /// `2026-01-02 03:04:05.678 W/tag: message`, with the throwable on a
    /// second indented line.
    pub fn format_line(&self) -> String {
        let time = chrono::DateTime::from_timestamp_millis(self.timestamp_ms)
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
            .unwrap_or_else(|| self.timestamp_ms.to_string());
        let mut line = format!(
            "{time} {}/{}: {}",
            self.priority.letter(),
            self.tag.as_deref().unwrap_or("-"),
            self.message
        );
        if let Some(throwable) = &self.throwable {
            line.push_str("\n    ");
            line.push_str(&throwable.to_string());
        }
        line
    }
}

/// Thread-safe ring buffer of redacted log entries.
#[derive(Debug)]
pub struct LogBuffer {
    entries: RwLock<VecDeque<BufferedLogEntry>>,
    capacity: usize,
    version: watch::Sender<u64>,
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(500)
    }
}

impl LogBuffer {
    /// Capacity is clamped to at least one entry.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (version, _) = watch::channel(0);
        Self {
            entries: RwLock::new(VecDeque::with_capacity(capacity)),
            capacity,
            version,
        }
    }

    /// Redact and append, evicting the oldest entry when full.
    pub fn log<E: Error + ?Sized>(
        &self,
        priority: LogPriority,
        tag: Option<&str>,
        message: &str,
        error: Option<&E>,
    ) {
        let entry = BufferedLogEntry {
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            priority,
            tag: tag.map(str::to_string),
            message: redact(message),
            throwable: error.map(RedactedThrowableInfo::from_error),
        };
        self.push(entry);
    }

    /// [`LogBuffer::log`] without an attached error.
    pub fn log_message(
        &self,
        priority: LogPriority,
        tag: Option<&str>,
        message: &str,
    ) {
        self.log::<std::convert::Infallible>(priority, tag, message, None);
    }

    fn push(&self, entry: BufferedLogEntry) {
        {
            let mut entries = self.entries.write();
            if entries.len() >= self.capacity {
                entries.pop_front();
            }
            entries.push_back(entry);
        }
        self.bump_version();
    }

    fn bump_version(&self) {
        self.version.send_modify(|version| *version += 1);
    }

    /// Snapshot, oldest first.
    pub fn entries(&self) -> Vec<BufferedLogEntry> {
        self.entries.read().iter().cloned().collect()
    }

    pub fn entries_at_least(
        &self,
        priority: LogPriority,
    ) -> Vec<BufferedLogEntry> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.priority >= priority)
            .cloned()
            .collect()
    }

    pub fn entries_for_tag(&self, tag: &str) -> Vec<BufferedLogEntry> {
        self.entries
            .read()
            .iter()
            .filter(|entry| entry.tag.as_deref() == Some(tag))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.entries.write().clear();
        self.bump_version();
    }

    /// Receiver of the change counter; bumped after every append or clear.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    /// Current contents, then a fresh snapshot after each change. Bursts of
    /// appends may coalesce into one snapshot.
    pub fn stream(
        self: &Arc<Self>,
    ) -> BoxStream<'static, Vec<BufferedLogEntry>> {
        let buffer = Arc::clone(self);
        WatchStream::new(self.version.subscribe())
            .map(move |_| buffer.entries())
            .boxed()
    }

    /// Every entry formatted with [`BufferedLogEntry::format_line`], one per
    /// line, oldest first.
    pub fn export_text(&self) -> String {
        let entries = self.entries.read();
        let mut text = String::new();
        for entry in entries.iter() {
            text.push_str(&entry.format_line());
            text.push('\n');
        }
        text
    }
}
