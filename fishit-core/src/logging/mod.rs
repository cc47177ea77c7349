//! In-app diagnostics: a bounded, redacting log buffer and the `log` facade
//! bridge that feeds it.

pub mod buffer;
pub mod logger;
pub mod redactor;

pub use buffer::{
    BufferedLogEntry, LogBuffer, LogPriority, RedactedThrowableInfo,
};
pub use logger::LogBufferLogger;
pub use redactor::{REDACTED, redact};
