//! `log` facade bridge feeding the [`LogBuffer`].

use std::fmt;
use std::sync::Arc;

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

use super::buffer::{LogBuffer, LogPriority};

/// Global logger that copies records into a [`LogBuffer`] and forwards them
/// to an optional console logger.
pub struct LogBufferLogger {
    buffer: Arc<LogBuffer>,
    level: LevelFilter,
    inner: Option<(Box<dyn Log>, LevelFilter)>,
}

impl fmt::Debug for LogBufferLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogBufferLogger")
            .field("level", &self.level)
            .field("buffered", &self.buffer.len())
            .field("inner_level", &self.inner.as_ref().map(|(_, l)| *l))
            .finish()
    }
}

impl LogBufferLogger {
    pub fn new(buffer: Arc<LogBuffer>, level: LevelFilter) -> Self {
        Self {
            buffer,
            level,
            inner: None,
        }
    }

    /// Also forward every record `inner` accepts. `inner_level` is the most
    /// verbose level `inner` may enable.
    pub fn with_inner(
        mut self,
        inner: Box<dyn Log>,
        inner_level: LevelFilter,
    ) -> Self {
        self.inner = Some((inner, inner_level));
        self
    }

    pub fn buffer(&self) -> &Arc<LogBuffer> {
        &self.buffer
    }

    /// Most verbose level either sink wants.
    pub fn max_level(&self) -> LevelFilter {
        let inner = self.inner.as_ref().map(|(_, level)| *level);
        self.level.max(inner.unwrap_or(LevelFilter::Off))
    }

    /// Register as the global logger.
    pub fn install(self) -> Result<(), SetLoggerError> {
        let max_level = self.max_level();
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl Log for LogBufferLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
            || self
                .inner
                .as_ref()
                .is_some_and(|(inner, _)| inner.enabled(metadata))
    }

    fn log(&self, record: &Record<'_>) {
        if record.level() <= self.level {
            self.buffer.log_message(
                LogPriority::from(record.level()),
                Some(record.target()),
                &record.args().to_string(),
            );
        }
        if let Some((inner, _)) = &self.inner
            && inner.enabled(record.metadata())
        {
            inner.log(record);
        }
    }

    fn flush(&self) {
        if let Some((inner, _)) = &self.inner {
            inner.flush();
        }
    }
}
