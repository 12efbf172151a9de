//! Named logger handle
//! Author: kartik4091
//! Created: 2025-06-05

use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use super::context::{self, ContextGuard, Mdc};
use super::event::Fields;
use super::{LogCause, LogEvent, LogLevel, LogManager, PerformanceTracker};

/// Cheap, cloneable handle that stamps events with its name
#[derive(Clone)]
pub struct Logger {
    name: String,
    manager: Arc<LogManager>,
}

impl Logger {
    pub fn new(name: impl Into<String>, manager: Arc<LogManager>) -> Self {
        Self {
            name: name.into(),
            manager,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn manager(&self) -> &Arc<LogManager> {
        &self.manager
    }

    pub fn is_enabled(&self, level: LogLevel) -> bool {
        self.manager.is_enabled(&self.name, level)
    }

    /// Builds an event carrying the thread's context and dispatches it.
    pub fn log(&self, level: LogLevel, message: impl Into<String>, cause: Option<LogCause>) -> usize {
        if !self.is_enabled(level) {
            return 0;
        }
        let mut builder = LogEvent::builder()
            .level(level)
            .logger(self.name.as_str())
            .message(message)
            .fields(&Mdc::snapshot());
        if let Some(cause) = cause {
            builder = builder.cause(cause);
        }
        self.manager.log(builder.build())
    }

    fn log_error<E>(&self, level: LogLevel, message: impl Into<String>, err: E) -> usize
    where
        E: StdError + Send + Sync + 'static,
    {
        if !self.is_enabled(level) {
            return 0;
        }
        let event = LogEvent::builder()
            .level(level)
            .logger(self.name.as_str())
            .message(message)
            .fields(&Mdc::snapshot())
            .error(err)
            .build();
        self.manager.log(event)
    }

    pub fn trace(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Trace, message, None)
    }

    pub fn debug(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Debug, message, None)
    }

    pub fn info(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Info, message, None)
    }

    pub fn warn(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Warn, message, None)
    }

    pub fn error(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Error, message, None)
    }

    pub fn fatal(&self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Fatal, message, None)
    }

    pub fn error_with<E>(&self, message: impl Into<String>, err: E) -> usize
    where
        E: StdError + Send + Sync + 'static,
    {
        self.log_error(LogLevel::Error, message, err)
    }

    pub fn fatal_with<E>(&self, message: impl Into<String>, err: E) -> usize
    where
        E: StdError + Send + Sync + 'static,
    {
        self.log_error(LogLevel::Fatal, message, err)
    }

    pub fn with_field<R>(&self, key: impl Into<String>, value: impl Into<Value>, f: impl FnOnce() -> R) -> R {
        context::with_field(key, value, f)
    }

    pub fn with_fields<I, K, V, R>(&self, fields: I, f: impl FnOnce() -> R) -> R
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        context::with_fields(fields, f)
    }

    pub fn structured(&self) -> StructuredLogger<'_> {
        StructuredLogger {
            logger: self,
            fields: Fields::new(),
        }
    }

    /// Runs `f` and logs its duration at INFO, also when `f` unwinds.
    pub fn timed<R>(&self, operation: &str, f: impl FnOnce() -> R) -> R {
        let _timer = Timer {
            logger: self,
            operation,
            start: Instant::now(),
        };
        f()
    }

    pub fn track_performance(&self, operation: impl Into<String>) -> PerformanceTracker {
        PerformanceTracker::new(self.clone(), operation)
    }
}

struct Timer<'a> {
    logger: &'a Logger,
    operation: &'a str,
    start: Instant,
}

impl Drop for Timer<'_> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed().as_millis();
        self.logger.info(format!(
            "Operation '{}' completed in {} ms",
            self.operation, elapsed
        ));
    }
}

/// One-shot field builder; fields overlay the context for a single call
pub struct StructuredLogger<'a> {
    logger: &'a Logger,
    fields: Fields,
}

impl StructuredLogger<'_> {
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn log(self, level: LogLevel, message: impl Into<String>) -> usize {
        let _guard = ContextGuard::overlay(self.fields);
        self.logger.log(level, message, None)
    }

    pub fn trace(self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Error, message)
    }

    pub fn fatal(self, message: impl Into<String>) -> usize {
        self.log(LogLevel::Fatal, message)
    }
}
