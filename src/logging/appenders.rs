//! Log event sinks
//! Author: kartik4091
//! Created: 2025-06-05

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use tracing::{debug, error, info, trace, warn};

use super::{LogEvent, LogLevel};
use crate::error::Result;

/// A destination for log events. Each appender applies its own threshold.
pub trait Appender: Send + Sync {
    fn is_enabled(&self, level: LogLevel) -> bool;

    fn append(&self, event: &LogEvent) -> Result<()>;

    /// Events kept by appenders that retain them, oldest first.
    fn retained(&self) -> Option<Vec<LogEvent>> {
        None
    }
}

/// Renders `<ts> [LEVEL] logger: message - k=v, ...` with an optional cause suffix.
pub fn format_line(event: &LogEvent) -> String {
    let mut line = format!(
        "{} [{}] {}: {}",
        event.timestamp().format("%Y-%m-%d %H:%M:%S%.3f"),
        event.level(),
        event.logger_name(),
        event.message()
    );

    if !event.fields().is_empty() {
        let fields: Vec<String> = event
            .fields()
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => format!("{}={}", k, s),
                other => format!("{}={}", k, other),
            })
            .collect();
        line.push_str(" - ");
        line.push_str(&fields.join(", "));
    }

    if let Some(cause) = event.cause() {
        line.push_str(&format!(" | cause: {}", cause));
    }

    line
}

/// Renders the event as a single-line JSON object.
pub fn format_json(event: &LogEvent) -> Value {
    let mut obj = Map::new();
    obj.insert("timestamp".into(), Value::from(event.timestamp().to_rfc3339()));
    obj.insert("level".into(), Value::from(event.level().as_str()));
    obj.insert("logger".into(), Value::from(event.logger_name()));
    obj.insert("message".into(), Value::from(event.message()));

    if !event.fields().is_empty() {
        let fields: Map<String, Value> = event
            .fields()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        obj.insert("fields".into(), Value::Object(fields));
    }

    if let Some(cause) = event.cause() {
        obj.insert(
            "error".into(),
            json!({
                "type": event.cause_type().unwrap_or("error"),
                "message": cause.to_string(),
            }),
        );
    }

    Value::Object(obj)
}

/// Writes formatted lines to stdout
pub struct ConsoleAppender {
    threshold: LogLevel,
}

impl ConsoleAppender {
    pub fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Appender for ConsoleAppender {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level.passes(self.threshold)
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{}", format_line(event))?;
        Ok(())
    }
}

/// Writes one JSON object per line to any writer
pub struct JsonAppender {
    threshold: LogLevel,
    writer: Mutex<Box<dyn Write + Send>>,
}

impl JsonAppender {
    pub fn new(threshold: LogLevel, writer: Box<dyn Write + Send>) -> Self {
        Self {
            threshold,
            writer: Mutex::new(writer),
        }
    }

    pub fn stdout(threshold: LogLevel) -> Self {
        Self::new(threshold, Box::new(io::stdout()))
    }

    pub fn to_file(threshold: LogLevel, path: impl AsRef<Path>) -> Result<Self> {
        let file = open_for_append(path.as_ref())?;
        Ok(Self::new(threshold, Box::new(file)))
    }
}

impl Appender for JsonAppender {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level.passes(self.threshold)
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let line = serde_json::to_string(&format_json(event))?;
        let mut writer = self.writer.lock();
        writeln!(writer, "{}", line)?;
        writer.flush()?;
        Ok(())
    }
}

/// Appends formatted text lines to a file
pub struct FileAppender {
    threshold: LogLevel,
    path: PathBuf,
    file: Mutex<File>,
}

impl FileAppender {
    pub fn new(threshold: LogLevel, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = open_for_append(&path)?;
        Ok(Self {
            threshold,
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Appender for FileAppender {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level.passes(self.threshold)
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let mut file = self.file.lock();
        writeln!(file, "{}", format_line(event))?;
        Ok(())
    }
}

fn open_for_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Bounded ring buffer of recent events
pub struct MemoryAppender {
    threshold: LogLevel,
    capacity: usize,
    events: Mutex<VecDeque<LogEvent>>,
}

impl MemoryAppender {
    /// Capacity is at least one event.
    pub fn new(threshold: LogLevel, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            threshold,
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().iter().cloned().collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .map(|e| e.message().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Appender for MemoryAppender {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level.passes(self.threshold)
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
        Ok(())
    }

    fn retained(&self) -> Option<Vec<LogEvent>> {
        Some(self.events())
    }
}

/// Forwards events into the installed `tracing` subscriber
pub struct TracingAppender {
    threshold: LogLevel,
}

impl TracingAppender {
    pub fn new(threshold: LogLevel) -> Self {
        Self { threshold }
    }
}

impl Default for TracingAppender {
    fn default() -> Self {
        Self::new(LogLevel::Trace)
    }
}

impl Appender for TracingAppender {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level.passes(self.threshold)
    }

    fn append(&self, event: &LogEvent) -> Result<()> {
        let logger = event.logger_name();
        let message = event.message();
        let fields = if event.fields().is_empty() {
            String::new()
        } else {
            serde_json::to_string(event.fields())?
        };
        let cause = event.cause().map(|c| c.to_string()).unwrap_or_default();

        match event.level() {
            LogLevel::Trace => trace!(logger = %logger, fields = %fields, cause = %cause, "{}", message),
            LogLevel::Debug => debug!(logger = %logger, fields = %fields, cause = %cause, "{}", message),
            LogLevel::Info => info!(logger = %logger, fields = %fields, cause = %cause, "{}", message),
            LogLevel::Warn => warn!(logger = %logger, fields = %fields, cause = %cause, "{}", message),
            LogLevel::Error | LogLevel::Fatal => error!(logger = %logger, fields = %fields, cause = %cause, "{}", message),
        }

        Ok(())
    }
}
