//! Log event record and its builder

use std::collections::BTreeMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::LogLevel;

/// Error attached to a log event
pub type LogCause = Arc<dyn StdError + Send + Sync>;

/// Ordered field map carried by each event
pub type Fields = BTreeMap<String, Value>;

/// A single immutable log record
#[derive(Clone)]
pub struct LogEvent {
    message: String,
    level: LogLevel,
    logger_name: String,
    timestamp: DateTime<Utc>,
    fields: Fields,
    cause: Option<LogCause>,
    cause_type: Option<&'static str>,
}

impl LogEvent {
    pub fn builder() -> LogEventBuilder {
        LogEventBuilder::default()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn cause(&self) -> Option<&(dyn StdError + Send + Sync)> {
        self.cause.as_deref()
    }

    /// Type name of the attached error, when it was captured from a concrete type.
    pub fn cause_type(&self) -> Option<&'static str> {
        self.cause_type
    }
}

impl fmt::Debug for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogEvent")
            .field("level", &self.level)
            .field("logger", &self.logger_name)
            .field("message", &self.message)
            .field("timestamp", &self.timestamp)
            .field("fields", &self.fields)
            .field("cause", &self.cause.as_ref().map(|c| c.to_string()))
            .finish()
    }
}

/// Builder for creating log events
#[derive(Default)]
pub struct LogEventBuilder {
    message: String,
    level: Option<LogLevel>,
    logger_name: String,
    fields: Fields,
    cause: Option<LogCause>,
    cause_type: Option<&'static str>,
}

impl LogEventBuilder {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn level(mut self, level: LogLevel) -> Self {
        self.level = Some(level);
        self
    }

    pub fn logger(mut self, name: impl Into<String>) -> Self {
        self.logger_name = name.into();
        self
    }

    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn fields<'a>(mut self, fields: impl IntoIterator<Item = (&'a String, &'a Value)>) -> Self {
        for (key, value) in fields {
            self.fields.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn cause(mut self, cause: LogCause) -> Self {
        self.cause = Some(cause);
        self
    }

    /// Attaches a concrete error and remembers its type name.
    pub fn error<E>(mut self, err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.cause_type = Some(std::any::type_name::<E>());
        self.cause = Some(Arc::new(err));
        self
    }

    /// Stamps the event with the current time. Level defaults to INFO.
    pub fn build(self) -> LogEvent {
        LogEvent {
            message: self.message,
            level: self.level.unwrap_or(LogLevel::Info),
            logger_name: self.logger_name,
            timestamp: Utc::now(),
            fields: self.fields,
            cause: self.cause,
            cause_type: self.cause_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_builder_copies_fields() {
        let mut source = Fields::new();
        source.insert("user".into(), Value::from("ada"));

        let event = LogEvent::builder()
            .message("login")
            .level(LogLevel::Warn)
            .logger("app.auth")
            .fields(&source)
            .field("attempt", 3)
            .build();

        source.insert("user".into(), Value::from("mallory"));

        assert_eq!(event.message(), "login");
        assert_eq!(event.level(), LogLevel::Warn);
        assert_eq!(event.logger_name(), "app.auth");
        assert_eq!(event.field("user"), Some(&Value::from("ada")));
        assert_eq!(event.field("attempt"), Some(&Value::from(3)));
    }

    #[test]
    fn test_cause_is_preserved() {
        let cause: LogCause = Arc::new(io::Error::new(io::ErrorKind::Other, "disk gone"));
        let event = LogEvent::builder().message("write failed").cause(cause).build();
        assert_eq!(event.cause().map(|c| c.to_string()).as_deref(), Some("disk gone"));
        assert_eq!(event.level(), LogLevel::Info);
        assert_eq!(event.cause_type(), None);
    }

    #[test]
    fn test_error_records_type_name() {
        let event = LogEvent::builder()
            .error(io::Error::new(io::ErrorKind::NotFound, "missing"))
            .build();
        assert!(event.cause_type().is_some_and(|t| t.starts_with("std::io")));
    }
}
