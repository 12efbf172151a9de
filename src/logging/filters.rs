//! Event filter predicates

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;

use super::{LogEvent, LogLevel};

/// A predicate every event must satisfy to be dispatched
pub type LogFilter = Arc<dyn Fn(&LogEvent) -> bool + Send + Sync>;

/// Accepts events whose level is one of `levels`.
pub fn by_level(levels: impl IntoIterator<Item = LogLevel>) -> LogFilter {
    let allowed: HashSet<LogLevel> = levels.into_iter().collect();
    Arc::new(move |event| allowed.contains(&event.level()))
}

/// Accepts events from loggers named by, or nested under, any prefix.
///
/// Matching stops at dot boundaries: `com.acme` accepts `com.acme.db` but not
/// `com.acmes`, unlike a raw string-prefix test.
pub fn by_logger<S: Into<String>>(prefixes: impl IntoIterator<Item = S>) -> LogFilter {
    let prefixes: Vec<String> = prefixes.into_iter().map(Into::into).collect();
    Arc::new(move |event| {
        let name = event.logger_name();
        prefixes.iter().any(|p| {
            name == p || (name.starts_with(p.as_str()) && name[p.len()..].starts_with('.'))
        })
    })
}

pub fn contains_text(text: impl Into<String>) -> LogFilter {
    let text = text.into();
    Arc::new(move |event| event.message().contains(&text))
}

/// Accepts events carrying `name` with exactly `value`.
pub fn by_field(name: impl Into<String>, value: impl Into<Value>) -> LogFilter {
    let (name, value) = (name.into(), value.into());
    Arc::new(move |event| event.field(&name) == Some(&value))
}
