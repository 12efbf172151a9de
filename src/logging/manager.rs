//! Level table, filter chain and appender registry
//! Author: kartik4091
//! Created: 2025-06-05

use std::any::type_name;
use std::sync::Arc;

use dashmap::DashMap;
use indexmap::IndexMap;
use lazy_static::lazy_static;
use parking_lot::RwLock;

use super::{Appender, LogEvent, LogFilter, LogLevel, Logger};

lazy_static! {
    static ref GLOBAL_MANAGER: Arc<LogManager> = Arc::new(LogManager::new());
}

/// Process-wide manager used by the static accessors.
pub fn log_manager() -> Arc<LogManager> {
    Arc::clone(&GLOBAL_MANAGER)
}

/// Logger bound to the process-wide manager.
pub fn get_logger(name: impl Into<String>) -> Logger {
    log_manager().logger(name)
}

/// Logger named after `T`, with `::` replaced by `.`.
pub fn get_logger_for<T: ?Sized>() -> Logger {
    get_logger(type_name::<T>().replace("::", "."))
}

/// Routes events from named loggers to registered appenders
pub struct LogManager {
    levels: DashMap<String, LogLevel>,
    root_level: RwLock<LogLevel>,
    appenders: RwLock<IndexMap<String, Arc<dyn Appender>>>,
    filters: RwLock<IndexMap<String, LogFilter>>,
}

impl LogManager {
    pub fn new() -> Self {
        Self {
            levels: DashMap::new(),
            root_level: RwLock::new(LogLevel::Info),
            appenders: RwLock::new(IndexMap::new()),
            filters: RwLock::new(IndexMap::new()),
        }
    }

    pub fn logger(self: &Arc<Self>, name: impl Into<String>) -> Logger {
        Logger::new(name, Arc::clone(self))
    }

    /// Registers an appender. An existing name is replaced in place.
    pub fn register_appender(&self, name: impl Into<String>, appender: Arc<dyn Appender>) {
        self.appenders.write().insert(name.into(), appender);
    }

    pub fn remove_appender(&self, name: &str) -> bool {
        self.appenders.write().shift_remove(name).is_some()
    }

    pub fn appender(&self, name: &str) -> Option<Arc<dyn Appender>> {
        self.appenders.read().get(name).cloned()
    }

    pub fn appender_names(&self) -> Vec<String> {
        self.appenders.read().keys().cloned().collect()
    }

    /// Events retained by the named appender, if it keeps any.
    pub fn retained_events(&self, name: &str) -> Option<Vec<LogEvent>> {
        self.appender(name).and_then(|a| a.retained())
    }

    pub fn set_log_level(&self, logger: impl Into<String>, level: LogLevel) {
        self.levels.insert(logger.into(), level);
    }

    pub fn clear_log_level(&self, logger: &str) -> Option<LogLevel> {
        self.levels.remove(logger).map(|(_, level)| level)
    }

    pub fn set_root_log_level(&self, level: LogLevel) {
        *self.root_level.write() = level;
    }

    pub fn root_log_level(&self) -> LogLevel {
        *self.root_level.read()
    }

    /// Exact name first, then each parent segment, then the root level.
    pub fn effective_level(&self, logger: &str) -> LogLevel {
        let mut name = logger;
        loop {
            if let Some(level) = self.levels.get(name) {
                return *level;
            }
            match name.rfind('.') {
                Some(idx) => name = &name[..idx],
                None => return self.root_log_level(),
            }
        }
    }

    pub fn is_enabled(&self, logger: &str, level: LogLevel) -> bool {
        level.passes(self.effective_level(logger))
    }

    pub fn add_filter(&self, name: impl Into<String>, filter: LogFilter) {
        self.filters.write().insert(name.into(), filter);
    }

    pub fn remove_filter(&self, name: &str) -> bool {
        self.filters.write().shift_remove(name).is_some()
    }

    /// Dispatches `event` and returns how many appenders received it.
    ///
    /// Appender failures are reported on stderr and never reach the caller.
    pub fn log(&self, event: LogEvent) -> usize {
        if !self.is_enabled(event.logger_name(), event.level()) {
            return 0;
        }

        let filters: Vec<LogFilter> = self.filters.read().values().cloned().collect();
        if !filters.iter().all(|accept| accept(&event)) {
            return 0;
        }

        // snapshot so appenders never run under the registry lock
        let appenders: Vec<(String, Arc<dyn Appender>)> = self
            .appenders
            .read()
            .iter()
            .map(|(name, appender)| (name.clone(), Arc::clone(appender)))
            .collect();

        let mut reached = 0;
        for (name, appender) in appenders {
            if !appender.is_enabled(event.level()) {
                continue;
            }
            reached += 1;
            if let Err(e) = appender.append(&event) {
                eprintln!("Appender '{}' failed: {}", name, e);
            }
        }
        reached
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::logging::{filters, MemoryAppender};

    struct FailingAppender;

    impl Appender for FailingAppender {
        fn is_enabled(&self, _level: LogLevel) -> bool {
            true
        }

        fn append(&self, _event: &LogEvent) -> crate::error::Result<()> {
            Err(Error::validation("sink unavailable"))
        }
    }

    fn event(logger: &str, level: LogLevel) -> LogEvent {
        LogEvent::builder().logger(logger).level(level).message("m").build()
    }

    #[test]
    fn test_effective_level_walks_parents() {
        let manager = LogManager::new();
        manager.set_log_level("com.acme", LogLevel::Debug);
        manager.set_log_level("com.acme.db.pool", LogLevel::Error);

        assert_eq!(manager.effective_level("com.acme"), LogLevel::Debug);
        assert_eq!(manager.effective_level("com.acme.web.handler"), LogLevel::Debug);
        assert_eq!(manager.effective_level("com.acme.db.pool"), LogLevel::Error);
        assert_eq!(manager.effective_level("org.other"), LogLevel::Info);

        manager.set_root_log_level(LogLevel::Warn);
        assert_eq!(manager.effective_level("org.other"), LogLevel::Warn);
        assert_eq!(manager.clear_log_level("com.acme"), Some(LogLevel::Debug));
        assert_eq!(manager.effective_level("com.acme.web"), LogLevel::Warn);
    }

    #[test]
    fn test_dispatch_respects_root_and_appender_thresholds() {
        let manager = LogManager::new();
        let all = Arc::new(MemoryAppender::new(LogLevel::Trace, 10));
        let errors = Arc::new(MemoryAppender::new(LogLevel::Error, 10));
        let fatal_only = Arc::new(MemoryAppender::new(LogLevel::Fatal, 10));
        manager.register_appender("all", all.clone());
        manager.register_appender("errors", errors.clone());
        manager.register_appender("fatal", fatal_only.clone());

        assert_eq!(manager.log(event("app", LogLevel::Trace)), 0);
        assert_eq!(manager.log(event("app", LogLevel::Error)), 2);
        assert_eq!(all.len(), 1);
        assert_eq!(errors.len(), 1);
        assert!(fatal_only.is_empty());
    }

    #[test]
    fn test_filters_are_fail_closed() {
        let manager = LogManager::new();
        let sink = Arc::new(MemoryAppender::new(LogLevel::Trace, 10));
        manager.register_appender("mem", sink.clone());
        manager.add_filter("only-warn", filters::by_level([LogLevel::Warn]));
        manager.add_filter("only-db", filters::by_logger(["app.db"]));

        assert_eq!(manager.log(event("app.db", LogLevel::Info)), 0);
        assert_eq!(manager.log(event("app.web", LogLevel::Warn)), 0);
        assert_eq!(manager.log(event("app.db.pool", LogLevel::Warn)), 1);

        assert!(manager.remove_filter("only-warn"));
        assert!(!manager.remove_filter("only-warn"));
        assert_eq!(manager.log(event("app.db", LogLevel::Info)), 1);
    }

    #[test]
    fn test_replacing_appender_keeps_position() {
        let manager = LogManager::new();
        manager.register_appender("a", Arc::new(MemoryAppender::new(LogLevel::Trace, 1)));
        manager.register_appender("b", Arc::new(MemoryAppender::new(LogLevel::Trace, 1)));
        manager.register_appender("a", Arc::new(MemoryAppender::new(LogLevel::Error, 1)));
        assert_eq!(manager.appender_names(), vec!["a", "b"]);

        assert!(manager.remove_appender("a"));
        assert_eq!(manager.appender_names(), vec!["b"]);
    }

    #[test]
    fn test_failing_appender_does_not_stop_dispatch() {
        let manager = LogManager::new();
        let sink = Arc::new(MemoryAppender::new(LogLevel::Trace, 10));
        manager.register_appender("broken", Arc::new(FailingAppender));
        manager.register_appender("mem", sink.clone());

        assert_eq!(manager.log(event("app", LogLevel::Info)), 2);
        assert_eq!(sink.len(), 1);
        assert_eq!(manager.retained_events("mem").map(|e| e.len()), Some(1));
        assert!(manager.retained_events("broken").is_none());
    }

    #[test]
    fn test_logger_for_type_name() {
        let logger = get_logger_for::<LogManager>();
        assert_eq!(logger.name(), "utilkit.logging.manager.LogManager");
    }
}
