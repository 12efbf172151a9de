//! Logging bootstrap: tracing subscriber and manager construction
//! Author: kartik4091
//! Created: 2025-06-05

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use super::{
    log_manager, ConsoleAppender, JsonAppender, LogLevel, LogManager, MemoryAppender,
};
use crate::config::{ConfigSection, LogConfig};
use crate::error::{Error, Result};

/// Installs a fmt subscriber. `RUST_LOG` wins over `level` when set.
pub fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| Error::validation(format!("Failed to install tracing subscriber: {}", e)))?;

    info!("Tracing initialized with level: {}", level);
    Ok(())
}

/// Registers the default console appender on the process-wide manager.
pub fn initialize() -> Arc<LogManager> {
    let manager = log_manager();
    manager.register_appender("console", Arc::new(ConsoleAppender::default()));
    manager
}

impl LogManager {
    /// Builds a manager with the levels and appenders described by `config`.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        config.validate()?;

        let manager = LogManager::new();
        manager.set_root_log_level(config.root_level);
        for (logger, level) in &config.levels {
            manager.set_log_level(logger.clone(), *level);
        }

        if config.console {
            manager.register_appender(
                "console",
                Arc::new(ConsoleAppender::new(config.console_threshold)),
            );
        }
        if let Some(path) = &config.json_file {
            manager.register_appender("json", Arc::new(JsonAppender::to_file(LogLevel::Trace, path)?));
        }
        if let Some(capacity) = config.memory_capacity {
            manager.register_appender("memory", Arc::new(MemoryAppender::new(LogLevel::Trace, capacity)));
        }

        Ok(manager)
    }
}
