//! Structured logging: named loggers, level table, filters and appenders
//! Author: kartik4091
//! Created: 2025-06-05

pub mod appenders;
pub mod context;
pub mod event;
pub mod filters;
pub mod level;
pub mod logger;
pub mod manager;
pub mod performance;
pub mod setup;

pub use appenders::{
    Appender, ConsoleAppender, FileAppender, JsonAppender, MemoryAppender, TracingAppender,
};
pub use context::{with_field, with_fields, ContextGuard, Mdc};
pub use event::{Fields, LogCause, LogEvent, LogEventBuilder};
pub use filters::LogFilter;
pub use level::LogLevel;
pub use logger::{Logger, StructuredLogger};
pub use manager::{get_logger, get_logger_for, log_manager, LogManager};
pub use performance::PerformanceTracker;
pub use setup::{init_tracing, initialize};
