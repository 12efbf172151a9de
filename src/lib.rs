//! General-purpose helper library
//! Provides string, date/time, file, JSON, HTTP, JWT, network and
//! collection helpers plus a small structured-logging router.

// Shared infrastructure
pub mod config;
pub mod error;
pub mod patterns;

// Text, time and data helpers
pub mod collections;
pub mod dates;
pub mod json;
pub mod strings;

// Filesystem
pub mod files;

// Network facing helpers
pub mod http;
pub mod jwt;
pub mod network;

// Structured logging
pub mod logging;

// Re-exports for crate consumers
pub use config::{ConfigSection, HttpConfig, JwtConfig, LogConfig, NetworkConfig, ToolkitConfig};
pub use error::{Error, ErrorKind, Result};
pub use http::{BlockingHttpClient, Headers, HttpClient};
pub use jwt::{Algorithm, Claims, TokenService, TokenValidationResult};
pub use logging::{get_logger, get_logger_for, LogLevel, LogManager, Logger, PerformanceTracker};
pub use network::{NetworkInterfaceInfo, NetworkTools, UrlComponents};
