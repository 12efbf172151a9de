pub mod files_integration;
pub mod http_integration;
pub mod logging_integration;
