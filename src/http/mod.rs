//! HTTP client wrappers
//! Author: kartik4091
//! Created: 2025-06-04
//!
//! `HttpClient` is future-based, `BlockingHttpClient` is synchronous. Both
//! share request preparation and take their timeouts from `HttpConfig`.

use std::collections::HashMap;

pub mod blocking;
pub mod client;
mod request;

pub use blocking::BlockingHttpClient;
pub use client::HttpClient;

/// Request headers by name
pub type Headers = HashMap<String, String>;
