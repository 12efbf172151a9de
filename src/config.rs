//! Configuration types and validation for the helper modules
//! Author: kartik4091
//! Created: 2025-06-03

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::logging::LogLevel;

/// Common behaviour for every configuration section
pub trait ConfigSection: Send + Sync {
    fn validate(&self) -> Result<()>;
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String) -> Result<()>;
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
    pub download_timeout_ms: u64,
    pub follow_redirects: bool,
    pub default_content_type: String,
    pub user_agent: Option<String>,
}

/// Network diagnostic settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
    pub public_ip_endpoint: String,
    pub connectivity_hosts: Vec<String>,
    pub connectivity_timeout_ms: u64,
}

/// Token lifetimes and refresh policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JwtConfig {
    pub access_token_lifetime_secs: i64,
    pub refresh_token_lifetime_secs: i64,
    pub refresh_grace_period_secs: i64,
    pub token_prefix: String,
}

/// Log router setup
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub root_level: LogLevel,
    pub levels: HashMap<String, LogLevel>,
    pub console: bool,
    pub console_threshold: LogLevel,
    pub json_file: Option<PathBuf>,
    pub memory_capacity: Option<usize>,
}

/// Aggregate configuration, loadable from JSON or YAML
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolkitConfig {
    pub http: HttpConfig,
    pub network: NetworkConfig,
    pub jwt: JwtConfig,
    pub logging: LogConfig,
}

// Defaults
impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            download_timeout_ms: 120_000,
            follow_redirects: true,
            default_content_type: "application/json".into(),
            user_agent: None,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: 5_000,
            read_timeout_ms: 10_000,
            public_ip_endpoint: "https://api.ipify.org".into(),
            connectivity_hosts: vec!["google.com".into(), "cloudflare.com".into(), "amazon.com".into()],
            connectivity_timeout_ms: 3_000,
        }
    }
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_token_lifetime_secs: 60 * 60,
            refresh_token_lifetime_secs: 7 * 24 * 60 * 60,
            refresh_grace_period_secs: 24 * 60 * 60,
            token_prefix: "Bearer ".into(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            root_level: LogLevel::Info,
            levels: HashMap::new(),
            console: true,
            console_threshold: LogLevel::Info,
            json_file: None,
            memory_capacity: None,
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_millis(self.download_timeout_ms)
    }
}

impl NetworkConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl ToolkitConfig {
    /// Loads a config file, trying JSON first and then YAML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ToolkitConfig = match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(json_err) => {
                debug!("Config is not JSON ({}), trying YAML", json_err);
                serde_yaml::from_str(&content)?
            }
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.http.validate()?;
        self.network.validate()?;
        self.jwt.validate()?;
        self.logging.validate()
    }
}

fn parse_value<T: std::str::FromStr>(value: &str, what: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| Error::validation(format!("Invalid {}: {}", what, value)))
}

impl ConfigSection for HttpConfig {
    fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::validation("HTTP timeout must be greater than 0"));
        }
        if self.download_timeout_ms == 0 {
            return Err(Error::validation("Download timeout must be greater than 0"));
        }
        if self.default_content_type.trim().is_empty() {
            return Err(Error::validation("Default content type cannot be empty"));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        match key {
            "timeout_ms" => Some(self.timeout_ms.to_string()),
            "download_timeout_ms" => Some(self.download_timeout_ms.to_string()),
            "follow_redirects" => Some(self.follow_redirects.to_string()),
            "default_content_type" => Some(self.default_content_type.clone()),
            "user_agent" => self.user_agent.clone(),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "timeout_ms" => self.timeout_ms = parse_value(&value, "u64")?,
            "download_timeout_ms" => self.download_timeout_ms = parse_value(&value, "u64")?,
            "follow_redirects" => self.follow_redirects = parse_value(&value, "bool")?,
            "default_content_type" => self.default_content_type = value,
            "user_agent" => self.user_agent = Some(value),
            _ => return Err(Error::validation(format!("Unknown key: {}", key))),
        }
        Ok(())
    }
}

impl ConfigSection for NetworkConfig {
    fn validate(&self) -> Result<()> {
        if self.connect_timeout_ms == 0 || self.read_timeout_ms == 0 {
            return Err(Error::validation("Network timeouts must be greater than 0"));
        }
        if url::Url::parse(&self.public_ip_endpoint).is_err() {
            return Err(Error::validation(format!(
                "Invalid public IP endpoint: {}",
                self.public_ip_endpoint
            )));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        match key {
            "connect_timeout_ms" => Some(self.connect_timeout_ms.to_string()),
            "read_timeout_ms" => Some(self.read_timeout_ms.to_string()),
            "public_ip_endpoint" => Some(self.public_ip_endpoint.clone()),
            "connectivity_hosts" => Some(self.connectivity_hosts.join(",")),
            "connectivity_timeout_ms" => Some(self.connectivity_timeout_ms.to_string()),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "connect_timeout_ms" => self.connect_timeout_ms = parse_value(&value, "u64")?,
            "read_timeout_ms" => self.read_timeout_ms = parse_value(&value, "u64")?,
            "public_ip_endpoint" => self.public_ip_endpoint = value,
            "connectivity_hosts" => {
                self.connectivity_hosts = value
                    .split(',')
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .map(String::from)
                    .collect()
            }
            "connectivity_timeout_ms" => self.connectivity_timeout_ms = parse_value(&value, "u64")?,
            _ => return Err(Error::validation(format!("Unknown key: {}", key))),
        }
        Ok(())
    }
}

impl ConfigSection for JwtConfig {
    fn validate(&self) -> Result<()> {
        if self.access_token_lifetime_secs <= 0 || self.refresh_token_lifetime_secs <= 0 {
            return Err(Error::validation("Token lifetimes must be positive"));
        }
        if self.refresh_grace_period_secs < 0 {
            return Err(Error::validation("Refresh grace period cannot be negative"));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        match key {
            "access_token_lifetime_secs" => Some(self.access_token_lifetime_secs.to_string()),
            "refresh_token_lifetime_secs" => Some(self.refresh_token_lifetime_secs.to_string()),
            "refresh_grace_period_secs" => Some(self.refresh_grace_period_secs.to_string()),
            "token_prefix" => Some(self.token_prefix.clone()),
            _ => None,
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "access_token_lifetime_secs" => self.access_token_lifetime_secs = parse_value(&value, "i64")?,
            "refresh_token_lifetime_secs" => self.refresh_token_lifetime_secs = parse_value(&value, "i64")?,
            "refresh_grace_period_secs" => self.refresh_grace_period_secs = parse_value(&value, "i64")?,
            "token_prefix" => self.token_prefix = value,
            _ => return Err(Error::validation(format!("Unknown key: {}", key))),
        }
        Ok(())
    }
}

impl ConfigSection for LogConfig {
    fn validate(&self) -> Result<()> {
        if self.memory_capacity == Some(0) {
            return Err(Error::validation("Memory appender capacity must be at least 1"));
        }
        if self.levels.keys().any(|name| name.trim().is_empty()) {
            return Err(Error::validation("Logger names in the level table cannot be empty"));
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Option<String> {
        match key {
            "root_level" => Some(self.root_level.to_string()),
            "console" => Some(self.console.to_string()),
            "console_threshold" => Some(self.console_threshold.to_string()),
            "json_file" => self.json_file.as_ref().map(|p| p.display().to_string()),
            "memory_capacity" => self.memory_capacity.map(|v| v.to_string()),
            _ => key
                .strip_prefix("level.")
                .and_then(|name| self.levels.get(name))
                .map(|level| level.to_string()),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<()> {
        match key {
            "root_level" => self.root_level = value.parse()?,
            "console" => self.console = parse_value(&value, "bool")?,
            "console_threshold" => self.console_threshold = value.parse()?,
            "json_file" => self.json_file = Some(PathBuf::from(value)),
            "memory_capacity" => self.memory_capacity = Some(parse_value(&value, "usize")?),
            _ => match key.strip_prefix("level.") {
                Some(name) => {
                    self.levels.insert(name.to_string(), value.parse()?);
                }
                None => return Err(Error::validation(format!("Unknown key: {}", key))),
            },
        }
        Ok(())
    }
}
