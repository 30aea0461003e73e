// Configuration types module
// Defines the deserialized configuration sections

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory to serve; defaults to the executable's directory
    pub root: Option<PathBuf>,
    pub workers: Option<usize>,
    /// Title line of the startup banner
    pub title: String,
    /// How long in-flight connections may run after a shutdown signal
    pub shutdown_grace_ms: u64,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// Access log format (common, combined, json, or custom pattern)
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    #[serde(default = "default_index_files")]
    pub index_files: Vec<String>,
    pub directory_listing: bool,
    pub keep_alive: bool,
}

#[allow(clippy::missing_const_for_fn)]
fn default_index_files() -> Vec<String> {
    vec!["index.html".to_string(), "index.htm".to_string()]
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct PerformanceConfig {
    /// Upper bound on a single connection's lifetime, in seconds
    #[serde(default)]
    pub connection_timeout: Option<u64>,
}
