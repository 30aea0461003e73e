// Configuration module entry point
// Loads layered configuration and builds the immutable site description

mod site;
mod types;

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::error::{Result, ServeError};

pub use site::Site;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default listening port
pub const DEFAULT_PORT: u16 = 8080;

/// Config file stem looked up in the working directory
const CONFIG_FILE: &str = "config";

/// Environment variable prefix, e.g. `WASM_SERVER_SERVER__PORT=9000`
const ENV_PREFIX: &str = "WASM_SERVER";

impl Config {
    /// Load configuration from `config.toml` (optional) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// Load configuration from the specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.title", "Power Calculator WebAssembly Server")?
            .set_default("server.shutdown_grace_ms", 500)?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default("http.directory_listing", true)?
            .set_default("http.keep_alive", true)?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse().map_err(|_| ServeError::Address(addr))
    }

    /// Root directory before canonicalization.
    ///
    /// Falls back to the directory holding the executable, then to the
    /// current directory.
    pub fn root_dir(&self) -> PathBuf {
        if let Some(root) = &self.server.root {
            return root.clone();
        }
        std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
