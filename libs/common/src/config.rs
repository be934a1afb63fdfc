//! Application configuration
//!
//! The configuration is a JSON document read once at startup. Any key can be
//! overridden from the environment with the `VEC` prefix and `__` as the path
//! separator, e.g. `VEC__DATABASE__CONNECTION__CONFIG__PASSWORD`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config/volunteer_event_coordination_app_config.json";

/// Environment variable naming an alternative configuration file
pub const CONFIG_PATH_ENV: &str = "VEC_CONFIG";

const ENV_PREFIX: &str = "VEC";
const ENV_SEPARATOR: &str = "__";

/// Root of the configuration document
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub meta: MetaConfig,
    pub database: DatabaseSection,
}

/// Application metadata, mostly used for log naming
#[derive(Debug, Clone, Deserialize)]
pub struct MetaConfig {
    /// Prefix of every log file written by the application
    pub log_prefix: String,
    /// Directory receiving the log files
    #[serde(default = "default_log_dir")]
    pub log_dir: String,
}

/// The `database` block
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSection {
    pub connection: ConnectionSection,
    pub pool: PoolConfig,
}

/// The `database.connection` block
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionSection {
    pub config: ConnectionConfig,
}

/// Credentials and address of the MySQL server
#[derive(Clone, Deserialize)]
pub struct ConnectionConfig {
    pub database: String,
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"********")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

/// Connection pool settings
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    pub name: String,
    pub size: u32,
    #[serde(default = "default_reset_session")]
    pub reset_session: bool,
    /// Accepted for compatibility with existing configuration files; the
    /// native driver has no pure/C-extension switch.
    #[serde(default)]
    pub use_pure: bool,
}

fn default_log_dir() -> String {
    "logs".to_string()
}

fn default_reset_session() -> bool {
    true
}

impl AppConfig {
    /// Load the configuration file at `path`, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Json))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", path.display()))?;

        settings
            .try_deserialize()
            .with_context(|| format!("invalid configuration in {}", path.display()))
    }

    /// Resolve the configuration path from the command line, then `VEC_CONFIG`,
    /// then the default location
    pub fn resolve_path(cli_arg: Option<String>) -> String {
        cli_arg
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }
}
