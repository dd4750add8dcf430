use std::path::PathBuf;

use anyhow::Result;
use config::{Config, ConfigBuilder, builder::DefaultState};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_HORIZON_WEEKS, DEFAULT_MAX_DOCUMENT_BYTES, DEFAULT_MAX_INSTANCES, DEFAULT_STORAGE_KEY,
};
use crate::types::ImportDedup;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub import: ImportConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the address to bind in the format "host:port".
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one JSON file per storage key.
    pub data_dir: PathBuf,
    pub key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    pub dedup: ImportDedup,
    /// Expansion window for rules with neither COUNT nor UNTIL.
    pub horizon_weeks: u32,
    /// Hard cap on instances produced per recurrence rule.
    pub max_instances: u16,
    /// Request body limit for schedule uploads.
    pub max_document_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads settings from defaults, an optional `config.toml`, and `ROLLCALL_*`
    /// environment variables. Environment variables win over the file.
    ///
    /// Nested keys use a double underscore, e.g. `ROLLCALL_SERVER__PORT=9000`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::defaults()?
            .add_source(config::File::with_name("config.toml").required(false))
            .add_source(
                config::Environment::with_prefix("ROLLCALL")
                    .prefix_separator("_")
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?)
    }

    /// ## Summary
    /// Builds settings from defaults overlaid with the given TOML document.
    ///
    /// ## Errors
    /// Returns an error if the TOML is malformed or a value has the wrong type.
    pub fn from_toml(toml: &str) -> Result<Self> {
        Ok(Self::defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize::<Settings>()?)
    }

    fn defaults() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8699)?
            .set_default("storage.data_dir", "./data")?
            .set_default("storage.key", DEFAULT_STORAGE_KEY)?
            .set_default("import.dedup", "none")?
            .set_default("import.horizon_weeks", i64::from(DEFAULT_HORIZON_WEEKS))?
            .set_default("import.max_instances", i64::from(DEFAULT_MAX_INSTANCES))?
            .set_default(
                "import.max_document_bytes",
                i64::from(DEFAULT_MAX_DOCUMENT_BYTES),
            )?
            .set_default("logging.level", "info")?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "Loaded .env file");
    }

    Settings::load()
}
