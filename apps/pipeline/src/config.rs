//! Layered settings for the `pipeline` binary.

use config::{Config, Environment, File, FileFormat};
use sealed_logger::LoggerConfig;
use serde::Deserialize;
use std::borrow::Cow;
use std::path::Path;
use tracing::info;

/// Base name of the optional config file in the working directory.
pub const DEFAULT_CONFIG: &str = "pipeline";
/// Prefix of environment overrides, e.g. `SEALED__LOG__LEVEL=debug`.
pub const ENV_PREFIX: &str = "SEALED";

#[sealed_derive::sealed_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub log: LoggerConfig,
    /// Inputs run when none are given on the command line.
    pub inputs: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            log: LoggerConfig { name: "pipeline".into(), level: "warn".into(), ..LoggerConfig::default() },
            inputs: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Loads `path` (required) or `pipeline.{toml,json,..}` (optional), then
    /// applies `SEALED__*` environment overrides.
    ///
    /// # Errors
    /// [`ConfigError::Config`] if an explicit file is missing or a value does not
    /// match [`PipelineConfig`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = path.map_or_else(
            || File::with_name(DEFAULT_CONFIG).required(false),
            |path| File::from(path).required(true),
        );
        info!(path = ?path, "Loading pipeline config");

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .convert_case(config::Case::Snake),
            )
            .build()
            .context("Failed to build config")?
            .try_deserialize()
            .context("Failed to deserialize config")
    }

    /// Parses an inline TOML document, without environment overrides.
    ///
    /// # Errors
    /// [`ConfigError::Config`] for malformed TOML or mismatched values.
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .context("Failed to parse config")?
            .try_deserialize()
            .context("Failed to deserialize config")
    }
}
