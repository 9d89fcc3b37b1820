//! # Logger
//!
//! Installs the process-wide `tracing` subscriber for the workspace binaries.
//!
//! * Console output is compact and written to `stderr`, so `stdout` stays free
//!   for program output.
//! * File output uses a non-blocking rolling appender; set [`LoggerConfig::json`]
//!   to write JSON lines instead of text.
//! * [`LoggerConfig`] deserializes with `serde`, so it can live in any
//!   application config file. `RUST_LOG` still applies when no explicit
//!   [`LoggerConfig::env_filter`] is given.
//!
//! ## Example
//!
//! ```rust
//! # use sealed_logger::{Logger, LevelFilter};
//!
//! let _logger = Logger::builder("my-app")
//!     .level(LevelFilter::DEBUG)
//!     .env_filter("sealed_enum=trace")
//!     .init()
//!     .unwrap();
//! ```

mod error;

pub use crate::error::{LoggerError, LoggerErrorExt, LoggerErrorKind};
pub use tracing::level_filters::LevelFilter;

use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_SUFFIX: &str = "log";

/// How often the log file rolls over.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationKind {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationKind> for Rotation {
    fn from(kind: RotationKind) -> Self {
        match kind {
            RotationKind::Minutely => Self::MINUTELY,
            RotationKind::Hourly => Self::HOURLY,
            RotationKind::Daily => Self::DAILY,
            RotationKind::Never => Self::NEVER,
        }
    }
}

/// Logger settings, usually a `[log]` table of an application config.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Identifies the application; also the prefix of rolled log files.
    pub name: String,
    /// Default level directive (`error`, `warn`, `info`, `debug`, `trace`, `off`).
    pub level: String,
    pub console: bool,
    /// Write JSON lines to the log file instead of text.
    pub json: bool,
    /// Enables file output when set.
    pub directory: Option<PathBuf>,
    pub rotation: RotationKind,
    pub max_files: usize,
    /// Module directives such as `sealed_enum=debug`; replaces `RUST_LOG` when set.
    pub env_filter: Option<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: "sealed".to_owned(),
            level: "info".to_owned(),
            console: true,
            json: false,
            directory: None,
            rotation: RotationKind::default(),
            max_files: 10,
            env_filter: None,
        }
    }
}

impl LoggerConfig {
    /// Parses [`LoggerConfig::level`].
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] for an unknown level name.
    pub fn level_filter(&self) -> Result<LevelFilter, LoggerError> {
        self.level.parse().map_err(|_| LoggerError::InvalidConfiguration {
            message: format!("unknown log level '{}'", self.level).into(),
            context: None,
        })
    }

    /// Checks every field without touching global state.
    ///
    /// # Errors
    /// [`LoggerError::InvalidConfiguration`] describing the first invalid field.
    pub fn validate(&self) -> Result<(), LoggerError> {
        if self.name.trim().is_empty() {
            return Err(invalid("Logger name cannot be empty"));
        }
        if self.max_files == 0 {
            return Err(invalid("max_files must be greater than zero"));
        }
        if !self.console && self.directory.is_none() {
            return Err(invalid("No logging output enabled. Enable console or set a directory."));
        }
        self.level_filter()?;
        self.env_filter().map(drop)
    }

    fn env_filter(&self) -> Result<EnvFilter, LoggerError> {
        let builder = EnvFilter::builder().with_default_directive(self.level_filter()?.into());
        self.env_filter.as_ref().map_or_else(
            || Ok(builder.from_env_lossy()),
            |filter| {
                builder.parse(filter).map_err(|e| LoggerError::InvalidConfiguration {
                    message: format!("Invalid env filter '{filter}': {e}").into(),
                    context: None,
                })
            },
        )
    }
}

/// Fluent construction of a [`LoggerConfig`] followed by [`LoggerBuilder::init`].
#[derive(Debug)]
pub struct LoggerBuilder {
    config: LoggerConfig,
}

impl LoggerBuilder {
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn level(mut self, level: LevelFilter) -> Self {
        self.config.level = level.to_string();
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn env_filter(mut self, filter: impl Into<String>) -> Self {
        self.config.env_filter = Some(filter.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn console(mut self, enabled: bool) -> Self {
        self.config.console = enabled;
        self
    }

    /// Writes rolled log files into `directory`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.config.directory = Some(directory.into());
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn json(mut self, enabled: bool) -> Self {
        self.config.json = enabled;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn rotation(mut self, rotation: RotationKind) -> Self {
        self.config.rotation = rotation;
        self
    }

    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub const fn max_files(mut self, max: usize) -> Self {
        self.config.max_files = max;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &LoggerConfig {
        &self.config
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    /// See [`Logger::init`].
    pub fn init(self) -> Result<Logger, LoggerError> {
        Logger::init(&self.config)
    }
}

/// Handle to the installed logging system.
///
/// Holds the background writer guard of the file output. Keep it alive until
/// shutdown; dropping it flushes pending file logs.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Starts a builder for the application `name`.
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder(name: impl Into<String>) -> LoggerBuilder {
        LoggerBuilder { config: LoggerConfig { name: name.into(), ..LoggerConfig::default() } }
    }

    /// Validates `config` and installs the global subscriber.
    ///
    /// # Errors
    /// * [`LoggerError::InvalidConfiguration`] for an invalid config.
    /// * [`LoggerError::Io`] if the log directory cannot be created.
    /// * [`LoggerError::Appender`] if the rolling appender cannot be built.
    /// * [`LoggerError::Subscriber`] if a global subscriber is already set.
    pub fn init(config: &LoggerConfig) -> Result<Self, LoggerError> {
        config.validate()?;
        let env_filter = config.env_filter()?;

        let mut layers = Vec::new();
        if config.console {
            layers.push(layer().compact().with_writer(std::io::stderr).with_ansi(true).boxed());
        }

        let guard = if let Some(directory) = &config.directory {
            fs::create_dir_all(directory)
                .context(format!("Failed to create {}", directory.display()))?;

            let appender = RollingFileAppender::builder()
                .rotation(config.rotation.into())
                .filename_prefix(&config.name)
                .filename_suffix(LOG_FILE_SUFFIX)
                .max_log_files(config.max_files)
                .build(directory)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);

            let file_layer = layer().with_writer(writer).with_ansi(false);
            layers.push(if config.json { file_layer.json().boxed() } else { file_layer.boxed() });
            Some(guard)
        } else {
            None
        };

        tracing_subscriber::registry().with(env_filter).with(layers).try_init()?;
        tracing::debug!(name = %config.name, console = config.console, file = guard.is_some(), "Logger initialized");

        Ok(Self { guard })
    }

    /// Whether file output is active.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

fn invalid(message: &'static str) -> LoggerError {
    LoggerError::InvalidConfiguration { message: message.into(), context: None }
}
