//! Logging backend setup.
//!
//! Builds a `tracing` dispatcher from an explicit [`LogConfig`]. Nothing here
//! touches the process-wide default unless [`install_global`] is called.

use std::env;
use std::fmt;
use std::io;
use std::str::FromStr;
use thiserror::Error;
use tracing::Dispatch;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, layer::SubscriberExt, EnvFilter};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown log level `{0}` (expected trace, debug, info, warn or error)")]
    UnknownLevel(String),

    #[error("unknown log format `{0}` (expected text, json, compact or pretty)")]
    UnknownFormat(String),

    #[error("unknown log output `{0}` (expected stdout or stderr)")]
    UnknownOutput(String),

    #[error("invalid log filter directive: {0}")]
    InvalidFilter(String),

    #[error("invalid LOG_SOURCE `{0}` (expected true or false)")]
    InvalidSourceLocation(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    fn as_directive(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::UnknownLevel(s.to_string())),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// Line format of the log output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single line
    #[default]
    Text,
    /// One JSON object per event
    Json,
    Compact,
    /// Multi-line, for local development
    Pretty,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
}

impl FromStr for LogOutput {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stdout" => Ok(Self::Stdout),
            "stderr" => Ok(Self::Stderr),
            _ => Err(ConfigError::UnknownOutput(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogConfig {
    /// Minimum level for this crate and everything else
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Include file and line of the call site
    pub source_location: bool,
    /// Extra `EnvFilter` directives appended after the level, e.g. `sqlx=warn`
    pub directives: Option<String>,
}

impl LogConfig {
    /// Read `LOG_LEVEL`, `LOG_FORMAT`, `LOG_OUTPUT`, `LOG_SOURCE` and
    /// `RUST_LOG`. Unset variables keep their defaults; unknown values are
    /// rejected.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(level) = lookup("LOG_LEVEL") {
            config.level = level.parse()?;
        }
        if let Some(format) = lookup("LOG_FORMAT") {
            config.format = format.parse()?;
        }
        if let Some(output) = lookup("LOG_OUTPUT") {
            config.output = output.parse()?;
        }
        if let Some(source) = lookup("LOG_SOURCE") {
            config.source_location = source
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidSourceLocation(source.clone()))?;
        }
        config.directives = lookup("RUST_LOG");
        Ok(config)
    }

    /// Validated filter for this config
    pub fn env_filter(&self) -> Result<EnvFilter, ConfigError> {
        let mut filter = self.level.as_directive().to_string();
        if let Some(extra) = self.directives.as_deref().filter(|d| !d.trim().is_empty()) {
            filter.push(',');
            filter.push_str(extra);
        }
        EnvFilter::try_new(&filter).map_err(|e| ConfigError::InvalidFilter(e.to_string()))
    }

    /// Build a dispatcher for this config without installing it
    pub fn build_dispatch(&self) -> Result<Dispatch, ConfigError> {
        let filter = self.env_filter()?;
        let writer = match self.output {
            LogOutput::Stdout => BoxMakeWriter::new(io::stdout),
            LogOutput::Stderr => BoxMakeWriter::new(io::stderr),
        };

        let base = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_file(self.source_location)
            .with_line_number(self.source_location);
        let registry = tracing_subscriber::registry().with(filter);

        let dispatch = match self.format {
            LogFormat::Text => Dispatch::new(registry.with(base)),
            LogFormat::Json => Dispatch::new(registry.with(base.json())),
            LogFormat::Compact => Dispatch::new(registry.with(base.compact())),
            LogFormat::Pretty => Dispatch::new(registry.with(base.pretty())),
        };
        Ok(dispatch)
    }
}

/// Make `dispatch` the process-wide default. Only the binary should do this.
pub fn install_global(dispatch: Dispatch) -> anyhow::Result<()> {
    tracing::dispatcher::set_global_default(dispatch)
        .map_err(|e| anyhow::anyhow!("failed to install global logger: {}", e))
}
