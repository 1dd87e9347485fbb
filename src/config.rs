//! Configuration module for the ack-echo server.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line arguments for the echo server
#[derive(Parser, Debug)]
#[command(name = "ack-server")]
#[command(author = "ack-echo authors")]
#[command(version = "0.1.0")]
#[command(about = "Acknowledges every received chunk with a tagged echo", long_about = None)]
pub struct CliArgs {
    /// Identifier echoed back in every response
    #[arg(value_name = "ID")]
    pub server_id: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 0.0.0.0:1236)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Number of worker threads (1 runs everything on a single thread)
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Identifier used when none is given on the command line
    pub id: Option<String>,
    /// Address to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Number of worker threads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            id: None,
            listen: default_listen(),
            workers: default_workers(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Port every echo server instance listens on.
pub const DEFAULT_PORT: u16 = 1236;

fn default_listen() -> String {
    format!("0.0.0.0:{DEFAULT_PORT}")
}

fn default_workers() -> usize {
    1
}

pub(crate) fn default_log_level() -> String {
    "info".to_string()
}

/// Identifier of one server instance.
///
/// Set once at startup and shared by every connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerId(Arc<str>);

impl ServerId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        ServerId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ServerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server_id: ServerId,
    pub listen: String,
    pub workers: usize,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Merge parsed CLI args with the TOML file they point at.
    /// CLI arguments take precedence over TOML file values.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = match cli.config {
            Some(ref config_path) => read_toml(config_path)?,
            None => TomlConfig::default(),
        };

        let server_id = cli
            .server_id
            .or(toml_config.server.id)
            .ok_or(ConfigError::MissingServerId)?;

        let workers = cli.workers.unwrap_or(toml_config.server.workers);
        if workers == 0 {
            return Err(ConfigError::InvalidWorkers);
        }

        Ok(Config {
            server_id: ServerId::new(server_id),
            listen: cli.listen.unwrap_or(toml_config.server.listen),
            workers,
            log_level: if cli.log_level != "info" {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

/// Read and parse a TOML file into `T`.
pub(crate) fn read_toml<T>(path: &Path) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::TomlParse(path.to_path_buf(), e))
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    MissingServerId,
    InvalidWorkers,
    NoBackends,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::MissingServerId => {
                write!(f, "No server identifier given on the command line or in [server] id")
            }
            ConfigError::InvalidWorkers => write!(f, "Worker count must be at least 1"),
            ConfigError::NoBackends => write!(f, "At least one backend address is required"),
        }
    }
}

impl std::error::Error for ConfigError {}
