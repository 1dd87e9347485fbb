//! Balancer configuration.
//!
//! Same layering as the server: CLI arguments over an optional TOML file
//! over built-in defaults.

use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;

use super::pool::Algorithm;
use crate::config::{default_log_level, read_toml, ConfigError, LoggingConfig};

/// Command-line arguments for the balancer
#[derive(Parser, Debug)]
#[command(name = "ack-balancer")]
#[command(author = "ack-echo authors")]
#[command(version = "0.1.0")]
#[command(about = "Spreads client traffic over a pool of ack-servers", long_about = None)]
pub struct BalancerArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 0.0.0.0:8080)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Backend address; repeat or comma-separate for several
    #[arg(short = 'b', long = "backend", value_delimiter = ',')]
    pub backends: Vec<String>,

    /// Load balancing algorithm ('roundrobin' or 'random')
    #[arg(short = 'a', long)]
    pub algo: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct BalancerToml {
    #[serde(default)]
    pub balancer: BalancerSection,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[balancer]` table
#[derive(Debug, Deserialize)]
pub struct BalancerSection {
    #[serde(default = "default_listen")]
    pub listen: String,
    #[serde(default = "default_backends")]
    pub backends: Vec<String>,
    #[serde(default = "default_algo")]
    pub algo: String,
}

impl Default for BalancerSection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            backends: default_backends(),
            algo: default_algo(),
        }
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_backends() -> Vec<String> {
    vec![
        "127.0.0.1:1236".to_string(),
        "127.0.0.1:1237".to_string(),
        "127.0.0.1:1238".to_string(),
    ]
}

fn default_algo() -> String {
    "roundrobin".to_string()
}

/// Final resolved balancer configuration
#[derive(Debug, Clone)]
pub struct BalancerConfig {
    pub listen: String,
    pub backends: Vec<String>,
    pub algorithm: Algorithm,
    pub log_level: String,
}

impl BalancerConfig {
    /// Load configuration from CLI args and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(BalancerArgs::parse())
    }

    pub fn from_args(cli: BalancerArgs) -> Result<Self, ConfigError> {
        let toml_config: BalancerToml = match cli.config {
            Some(ref path) => read_toml(path)?,
            None => BalancerToml::default(),
        };

        let backends = if cli.backends.is_empty() {
            toml_config.balancer.backends
        } else {
            cli.backends
        };
        if backends.is_empty() {
            return Err(ConfigError::NoBackends);
        }

        let algo = cli.algo.unwrap_or(toml_config.balancer.algo);

        Ok(BalancerConfig {
            listen: cli.listen.unwrap_or(toml_config.balancer.listen),
            backends,
            algorithm: Algorithm::from_name(&algo),
            log_level: if cli.log_level != default_log_level() {
                cli.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> BalancerArgs {
        BalancerArgs::try_parse_from(std::iter::once("ack-balancer").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = BalancerConfig::from_args(parse(&[])).unwrap();
        assert_eq!(config.listen, "0.0.0.0:8080");
        assert_eq!(
            config.backends,
            vec!["127.0.0.1:1236", "127.0.0.1:1237", "127.0.0.1:1238"]
        );
        assert_eq!(config.algorithm, Algorithm::RoundRobin);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_backends_and_algo() {
        let config = BalancerConfig::from_args(parse(&[
            "-b",
            "10.0.0.1:1236,10.0.0.2:1236",
            "--backend",
            "10.0.0.3:1236",
            "--algo",
            "random",
        ]))
        .unwrap();
        assert_eq!(
            config.backends,
            vec!["10.0.0.1:1236", "10.0.0.2:1236", "10.0.0.3:1236"]
        );
        assert_eq!(config.algorithm, Algorithm::Random);
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [balancer]
            listen = "127.0.0.1:9000"
            backends = ["127.0.0.1:2000"]
            algo = "random"

            [logging]
            level = "debug"
        "#;

        let config: BalancerToml = toml::from_str(toml_str).unwrap();
        assert_eq!(config.balancer.listen, "127.0.0.1:9000");
        assert_eq!(config.balancer.backends, vec!["127.0.0.1:2000"]);
        assert_eq!(config.balancer.algo, "random");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_empty_backend_list_rejected() {
        let path = std::env::temp_dir().join(format!("ack-balancer-{}.toml", std::process::id()));
        std::fs::write(&path, "[balancer]\nbackends = []\n").unwrap();

        let err = BalancerConfig::from_args(parse(&["-c", path.to_str().unwrap()])).unwrap_err();
        assert!(matches!(err, ConfigError::NoBackends));

        std::fs::remove_file(&path).unwrap();
    }
}
