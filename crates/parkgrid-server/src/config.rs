//! Configuration loading and typed config structures for the server.
//!
//! The canonical configuration lives in `parkgrid.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the
//! YAML structure, and provides a loader that reads and validates the
//! file. Every section and field carries a default so a partial (or
//! missing) file still yields a runnable configuration.

use std::net::{AddrParseError, SocketAddr};
use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level server configuration.
///
/// Mirrors the structure of `parkgrid.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// HTTP listener settings.
    #[serde(default)]
    pub server: ListenConfig,

    /// Lot layout seeding settings.
    #[serde(default)]
    pub seed: SeedConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ServerSettings {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ListenConfig {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ListenConfig {
    /// The socket address to bind the listener to.
    ///
    /// # Errors
    ///
    /// Returns an [`AddrParseError`] if `host` is not a valid IP address.
    pub fn socket_addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Lot layout seeding configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedConfig {
    /// Directory holding one JSON layout file per lot.
    #[serde(default = "default_seed_dir")]
    pub dir: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            dir: default_seed_dir(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default log level filter when `RUST_LOG` is unset.
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

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8080
}

fn default_seed_dir() -> String {
    String::from("seeds")
}

fn default_log_level() -> String {
    String::from("info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_yields_defaults() {
        let settings = ServerSettings::parse("{}").unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.seed.dir, "seeds");
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let settings = ServerSettings::parse(
            r"
server:
  port: 9090
seed:
  dir: /var/lib/parkgrid/lots
",
        )
        .unwrap();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.seed.dir, "/var/lib/parkgrid/lots");
        assert_eq!(settings.logging.level, "info");
    }

    #[test]
    fn listen_config_resolves_to_a_socket_addr() {
        let settings = ServerSettings::parse("server: { host: 127.0.0.1, port: 9090 }").unwrap();
        let addr = settings.server.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "127.0.0.1:9090");

        let bad = ListenConfig {
            host: String::from("not-an-ip"),
            port: 8080,
        };
        assert!(bad.socket_addr().is_err());
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(matches!(
            ServerSettings::parse("server: [not a map"),
            Err(ConfigError::Yaml { .. })
        ));
    }
}
