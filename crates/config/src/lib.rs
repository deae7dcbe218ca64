//! Relay Configuration
//!
//! TOML-based configuration loading with sensible defaults.
//! An empty file (or no file at all) reproduces the stock relay: listen on
//! `0.0.0.0:5140` and forward to `remote-fluentd-server.com:24224` with the
//! `syslog` tag.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use relay_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[source]\nport = 1514").unwrap();
//! assert_eq!(config.source.port, 1514);
//! ```
//!
//! # Example Full Config
//!
//! ```toml
//! [log]
//! level = "info"
//! format = "console"
//! output = "stdout"
//!
//! [source]
//! address = "0.0.0.0"
//! port = 5140
//! max_connections = 1024
//!
//! [forwarder]
//! target = "collector.internal:24224"
//! tag = "syslog"
//! connection_timeout = "10s"
//! ```

mod error;
mod forwarder;
mod global;
mod logging;
mod source;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use error::{ConfigError, Result};
pub use forwarder::ForwarderSinkConfig;
pub use global::GlobalConfig;
pub use logging::{LogConfig, LogFormat, LogLevel, LogOutput};
pub use source::SourceConfig;
pub use validation::MAX_CONNECTIONS;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Process-wide settings
    pub global: GlobalConfig,

    /// Logging configuration
    pub log: LogConfig,

    /// Inbound syslog listener
    pub source: SourceConfig,

    /// Outbound collector
    pub forwarder: ForwarderSinkConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string
    ///
    /// Prefer using the `FromStr` trait implementation.
    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config.source.bind_address(), "0.0.0.0:5140");
        assert_eq!(config.forwarder.target, "remote-fluentd-server.com:24224");
        assert_eq!(config.forwarder.tag, "syslog");
        assert_eq!(config.log.level, LogLevel::Info);
    }

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[global]
shutdown_timeout_secs = 10

[log]
level = "debug"
format = "json"
output = "stderr"

[source]
address = "127.0.0.1"
port = 1514
max_connections = 16
buffer_size = 4096
max_line_length = 65536
idle_timeout = "30s"
no_delay = false

[forwarder]
target = "localhost:24224"
tag = "edge.syslog"
connection_timeout = "2s"
write_timeout = "500ms"
"#;
        let config = Config::from_str(toml).unwrap();

        assert_eq!(config.global.shutdown_timeout_secs, 10);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.source.bind_address(), "127.0.0.1:1514");
        assert_eq!(config.source.max_connections, 16);
        assert_eq!(config.source.max_line_length, Some(65536));
        assert_eq!(config.source.idle_timeout(), Some(Duration::from_secs(30)));
        assert!(!config.source.no_delay);
        assert_eq!(config.forwarder.tag, "edge.syslog");
        assert_eq!(
            config.forwarder.write_timeout(),
            Some(Duration::from_millis(500))
        );
    }

    #[test]
    fn test_invalid_toml() {
        let result = Config::from_str("invalid { toml");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = Config::from_str("[sinks.stdout]\ntype = \"stdout\"");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_validation_runs_on_parse() {
        let result = Config::from_str("[forwarder]\ntag = \"\"");
        assert!(matches!(result, Err(ConfigError::MissingField { .. })));
    }

    #[test]
    fn test_oversized_connection_limit_rejected_on_parse() {
        let result = Config::from_str("[source]\nmax_connections = 4000000000000000000");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                field: "max_connections",
                ..
            })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[source]\nport = 6514").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.source.port, 6514);
    }

    #[test]
    fn test_from_file_missing() {
        let result = Config::from_file("/nonexistent/relay.toml");
        match result {
            Err(ConfigError::IoError { path, .. }) => {
                assert!(path.contains("relay.toml"));
            }
            other => panic!("expected IoError, got {other:?}"),
        }
    }
}
