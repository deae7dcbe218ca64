//! Configuration validation
//!
//! Rejects configurations the relay cannot run with:
//! - Empty bind address, collector target or tag
//! - Collector target without a numeric port
//! - Zero connection limit, buffer size or line length
//! - Connection limit above `MAX_CONNECTIONS`

use crate::Config;
use crate::error::{ConfigError, Result};

/// Upper bound for `source.max_connections`
pub const MAX_CONNECTIONS: usize = 1 << 20;

/// Validate the entire configuration
pub fn validate_config(config: &Config) -> Result<()> {
    validate_source(config)?;
    validate_forwarder(config)?;
    Ok(())
}

fn validate_source(config: &Config) -> Result<()> {
    let source = &config.source;

    if source.address.trim().is_empty() {
        return Err(ConfigError::missing_field("source", "address"));
    }
    if source.max_connections == 0 {
        return Err(ConfigError::invalid_value(
            "source",
            "max_connections",
            "must be at least 1",
        ));
    }
    if source.max_connections > MAX_CONNECTIONS {
        return Err(ConfigError::invalid_value(
            "source",
            "max_connections",
            format!("must be at most {MAX_CONNECTIONS}"),
        ));
    }
    if source.buffer_size == 0 {
        return Err(ConfigError::invalid_value(
            "source",
            "buffer_size",
            "must be at least 1",
        ));
    }
    if source.max_line_length == Some(0) {
        return Err(ConfigError::invalid_value(
            "source",
            "max_line_length",
            "must be at least 1 (omit for unbounded lines)",
        ));
    }

    Ok(())
}

fn validate_forwarder(config: &Config) -> Result<()> {
    let forwarder = &config.forwarder;

    if forwarder.target.trim().is_empty() {
        return Err(ConfigError::missing_field("forwarder", "target"));
    }
    match forwarder.target.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && port.parse::<u16>().is_ok() => {}
        _ => {
            return Err(ConfigError::invalid_value(
                "forwarder",
                "target",
                format!("expected host:port, got '{}'", forwarder.target),
            ));
        }
    }
    if forwarder.tag.is_empty() {
        return Err(ConfigError::missing_field("forwarder", "tag"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_empty_address_rejected() {
        let mut config = Config::default();
        config.source.address = " ".into();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                section: "source",
                field: "address"
            }
        ));
    }

    #[test]
    fn test_zero_max_connections_rejected() {
        let mut config = Config::default();
        config.source.max_connections = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_connections"));
    }

    #[test]
    fn test_huge_max_connections_rejected() {
        let mut config = Config::default();
        config.source.max_connections = usize::MAX;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                section: "source",
                field: "max_connections",
                ..
            }
        ));
    }

    #[test]
    fn test_max_connections_at_limit_accepted() {
        let mut config = Config::default();
        config.source.max_connections = MAX_CONNECTIONS;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_zero_buffer_size_rejected() {
        let mut config = Config::default();
        config.source.buffer_size = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_zero_line_length_rejected() {
        let mut config = Config::default();
        config.source.max_line_length = Some(0);
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("max_line_length"));
    }

    #[test]
    fn test_empty_target_rejected() {
        let mut config = Config::default();
        config.forwarder.target = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::MissingField {
                section: "forwarder",
                field: "target"
            }
        ));
    }

    #[test]
    fn test_target_without_port_rejected() {
        for target in ["collector.local", "collector.local:", ":24224", "host:notaport"] {
            let mut config = Config::default();
            config.forwarder.target = target.into();
            let err = validate_config(&config).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { field: "target", .. }),
                "target {target:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_ipv6_target_accepted() {
        let mut config = Config::default();
        config.forwarder.target = "[::1]:24224".into();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_empty_tag_rejected() {
        let mut config = Config::default();
        config.forwarder.tag = String::new();
        assert!(validate_config(&config).is_err());
    }
}
