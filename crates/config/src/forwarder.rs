//! Outbound collector configuration

use std::time::Duration;

use serde::Deserialize;

/// Forwarder configuration
///
/// Every record is delivered on its own short-lived TCP connection to
/// `target`.
///
/// # Example
///
/// ```toml
/// [forwarder]
/// target = "collector.example.com:24224"
/// tag = "syslog"
/// connection_timeout = "10s"
/// write_timeout = "5s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ForwarderSinkConfig {
    /// Collector address (host:port)
    /// Default: "remote-fluentd-server.com:24224"
    pub target: String,

    /// Tag stamped on every record
    /// Default: "syslog"
    pub tag: String,

    /// Dial timeout (0 = wait indefinitely)
    /// Default: 0s
    #[serde(with = "humantime_serde")]
    pub connection_timeout: Duration,

    /// Write timeout per record (0 = wait indefinitely)
    /// Default: 0s
    #[serde(with = "humantime_serde")]
    pub write_timeout: Duration,

    /// Enable TCP_NODELAY on outbound sockets
    /// Default: true
    pub no_delay: bool,
}

impl Default for ForwarderSinkConfig {
    fn default() -> Self {
        Self {
            target: "remote-fluentd-server.com:24224".into(),
            tag: "syslog".into(),
            connection_timeout: Duration::ZERO,
            write_timeout: Duration::ZERO,
            no_delay: true,
        }
    }
}

impl ForwarderSinkConfig {
    /// Dial timeout, `None` when disabled
    pub fn connection_timeout(&self) -> Option<Duration> {
        (!self.connection_timeout.is_zero()).then_some(self.connection_timeout)
    }

    /// Write timeout, `None` when disabled
    pub fn write_timeout(&self) -> Option<Duration> {
        (!self.write_timeout.is_zero()).then_some(self.write_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ForwarderSinkConfig::default();
        assert_eq!(config.target, "remote-fluentd-server.com:24224");
        assert_eq!(config.tag, "syslog");
        assert!(config.connection_timeout().is_none());
        assert!(config.write_timeout().is_none());
    }

    #[test]
    fn test_timeouts() {
        let toml = r#"
connection_timeout = "10s"
write_timeout = "250ms"
"#;
        let config: ForwarderSinkConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.connection_timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.write_timeout(), Some(Duration::from_millis(250)));
    }
}
