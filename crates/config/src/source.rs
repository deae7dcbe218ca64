//! Inbound syslog listener configuration

use std::time::Duration;

use serde::Deserialize;

/// Syslog TCP listener configuration
///
/// # Example
///
/// ```toml
/// [source]
/// address = "0.0.0.0"
/// port = 5140
/// max_connections = 1024
/// max_line_length = 65536
/// idle_timeout = "5m"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Bind address
    /// Default: "0.0.0.0"
    pub address: String,

    /// Listen port
    /// Default: 5140
    pub port: u16,

    /// Maximum concurrently served connections
    /// Default: 1024
    pub max_connections: usize,

    /// Read buffer size per connection (bytes)
    /// Default: 8192
    pub buffer_size: usize,

    /// Kernel receive buffer (SO_RCVBUF) for accepted sockets (0 = OS default)
    /// Default: 262144
    pub socket_buffer_size: usize,

    /// Lines longer than this are discarded
    /// Default: unbounded
    pub max_line_length: Option<usize>,

    /// Close a connection that sends nothing for this long (0 = never)
    /// Default: 0s
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,

    /// Enable TCP_NODELAY on accepted sockets
    /// Default: true
    pub no_delay: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: 5140,
            max_connections: 1024,
            buffer_size: 8 * 1024,
            socket_buffer_size: 256 * 1024,
            max_line_length: None,
            idle_timeout: Duration::ZERO,
            no_delay: true,
        }
    }
}

impl SourceConfig {
    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// Idle timeout, `None` when disabled
    pub fn idle_timeout(&self) -> Option<Duration> {
        (!self.idle_timeout.is_zero()).then_some(self.idle_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.bind_address(), "0.0.0.0:5140");
        assert_eq!(config.max_connections, 1024);
        assert_eq!(config.buffer_size, 8192);
        assert_eq!(config.socket_buffer_size, 262_144);
        assert!(config.max_line_length.is_none());
        assert!(config.idle_timeout().is_none());
        assert!(config.no_delay);
    }

    #[test]
    fn test_humantime_idle_timeout() {
        let config: SourceConfig = toml::from_str("idle_timeout = \"2m\"").unwrap();
        assert_eq!(config.idle_timeout(), Some(Duration::from_secs(120)));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config: SourceConfig = toml::from_str("port = 1514").unwrap();
        assert_eq!(config.port, 1514);
        assert_eq!(config.address, "0.0.0.0");
        assert_eq!(config.max_connections, 1024);
    }
}
