//! Relay - Syslog over TCP to a JSON-line collector
//!
//! Wires the configuration into a running pipeline:
//!
//! ```text
//! syslog client ──TCP──▶ SyslogTcpSource ──▶ RecordConverter ──▶ ForwardSender ──TCP──▶ collector
//! ```
//!
//! The binary only adds CLI parsing, logging setup and signal handling on
//! top of [`Relay`].

use std::sync::Arc;

use relay_config::{Config, ForwarderSinkConfig, SourceConfig};
use relay_protocol::RecordConverter;
use relay_sinks::{ForwardSender, ForwarderConfig};
use relay_sources::{SyslogTcpSource, SyslogTcpSourceConfig};

/// Source identifier used in logs
pub const SOURCE_ID: &str = "syslog_tcp";

/// Build the listener settings from the `[source]` section
pub fn source_config(config: &SourceConfig) -> SyslogTcpSourceConfig {
    SyslogTcpSourceConfig {
        id: SOURCE_ID.to_string(),
        address: config.address.clone(),
        port: config.port,
        buffer_size: config.buffer_size,
        socket_buffer_size: config.socket_buffer_size,
        max_connections: config.max_connections,
        max_line_length: config.max_line_length,
        idle_timeout: config.idle_timeout(),
        nodelay: config.no_delay,
    }
}

/// Build the sender settings from the `[forwarder]` section
pub fn forwarder_config(config: &ForwarderSinkConfig) -> ForwarderConfig {
    let mut forwarder = ForwarderConfig::new(config.target.as_str()).with_nodelay(config.no_delay);
    if let Some(timeout) = config.connection_timeout() {
        forwarder = forwarder.with_connection_timeout(timeout);
    }
    if let Some(timeout) = config.write_timeout() {
        forwarder = forwarder.with_write_timeout(timeout);
    }
    forwarder
}

/// A configured relay, ready to bind
pub struct Relay {
    /// Inbound listener
    pub source: Arc<SyslogTcpSource>,

    /// Outbound sender shared by every connection
    pub forwarder: Arc<ForwardSender>,
}

impl Relay {
    /// Assemble the pipeline described by `config`
    ///
    /// Nothing touches the network until the source is run.
    pub fn from_config(config: &Config) -> Self {
        let forwarder = Arc::new(ForwardSender::new(forwarder_config(&config.forwarder)));
        let converter = RecordConverter::new(config.forwarder.tag.as_str());
        let source = Arc::new(SyslogTcpSource::new(
            source_config(&config.source),
            converter,
            Arc::clone(&forwarder),
        ));

        Self { source, forwarder }
    }

    /// Log a one-line summary of the traffic seen so far
    pub fn log_metrics_summary(&self) {
        let source = self.source.metrics().snapshot();
        let forwarder = self.forwarder.metrics().snapshot();

        tracing::info!(
            connections_total = source.connections_total,
            lines_read = source.lines_read,
            lines_oversized = source.lines_oversized,
            partial_lines = source.partial_lines,
            bytes_received = source.bytes_received,
            records_sent = forwarder.records_sent,
            records_dropped = forwarder.dropped(),
            connect_failures = forwarder.connect_failures,
            write_failures = forwarder.write_failures,
            "relay metrics"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::time::Duration;

    use super::*;

    #[test]
    fn test_defaults_map_to_stock_relay() {
        let config = Config::default();

        let source = source_config(&config.source);
        assert_eq!(source.bind_address(), "0.0.0.0:5140");
        assert_eq!(source.max_connections, 1024);
        assert!(source.idle_timeout.is_none());
        assert!(source.max_line_length.is_none());
        assert_eq!(source.socket_buffer_size, 256 * 1024);

        let forwarder = forwarder_config(&config.forwarder);
        assert_eq!(forwarder.target, "remote-fluentd-server.com:24224");
        assert!(forwarder.connection_timeout.is_none());
        assert!(forwarder.write_timeout.is_none());
        assert!(forwarder.nodelay);
    }

    #[test]
    fn test_timeouts_and_limits_carry_over() {
        let config = Config::from_str(
            r#"
[source]
port = 1514
max_line_length = 4096
socket_buffer_size = 65536
idle_timeout = "30s"
no_delay = false

[forwarder]
target = "127.0.0.1:24224"
connection_timeout = "5s"
write_timeout = "2s"
"#,
        )
        .unwrap();

        let source = source_config(&config.source);
        assert_eq!(source.port, 1514);
        assert_eq!(source.max_line_length, Some(4096));
        assert_eq!(source.socket_buffer_size, 65536);
        assert_eq!(source.idle_timeout, Some(Duration::from_secs(30)));
        assert!(!source.nodelay);

        let forwarder = forwarder_config(&config.forwarder);
        assert_eq!(forwarder.target, "127.0.0.1:24224");
        assert_eq!(forwarder.connection_timeout, Some(Duration::from_secs(5)));
        assert_eq!(forwarder.write_timeout, Some(Duration::from_secs(2)));
    }

    #[tokio::test]
    async fn test_relay_from_config_is_idle() {
        let relay = Relay::from_config(&Config::default());

        assert!(!relay.source.is_running());
        assert_eq!(relay.forwarder.target(), "remote-fluentd-server.com:24224");
        assert_eq!(relay.forwarder.metrics().snapshot().attempts, 0);
    }
}
