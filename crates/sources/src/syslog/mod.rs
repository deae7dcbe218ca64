//! Syslog Sources
//!
//! Syslog receiver over TCP with newline framing.
//!
//! # Design
//!
//! - No authentication, no handshake
//! - Line-based framing (newline-delimited messages)
//! - Raw message forwarding (no priority/facility/timestamp parsing)

pub mod line_reader;
pub mod tcp;

pub use line_reader::{LineReader, ReadEnd, ReadLine};
pub use tcp::{
    SyslogTcpMetricsSnapshot, SyslogTcpSource, SyslogTcpSourceConfig, SyslogTcpSourceError,
    SyslogTcpSourceMetrics,
};
