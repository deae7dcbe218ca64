//! Relay - Sources
//!
//! Network sources that receive syslog lines and hand each one, as a
//! `ForwardRecord`, to the forwarder sink.
//!
//! # Available Sources
//!
//! - **Syslog TCP** - newline-delimited syslog over TCP
//!
//! # Example
//!
//! ```ignore
//! use relay_protocol::RecordConverter;
//! use relay_sinks::{ForwardSender, ForwarderConfig};
//! use relay_sources::{SyslogTcpSource, SyslogTcpSourceConfig};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let forwarder = Arc::new(ForwardSender::new(ForwarderConfig::new("collector:24224")));
//! let source = SyslogTcpSource::new(
//!     SyslogTcpSourceConfig::default(),
//!     RecordConverter::default(),
//!     forwarder,
//! );
//! source.run(CancellationToken::new()).await?;
//! ```

pub mod syslog;

mod common;

pub use common::{MetricsSnapshot, SourceMetrics};
pub use syslog::{
    LineReader, ReadEnd, ReadLine, SyslogTcpMetricsSnapshot, SyslogTcpSource,
    SyslogTcpSourceConfig, SyslogTcpSourceError, SyslogTcpSourceMetrics,
};
