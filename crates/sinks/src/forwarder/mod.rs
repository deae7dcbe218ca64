//! Forwarder Sink - Per-record delivery to a collector
//!
//! Sends each `ForwardRecord` to a remote collector over its own TCP
//! connection.
//!
//! # Design
//!
//! Every delivery is an independent connect-write-close cycle:
//! - Dial the target
//! - Write the record's wire form (one JSON line)
//! - Shut down the write half and drop the socket
//!
//! Connections are never reused and failed deliveries are never retried.
//! A record whose delivery fails is logged and dropped.
//!
//! # Protocol
//!
//! ```text
//! {"tag": "syslog", "message": "<trimmed line>"}\n
//! ```
//!
//! # Example
//!
//! ```ignore
//! let config = ForwarderConfig::new("collector.example.com:24224")
//!     .with_connection_timeout(Duration::from_secs(10));
//! let sender = ForwardSender::new(config);
//!
//! let record = RecordConverter::default().convert(RawMessage::new("hello"));
//! sender.deliver(&record).await;
//! ```

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use relay_protocol::{ForwardRecord, ProtocolError};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Configuration for the forward sender
#[derive(Debug, Clone)]
pub struct ForwarderConfig {
    /// Collector address (host:port)
    pub target: String,

    /// Dial timeout (`None` = wait indefinitely)
    pub connection_timeout: Option<Duration>,

    /// Timeout for writing one record (`None` = wait indefinitely)
    pub write_timeout: Option<Duration>,

    /// Set TCP_NODELAY on outbound sockets
    pub nodelay: bool,
}

impl ForwarderConfig {
    /// Create a config for `target` with no timeouts
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            connection_timeout: None,
            write_timeout: None,
            nodelay: true,
        }
    }

    /// Set connection timeout
    #[must_use]
    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    /// Set write timeout
    #[must_use]
    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    /// Enable or disable TCP_NODELAY
    #[must_use]
    pub fn with_nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = enabled;
        self
    }
}

/// Metrics for the forward sender
#[derive(Debug, Default)]
pub struct ForwarderMetrics {
    /// Deliveries started
    pub attempts: AtomicU64,

    /// Records written successfully
    pub records_sent: AtomicU64,

    /// Bytes written, including terminators
    pub bytes_sent: AtomicU64,

    /// Deliveries that could not connect
    pub connect_failures: AtomicU64,

    /// Deliveries that connected but failed to write
    pub write_failures: AtomicU64,
}

impl ForwarderMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            attempts: AtomicU64::new(0),
            records_sent: AtomicU64::new(0),
            bytes_sent: AtomicU64::new(0),
            connect_failures: AtomicU64::new(0),
            write_failures: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn record_attempt(&self) {
        self.attempts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_sent(&self, byte_count: u64) {
        self.records_sent.fetch_add(1, Ordering::Relaxed);
        self.bytes_sent.fetch_add(byte_count, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_connect_failure(&self) {
        self.connect_failures.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            attempts: self.attempts.load(Ordering::Relaxed),
            records_sent: self.records_sent.load(Ordering::Relaxed),
            bytes_sent: self.bytes_sent.load(Ordering::Relaxed),
            connect_failures: self.connect_failures.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of forwarder metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub attempts: u64,
    pub records_sent: u64,
    pub bytes_sent: u64,
    pub connect_failures: u64,
    pub write_failures: u64,
}

impl MetricsSnapshot {
    /// Deliveries that ended without the record being written
    pub fn dropped(&self) -> u64 {
        self.connect_failures + self.write_failures
    }
}

/// Errors from a single delivery
#[derive(Debug, thiserror::Error)]
pub enum ForwarderError {
    /// Record could not be encoded
    #[error(transparent)]
    Encode(#[from] ProtocolError),

    /// Dial failed
    #[error("connection failed to {target}: {source}")]
    ConnectionFailed {
        target: String,
        #[source]
        source: io::Error,
    },

    /// Dial did not complete in time
    #[error("connection to {target} timed out after {after:?}")]
    ConnectTimeout { target: String, after: Duration },

    /// Write failed after a successful dial
    #[error("write failed: {0}")]
    WriteFailed(#[source] io::Error),

    /// Write did not complete in time
    #[error("write timed out after {after:?}")]
    WriteTimeout { after: Duration },
}

impl ForwarderError {
    /// Whether the delivery failed before a connection was established
    pub fn is_connect_failure(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::ConnectTimeout { .. }
        )
    }
}

/// Delivers records to the collector, one connection per record
///
/// Holds no connection state, so a single sender is shared by every
/// inbound connection task.
#[derive(Debug)]
pub struct ForwardSender {
    config: ForwarderConfig,
    metrics: Arc<ForwarderMetrics>,
}

impl ForwardSender {
    /// Create a new forward sender
    pub fn new(config: ForwarderConfig) -> Self {
        Self {
            config,
            metrics: Arc::new(ForwarderMetrics::new()),
        }
    }

    /// Get reference to metrics
    pub fn metrics(&self) -> &Arc<ForwarderMetrics> {
        &self.metrics
    }

    /// Collector address
    pub fn target(&self) -> &str {
        &self.config.target
    }

    /// Deliver one record, logging the outcome
    ///
    /// Failures are not retried and never propagate: the record is dropped
    /// and the caller carries on with its next record.
    pub async fn deliver(&self, record: &ForwardRecord) {
        self.metrics.record_attempt();

        match self.send(record).await {
            Ok(bytes) => {
                self.metrics.record_sent(bytes as u64);
                tracing::info!(
                    target_addr = %self.config.target,
                    tag = %record.tag(),
                    text = %record.message(),
                    bytes,
                    "sent forward record"
                );
            }
            Err(e) => {
                if e.is_connect_failure() {
                    self.metrics.record_connect_failure();
                } else {
                    self.metrics.record_write_failure();
                }
                tracing::warn!(
                    target_addr = %self.config.target,
                    error = %e,
                    "failed to forward record, dropping it"
                );
            }
        }
    }

    /// Send one record on a fresh connection
    ///
    /// Returns the number of bytes written. The connection is closed before
    /// this returns, whatever the outcome.
    pub async fn send(&self, record: &ForwardRecord) -> Result<usize, ForwarderError> {
        let payload = record.to_wire()?;
        let mut stream = self.connect().await?;

        self.write_payload(&mut stream, &payload).await?;

        Ok(payload.len())
    }

    /// Dial the collector
    async fn connect(&self) -> Result<TcpStream, ForwarderError> {
        let target = &self.config.target;

        let dial = TcpStream::connect(target.as_str());
        let stream = match with_timeout(self.config.connection_timeout, dial).await {
            Some(Ok(stream)) => stream,
            Some(Err(e)) => {
                return Err(ForwarderError::ConnectionFailed {
                    target: target.clone(),
                    source: e,
                });
            }
            None => {
                return Err(ForwarderError::ConnectTimeout {
                    target: target.clone(),
                    after: self.config.connection_timeout.unwrap_or_default(),
                });
            }
        };

        if self.config.nodelay
            && let Err(e) = stream.set_nodelay(true)
        {
            tracing::debug!(error = %e, "failed to set TCP_NODELAY, continuing with default buffering");
        }

        tracing::trace!(target_addr = %target, "connected to collector");
        Ok(stream)
    }

    /// Write the payload and close the write half
    async fn write_payload(
        &self,
        stream: &mut TcpStream,
        payload: &[u8],
    ) -> Result<(), ForwarderError> {
        let write = async {
            stream.write_all(payload).await?;
            stream.flush().await
        };

        match with_timeout(self.config.write_timeout, write).await {
            Some(Ok(())) => {}
            Some(Err(e)) => return Err(ForwarderError::WriteFailed(e)),
            None => {
                return Err(ForwarderError::WriteTimeout {
                    after: self.config.write_timeout.unwrap_or_default(),
                });
            }
        }

        // Payload is already written; a failed FIN only affects teardown
        if let Err(e) = stream.shutdown().await {
            tracing::debug!(error = %e, "failed to shut down collector connection");
        }

        Ok(())
    }
}

/// Await `fut`, giving up after `limit` if one is set
///
/// Returns `None` when the limit elapsed.
async fn with_timeout<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = io::Result<T>>,
) -> Option<io::Result<T>> {
    match limit {
        Some(limit) => timeout(limit, fut).await.ok(),
        None => Some(fut.await),
    }
}
