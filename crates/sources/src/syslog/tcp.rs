//! Syslog TCP Source
//!
//! Syslog receiver over TCP with line-based framing. Every line becomes one
//! `ForwardRecord` that is delivered to the collector before the next line
//! is read.
//!
//! # Framing
//!
//! Newline-delimited messages (non-transparent framing). Each message ends
//! with LF or CRLF. Messages are forwarded raw; no syslog header parsing.
//!
//! # Design
//!
//! - **One task per connection** - spawned by the accept loop, never awaited
//! - **Admission limit** - at most `max_connections` handlers run at once;
//!   further clients wait in the kernel backlog until a slot frees up
//! - **Sequential per connection** - read, convert, deliver, repeat
//! - **Isolated failures** - a failed delivery drops one record, a failed
//!   read ends one connection, a failed accept is logged and skipped
//!
//! # Example
//!
//! ```ignore
//! let forwarder = Arc::new(ForwardSender::new(ForwarderConfig::new("collector:24224")));
//! let source = SyslogTcpSource::new(
//!     SyslogTcpSourceConfig::default(),
//!     RecordConverter::default(),
//!     forwarder,
//! );
//! source.run(CancellationToken::new()).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use relay_protocol::RecordConverter;
use relay_sinks::ForwardSender;
use socket2::{SockRef, TcpKeepalive};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use super::line_reader::{DEFAULT_READ_CAPACITY, LineReader, ReadEnd, ReadLine};
use crate::common::{SourceMetrics, is_connection_reset};

// =============================================================================
// Constants
// =============================================================================

/// Default syslog-over-TCP port (unprivileged)
const DEFAULT_PORT: u16 = 5140;

/// Default cap on concurrently served connections
const DEFAULT_MAX_CONNECTIONS: usize = 1024;

/// Default kernel receive buffer (256KB)
const DEFAULT_SOCKET_BUFFER_SIZE: usize = 256 * 1024;

/// Default keepalive interval (30s)
const DEFAULT_KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

// =============================================================================
// Configuration
// =============================================================================

/// Syslog TCP source configuration
#[derive(Debug, Clone)]
pub struct SyslogTcpSourceConfig {
    /// Source identifier for logging
    pub id: String,

    /// Bind address (e.g., "0.0.0.0")
    pub address: String,

    /// Listen port (0 = let the OS pick)
    pub port: u16,

    /// Read buffer size per connection
    pub buffer_size: usize,

    /// Kernel receive buffer (SO_RCVBUF) for accepted sockets (0 = OS default)
    pub socket_buffer_size: usize,

    /// Maximum concurrently served connections
    pub max_connections: usize,

    /// Lines longer than this are discarded (`None` = unbounded)
    pub max_line_length: Option<usize>,

    /// Close connections idle for this long (`None` = never)
    pub idle_timeout: Option<Duration>,

    /// TCP nodelay (disable Nagle's algorithm)
    pub nodelay: bool,
}

impl Default for SyslogTcpSourceConfig {
    fn default() -> Self {
        Self {
            id: "syslog_tcp".into(),
            address: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            buffer_size: DEFAULT_READ_CAPACITY,
            socket_buffer_size: DEFAULT_SOCKET_BUFFER_SIZE,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            max_line_length: None,
            idle_timeout: None,
            nodelay: true,
        }
    }
}

impl SyslogTcpSourceConfig {
    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

// =============================================================================
// Metrics
// =============================================================================

/// Syslog TCP source metrics
#[derive(Debug, Default)]
pub struct SyslogTcpSourceMetrics {
    /// Base source metrics
    pub base: SourceMetrics,

    /// Complete lines read from connections
    pub lines_read: AtomicU64,

    /// Lines discarded for exceeding `max_line_length`
    pub lines_oversized: AtomicU64,

    /// Trailing fragments discarded when a peer closed mid-line
    pub partial_lines: AtomicU64,
}

impl SyslogTcpSourceMetrics {
    /// Create new metrics instance
    pub const fn new() -> Self {
        Self {
            base: SourceMetrics::new(),
            lines_read: AtomicU64::new(0),
            lines_oversized: AtomicU64::new(0),
            partial_lines: AtomicU64::new(0),
        }
    }

    /// Record a line read
    #[inline]
    pub fn line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an oversized line
    #[inline]
    pub fn line_oversized(&self) {
        self.lines_oversized.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a discarded trailing fragment
    #[inline]
    pub fn partial_line(&self) {
        self.partial_lines.fetch_add(1, Ordering::Relaxed);
    }

    /// Get extended metrics snapshot
    pub fn snapshot(&self) -> SyslogTcpMetricsSnapshot {
        let base = self.base.snapshot();
        SyslogTcpMetricsSnapshot {
            connections_active: base.connections_active,
            connections_total: base.connections_total,
            messages_received: base.messages_received,
            bytes_received: base.bytes_received,
            errors: base.errors,
            lines_read: self.lines_read.load(Ordering::Relaxed),
            lines_oversized: self.lines_oversized.load(Ordering::Relaxed),
            partial_lines: self.partial_lines.load(Ordering::Relaxed),
        }
    }
}

/// Extended metrics snapshot for Syslog TCP source
#[derive(Debug, Clone, Copy)]
pub struct SyslogTcpMetricsSnapshot {
    pub connections_active: u64,
    pub connections_total: u64,
    pub messages_received: u64,
    pub bytes_received: u64,
    pub errors: u64,
    pub lines_read: u64,
    pub lines_oversized: u64,
    pub partial_lines: u64,
}

// =============================================================================
// Errors
// =============================================================================

/// Syslog TCP source errors
#[derive(Debug, thiserror::Error)]
pub enum SyslogTcpSourceError {
    /// Failed to bind to address
    #[error("failed to bind to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Source Implementation
// =============================================================================

/// Syslog TCP source
///
/// Accepts TCP connections and relays each line they carry to the
/// collector through a shared `ForwardSender`.
pub struct SyslogTcpSource {
    /// Configuration
    config: SyslogTcpSourceConfig,

    /// Line to record mapping
    converter: RecordConverter,

    /// Outbound delivery, shared by every connection task
    forwarder: Arc<ForwardSender>,

    /// Metrics
    metrics: Arc<SyslogTcpSourceMetrics>,

    /// Running flag
    running: Arc<AtomicBool>,

    /// One permit per active connection
    admission: Arc<Semaphore>,

    /// Cancelled by `stop()`
    shutdown: CancellationToken,
}

impl SyslogTcpSource {
    /// Create a new Syslog TCP source
    pub fn new(
        config: SyslogTcpSourceConfig,
        converter: RecordConverter,
        forwarder: Arc<ForwardSender>,
    ) -> Self {
        let permits = config.max_connections.clamp(1, Semaphore::MAX_PERMITS);
        let admission = Arc::new(Semaphore::new(permits));
        Self {
            config,
            converter,
            forwarder,
            metrics: Arc::new(SyslogTcpSourceMetrics::new()),
            running: Arc::new(AtomicBool::new(false)),
            admission,
            shutdown: CancellationToken::new(),
        }
    }

    /// Get metrics reference
    pub fn metrics(&self) -> &Arc<SyslogTcpSourceMetrics> {
        &self.metrics
    }

    /// Check if source is running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Stop the source
    ///
    /// Wakes the accept loop and closes open connections, same as
    /// cancelling the token passed to `run`. A stopped source cannot be
    /// run again.
    pub fn stop(&self) {
        self.shutdown.cancel();
    }

    /// Bind the configured listen address
    pub async fn bind(&self) -> Result<TcpListener, SyslogTcpSourceError> {
        let bind_addr = self.config.bind_address();
        TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| SyslogTcpSourceError::Bind {
                address: bind_addr,
                source: e,
            })
    }

    /// Run the source (main entry point)
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), SyslogTcpSourceError> {
        let listener = self.bind().await?;
        self.run_with_listener(listener, cancel).await
    }

    /// Run the accept loop on an already bound listener
    pub async fn run_with_listener(
        &self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), SyslogTcpSourceError> {
        let local_addr = listener.local_addr()?;

        self.running.store(true, Ordering::Relaxed);

        tracing::info!(
            source_id = %self.config.id,
            address = %local_addr,
            collector = %self.forwarder.target(),
            tag = %self.converter.tag(),
            max_connections = self.config.max_connections,
            "listening for syslog messages"
        );

        self.accept_loop(listener, cancel).await
    }

    /// Accept loop - handles incoming connections
    async fn accept_loop(
        &self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), SyslogTcpSourceError> {
        // Handlers watch this; it is cancelled on every exit path
        let connections = cancel.child_token();

        loop {
            if self.admission.available_permits() == 0 {
                tracing::debug!(
                    source_id = %self.config.id,
                    max_connections = self.config.max_connections,
                    "connection limit reached, waiting for a slot"
                );
            }

            let permit = tokio::select! {
                _ = connections.cancelled() => break,
                _ = self.shutdown.cancelled() => break,
                permit = Arc::clone(&self.admission).acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            tokio::select! {
                _ = connections.cancelled() => break,
                _ = self.shutdown.cancelled() => break,
                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((stream, peer_addr)) => {
                            self.metrics.base.connection_opened();
                            self.configure_socket(&stream);

                            let handler = ConnectionHandler {
                                config: self.config.clone(),
                                converter: self.converter.clone(),
                                forwarder: Arc::clone(&self.forwarder),
                                metrics: Arc::clone(&self.metrics),
                                cancel: connections.clone(),
                                peer_addr,
                            };

                            tokio::spawn(async move {
                                let _permit = permit;
                                handler.handle(stream).await;
                            });
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "syslog TCP accept error");
                            self.metrics.base.error();
                        }
                    }
                }
            }
        }

        connections.cancel();
        self.running.store(false, Ordering::Relaxed);
        tracing::info!(
            source_id = %self.config.id,
            "syslog TCP source stopped"
        );

        Ok(())
    }

    /// Apply nodelay, receive buffer and keepalive to an accepted socket
    ///
    /// Failures are logged and the connection is served with OS defaults.
    fn configure_socket(&self, stream: &TcpStream) {
        if self.config.nodelay
            && let Err(e) = stream.set_nodelay(true)
        {
            tracing::warn!(error = %e, "failed to set TCP_NODELAY");
        }

        let socket = SockRef::from(stream);

        if self.config.socket_buffer_size > 0
            && let Err(e) = socket.set_recv_buffer_size(self.config.socket_buffer_size)
        {
            tracing::warn!(error = %e, "failed to set SO_RCVBUF");
        }

        let keepalive = TcpKeepalive::new().with_time(DEFAULT_KEEPALIVE_INTERVAL);
        if let Err(e) = socket.set_tcp_keepalive(&keepalive) {
            tracing::warn!(error = %e, "failed to set TCP keepalive");
        }
    }
}

// =============================================================================
// Connection Handler
// =============================================================================

/// How a connection's read loop ended
#[derive(Debug)]
enum SessionEnd {
    Read(ReadEnd),
    IdleTimeout,
    Shutdown,
}

/// Handles a single TCP connection
struct ConnectionHandler {
    config: SyslogTcpSourceConfig,
    converter: RecordConverter,
    forwarder: Arc<ForwardSender>,
    metrics: Arc<SyslogTcpSourceMetrics>,
    cancel: CancellationToken,
    peer_addr: SocketAddr,
}

impl ConnectionHandler {
    /// Serve the connection until its stream ends
    ///
    /// The socket is closed when this returns.
    async fn handle(self, stream: TcpStream) {
        tracing::debug!(peer = %self.peer_addr, "syslog connection opened");

        let mut reader = LineReader::with_capacity(self.config.buffer_size, stream)
            .with_max_line_length(self.config.max_line_length);

        let end = loop {
            let read = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break SessionEnd::Shutdown,
                read = read_with_idle_timeout(&mut reader, self.config.idle_timeout) => read,
            };

            match read {
                Some(Ok(ReadLine::Line { message, bytes })) => {
                    self.metrics.line_read();
                    self.metrics.base.message_received(bytes as u64);
                    tracing::debug!(
                        peer = %self.peer_addr,
                        text = %message,
                        "received syslog message"
                    );

                    let record = self.converter.convert(message);
                    self.forwarder.deliver(&record).await;
                }
                Some(Ok(ReadLine::TooLong { length })) => {
                    self.metrics.line_oversized();
                    tracing::debug!(
                        peer = %self.peer_addr,
                        length,
                        max = ?self.config.max_line_length,
                        "syslog message too large, dropped"
                    );
                }
                Some(Err(end)) => break SessionEnd::Read(end),
                None => break SessionEnd::IdleTimeout,
            }
        };

        self.log_session_end(&end);
        self.metrics.base.connection_closed();
    }

    fn log_session_end(&self, end: &SessionEnd) {
        match end {
            SessionEnd::Read(ReadEnd::Eof) => {
                tracing::debug!(peer = %self.peer_addr, "syslog connection closed by peer");
            }
            SessionEnd::Read(ReadEnd::Truncated { pending }) => {
                self.metrics.partial_line();
                tracing::debug!(
                    peer = %self.peer_addr,
                    discarded = pending,
                    "syslog connection closed mid-line, partial message discarded"
                );
            }
            SessionEnd::Read(ReadEnd::Io(e)) if is_connection_reset(e) => {
                tracing::debug!(peer = %self.peer_addr, error = %e, "syslog connection reset");
            }
            SessionEnd::Read(ReadEnd::Io(e)) => {
                self.metrics.base.error();
                tracing::warn!(peer = %self.peer_addr, error = %e, "syslog TCP read error");
            }
            SessionEnd::IdleTimeout => {
                tracing::debug!(
                    peer = %self.peer_addr,
                    timeout = ?self.config.idle_timeout,
                    "syslog connection idle timeout"
                );
            }
            SessionEnd::Shutdown => {
                tracing::debug!(peer = %self.peer_addr, "syslog connection closed for shutdown");
            }
        }
    }
}

/// Read the next line, giving up after `limit` of silence
///
/// Returns `None` when the limit elapsed.
async fn read_with_idle_timeout(
    reader: &mut LineReader<TcpStream>,
    limit: Option<Duration>,
) -> Option<Result<ReadLine, ReadEnd>> {
    match limit {
        Some(limit) => timeout(limit, reader.next_message()).await.ok(),
        None => Some(reader.next_message().await),
    }
}

#[cfg(test)]
#[path = "tcp_test.rs"]
mod tcp_test;
