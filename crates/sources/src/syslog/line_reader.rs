//! Line framing for syslog over TCP
//!
//! TCP syslog here uses non-transparent framing: every message ends with
//! `\n` (optionally preceded by `\r`). `LineReader` turns a byte stream into
//! a pull-based sequence of `RawMessage` values.
//!
//! The sequence is lazy and non-restartable. Once the stream ends or fails
//! the reader reports that once, then keeps answering `ReadEnd::Eof`.

use std::io;

use relay_protocol::{LINE_TERMINATOR, RawMessage};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};

/// Default read buffer capacity (8KB)
pub const DEFAULT_READ_CAPACITY: usize = 8 * 1024;

/// One framed unit read from the stream
#[derive(Debug)]
pub enum ReadLine {
    /// A complete line, trimmed
    Line {
        message: RawMessage,
        /// Bytes consumed from the stream, terminator included
        bytes: usize,
    },
    /// A line over the configured limit; consumed and discarded
    TooLong {
        /// Line length without the terminator
        length: usize,
    },
}

/// Why the sequence of lines ended
#[derive(Debug, thiserror::Error)]
pub enum ReadEnd {
    /// Stream closed on a line boundary
    #[error("end of stream")]
    Eof,

    /// Stream closed in the middle of a line
    #[error("stream ended inside a line ({pending} bytes discarded)")]
    Truncated { pending: usize },

    /// Underlying read failed
    #[error("read error: {0}")]
    Io(#[from] io::Error),
}

/// Newline-delimited reader over an async byte stream
pub struct LineReader<R> {
    reader: BufReader<R>,
    line_buf: Vec<u8>,
    max_line_length: Option<usize>,
    finished: bool,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Create a reader with the default buffer capacity and no line limit
    pub fn new(inner: R) -> Self {
        Self::with_capacity(DEFAULT_READ_CAPACITY, inner)
    }

    /// Create a reader with a specific buffer capacity
    pub fn with_capacity(capacity: usize, inner: R) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, inner),
            line_buf: Vec::new(),
            max_line_length: None,
            finished: false,
        }
    }

    /// Discard lines longer than `limit` bytes (`None` = unbounded)
    ///
    /// The terminator, including a `\r` before it, does not count.
    #[must_use]
    pub fn with_max_line_length(mut self, limit: Option<usize>) -> Self {
        self.max_line_length = limit;
        self
    }

    /// Whether the sequence has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Read the next line
    ///
    /// Blocks until a full line is available, the stream ends, or the read
    /// fails. A trailing fragment without a terminator is never returned as
    /// a line; it ends the sequence as `ReadEnd::Truncated`.
    pub async fn next_message(&mut self) -> Result<ReadLine, ReadEnd> {
        if self.finished {
            return Err(ReadEnd::Eof);
        }

        let result = self.read_frame().await;
        if result.is_err() {
            self.finished = true;
            self.line_buf = Vec::new();
        }
        result
    }

    async fn read_frame(&mut self) -> Result<ReadLine, ReadEnd> {
        self.line_buf.clear();

        let mut total_bytes = 0;
        let mut exceeded_limit = false;

        loop {
            let available = self.reader.fill_buf().await?;

            if available.is_empty() {
                return Err(if total_bytes == 0 {
                    ReadEnd::Eof
                } else {
                    ReadEnd::Truncated {
                        pending: total_bytes,
                    }
                });
            }

            let newline_pos = available.iter().position(|&b| b == LINE_TERMINATOR);
            let (bytes_to_consume, done) = match newline_pos {
                Some(pos) => (pos + 1, true),
                None => (available.len(), false),
            };

            if !exceeded_limit {
                // A `\r` right before the terminator is not content
                let chunk = &available[..bytes_to_consume - usize::from(done)];
                let last_byte = chunk.last().or(self.line_buf.last());
                let content_len = self.line_buf.len() + chunk.len()
                    - usize::from(last_byte == Some(&b'\r'));
                match self.max_line_length {
                    Some(limit) if content_len > limit => {
                        exceeded_limit = true;
                        self.line_buf.clear();
                    }
                    _ => self
                        .line_buf
                        .extend_from_slice(&available[..bytes_to_consume]),
                }
            }

            total_bytes += bytes_to_consume;
            self.reader.consume(bytes_to_consume);

            if done {
                break;
            }
        }

        if exceeded_limit {
            return Ok(ReadLine::TooLong {
                length: total_bytes - 1,
            });
        }

        Ok(ReadLine::Line {
            message: RawMessage::from_line(&self.line_buf),
            bytes: total_bytes,
        })
    }
}

#[cfg(test)]
#[path = "line_reader_test.rs"]
mod line_reader_test;
