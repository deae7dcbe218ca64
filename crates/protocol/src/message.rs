//! Inbound message type
//!
//! `RawMessage` holds the text of one line read from a syslog connection.

use std::fmt;

/// One line of text read from an inbound connection
///
/// The line terminator and any surrounding whitespace are removed on
/// construction. Bytes that are not valid UTF-8 are replaced with
/// U+FFFD so that every line can still be forwarded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawMessage(String);

impl RawMessage {
    /// Create a message from text, trimming surrounding whitespace
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().trim().to_string())
    }

    /// Create a message from raw line bytes (terminator may be included)
    pub fn from_line(line: &[u8]) -> Self {
        Self::new(String::from_utf8_lossy(line))
    }

    /// Get the message text
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the message text in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the line carried no text
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consume the message, returning its text
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RawMessage {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
