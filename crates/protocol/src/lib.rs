//! Relay Protocol - Core types that flow through the relay
//!
//! This crate provides the values passed between the inbound and outbound
//! halves of the relay:
//! - `RawMessage` - One trimmed line read from an inbound connection
//! - `Tag` - Fixed label identifying the message source class
//! - `ForwardRecord` - Tagged record derived from one `RawMessage`
//! - `RecordConverter` - Pure mapping from `RawMessage` to `ForwardRecord`
//!
//! # Wire Format
//!
//! Each record is written to the collector as a single JSON object followed
//! by a newline:
//!
//! ```text
//! {"tag": "syslog", "message": "hello world"}\n
//! ```
//!
//! The message text is JSON-escaped, so quotes, backslashes and control
//! characters in the inbound line never break the framing.

mod error;
mod message;
mod record;
mod tag;

pub use error::ProtocolError;
pub use message::RawMessage;
pub use record::{ForwardRecord, RecordConverter};
pub use tag::Tag;

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;

/// Tag attached to records when none is configured
pub const DEFAULT_TAG: &str = "syslog";

/// Line terminator for both inbound framing and outbound records
pub const LINE_TERMINATOR: u8 = b'\n';

// Test modules - only compiled during testing
#[cfg(test)]
mod message_test;
#[cfg(test)]
mod tag_test;
