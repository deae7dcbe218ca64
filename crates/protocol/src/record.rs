//! Forward record and converter
//!
//! A `ForwardRecord` is what the relay sends to the collector: the inbound
//! line wrapped together with a fixed tag. `RecordConverter` builds one
//! record per `RawMessage` and never fails.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};

use crate::{LINE_TERMINATOR, RawMessage, Result, Tag};

/// Tagged record ready for serialization
///
/// Field order is significant: `tag` is always written before `message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForwardRecord {
    tag: Tag,
    message: String,
}

impl ForwardRecord {
    /// Create a record, trimming surrounding whitespace from the message
    pub fn new(tag: Tag, message: impl AsRef<str>) -> Self {
        Self {
            tag,
            message: message.as_ref().trim().to_string(),
        }
    }

    /// Get the record tag
    #[inline]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Get the message text
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Encode the record as a single JSON object (no terminator)
    ///
    /// Output uses `": "` and `", "` separators so records look like
    /// `{"tag": "syslog", "message": "hello"}`.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::with_capacity(self.encoded_len_hint());
        let mut serializer = Serializer::with_formatter(&mut buf, RecordFormatter);
        self.serialize(&mut serializer)?;
        Ok(buf)
    }

    /// Encode the record in its wire form: one JSON object plus `\n`
    pub fn to_wire(&self) -> Result<Vec<u8>> {
        let mut buf = self.encode()?;
        buf.push(LINE_TERMINATOR);
        Ok(buf)
    }

    #[inline]
    fn encoded_len_hint(&self) -> usize {
        // {"tag": "", "message": ""}\n
        28 + self.tag.as_str().len() + self.message.len()
    }
}

/// Compact JSON with a space after `:` and `,`
struct RecordFormatter;

impl Formatter for RecordFormatter {
    #[inline]
    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    #[inline]
    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }
}

/// Converts inbound messages into forward records
///
/// Pure and total: the same message always yields the same record, and an
/// empty message yields a record with an empty `message` field.
///
/// # Example
///
/// ```
/// use relay_protocol::{RawMessage, RecordConverter, Tag};
///
/// let converter = RecordConverter::new(Tag::default());
/// let record = converter.convert(RawMessage::new("  hello world \r"));
/// assert_eq!(record.message(), "hello world");
/// assert_eq!(record.tag().as_str(), "syslog");
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordConverter {
    tag: Tag,
}

impl RecordConverter {
    /// Create a converter that stamps every record with `tag`
    pub fn new(tag: impl Into<Tag>) -> Self {
        Self { tag: tag.into() }
    }

    /// Get the tag applied to converted records
    #[inline]
    pub fn tag(&self) -> &Tag {
        &self.tag
    }

    /// Convert one message into one record
    #[inline]
    pub fn convert(&self, message: RawMessage) -> ForwardRecord {
        ForwardRecord::new(self.tag.clone(), message.into_string())
    }
}
