//! Record tag type
//!
//! `Tag` labels every forwarded record with the class of its source.

use std::fmt;

use serde::Serialize;

use crate::DEFAULT_TAG;

/// Fixed label attached to every `ForwardRecord`
///
/// The collector uses the tag to route records. The relay never derives it
/// from message content; it is set once at construction.
///
/// # Example
///
/// ```
/// use relay_protocol::Tag;
///
/// let tag = Tag::new("syslog");
/// assert_eq!(tag.as_str(), "syslog");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a new tag
    #[inline]
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Get the tag as a string slice
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Tag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Tag {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Default for Tag {
    fn default() -> Self {
        Self::new(DEFAULT_TAG)
    }
}
