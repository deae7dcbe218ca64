//! Protocol error types
//!
//! Errors that can occur when encoding records for the wire.

use thiserror::Error;

/// Errors that can occur during protocol operations
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Record could not be serialized
    #[error("failed to encode record: {0}")]
    Encode(#[from] serde_json::Error),
}
