//! Relay - Sinks
//!
//! Outbound delivery for the relay.
//!
//! # Architecture
//!
//! Connection tasks hand each converted record straight to the sink and wait
//! for the delivery to finish before reading their next line:
//!
//! ```text
//! [Connection Task] --&ForwardRecord--> [ForwardSender] --TCP--> [Collector]
//! ```
//!
//! # Available Sinks
//!
//! | Sink | Purpose | Connection |
//! |------|---------|------------|
//! | `forwarder` | JSON lines to a remote collector | New per record |

/// Forwarder sink - one TCP connection per record
pub mod forwarder;

pub use forwarder::{
    ForwardSender, ForwarderConfig, ForwarderError, ForwarderMetrics, MetricsSnapshot,
};
