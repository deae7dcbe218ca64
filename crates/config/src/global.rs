//! Process-wide settings

use serde::Deserialize;

/// Settings that are not tied to the source or the forwarder
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Seconds to wait for the listener to stop after a shutdown signal
    /// Default: 5
    pub shutdown_timeout_secs: u64,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            shutdown_timeout_secs: 5,
        }
    }
}
