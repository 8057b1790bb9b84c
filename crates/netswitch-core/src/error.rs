// ── Core error types ──
//
// Only `Inventory` is fatal: without the tunnel list every routing decision
// is meaningless. Everything else is scoped to one remote or one command
// and the pass moves on; the next tick is the retry.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Telemetry ────────────────────────────────────────────────────
    #[error("Failed to fetch metrics for remote {remote}: {source}")]
    Fetch {
        remote: String,
        #[source]
        source: netswitch_api::Error,
    },

    #[error("Invalid node id {value:?}: {reason}")]
    Label { value: String, reason: String },

    // ── Kernel state ─────────────────────────────────────────────────
    #[error("Command `{command}` failed: {reason}")]
    Command { command: String, reason: String },

    #[error("Cannot enumerate tunnel interfaces: {message}")]
    Inventory { message: String },

    #[error("Cannot read route table: {message}")]
    RouteTable { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Whether this error must terminate the process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Inventory { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netswitch_api::Error> for CoreError {
    fn from(err: netswitch_api::Error) -> Self {
        match err {
            netswitch_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid telemetry URL: {e}"),
            },
            netswitch_api::Error::ClientSetup(message) => CoreError::Config { message },
            other => CoreError::Fetch {
                remote: String::new(),
                source: other,
            },
        }
    }
}
