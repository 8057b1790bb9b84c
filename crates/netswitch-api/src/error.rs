use thiserror::Error;

/// Top-level error type for the `netswitch-api` crate.
///
/// Covers every failure mode of a telemetry fetch: transport, HTTP status,
/// query envelope, and sample parsing. `netswitch-core` folds these into
/// its own `CoreError::Fetch` so a failed fetch only ever skips one remote.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Failed to construct the underlying HTTP client.
    #[error("HTTP client setup failed: {0}")]
    ClientSetup(String),

    // ── Query API ───────────────────────────────────────────────────
    /// Backend answered with a non-200 status.
    #[error("Telemetry backend returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Backend answered 200 but the envelope's `status` was not `success`.
    #[error("Telemetry query failed with status '{status}'")]
    QueryFailed { status: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// A sample value was missing or not a numeric string.
    #[error("Error parsing {field}: {value:?} is not a number")]
    Parse { field: &'static str, value: String },
}

impl Error {
    /// Returns `true` if this is a transient error that a later cycle may not hit.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the backend responded but the payload was malformed.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Deserialization { .. } | Self::Parse { .. })
    }
}
