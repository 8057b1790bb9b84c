//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use netswitch_config::ConfigError;
use netswitch_core::CoreError;

pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Telemetry ────────────────────────────────────────────────────
    #[error("Could not fetch metrics for remote {remote}")]
    #[diagnostic(
        code(netswitch::fetch_failed),
        help(
            "Check that the telemetry backend is reachable.\n\
             Override it with --telemetry-url or switch.telemetry_url."
        )
    )]
    FetchFailed {
        remote: String,
        #[source]
        source: netswitch_core::CoreError,
    },

    // ── Kernel ───────────────────────────────────────────────────────
    #[error("Cannot enumerate tunnel interfaces: {message}")]
    #[diagnostic(
        code(netswitch::inventory),
        help("netswitch reads /sys/class/net; make sure it is mounted and readable.")
    )]
    Inventory { message: String },

    #[error("Cannot read route table: {message}")]
    #[diagnostic(
        code(netswitch::route_table),
        help("netswitch reads /proc/net/route; run it on the mesh host itself.")
    )]
    RouteTable { message: String },

    #[error("Command `{command}` failed: {reason}")]
    #[diagnostic(
        code(netswitch::command_failed),
        help("Route changes need CAP_NET_ADMIN. Try --dry-run to preview them.")
    )]
    CommandFailed { command: String, reason: String },

    #[error("Pass finished with {count} error(s)")]
    #[diagnostic(
        code(netswitch::pass_errors),
        help("Rerun with -v for per-remote details.")
    )]
    PassErrors { count: usize },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netswitch::validation))]
    Validation { field: String, reason: String },

    #[error("Local node id is unknown: {reason}")]
    #[diagnostic(
        code(netswitch::local_id),
        help("Pass --local-id, set NETSWITCH_LOCAL_ID, or set switch.local_id in the config file.")
    )]
    LocalIdUnknown { reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Config file already exists at {path}")]
    #[diagnostic(
        code(netswitch::config_exists),
        help("Use --force to overwrite it.")
    )]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(
        code(netswitch::config),
        help("Inspect the effective configuration with: netswitch config show")
    )]
    Config(#[from] ConfigError),

    // ── Serialization ────────────────────────────────────────────────
    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(netswitch::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(netswitch::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::FetchFailed { .. } => exit_code::CONNECTION,
            Self::Validation { .. } | Self::LocalIdUnknown { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            Self::CommandFailed { .. } | Self::Inventory { .. } | Self::RouteTable { .. } => {
                exit_code::PERMISSION
            }
            Self::ConfigExists { .. } => exit_code::CONFLICT,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Fetch { ref remote, .. } => CliError::FetchFailed {
                remote: remote.clone(),
                source: err,
            },
            CoreError::Label { value, reason } => CliError::Validation {
                field: "node id".into(),
                reason: format!("{value:?}: {reason}"),
            },
            CoreError::Command { command, reason } => CliError::CommandFailed { command, reason },
            CoreError::Inventory { message } => CliError::Inventory { message },
            CoreError::RouteTable { message } => CliError::RouteTable { message },
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_error_class() {
        let fatal = CliError::from(CoreError::Inventory {
            message: "denied".into(),
        });
        assert_eq!(fatal.exit_code(), exit_code::PERMISSION);

        let label = CliError::from(CoreError::Label {
            value: "x".into(),
            reason: "invalid digit found in string".into(),
        });
        assert_eq!(label.exit_code(), exit_code::USAGE);

        let exists = CliError::ConfigExists {
            path: "/etc/netswitch.toml".into(),
        };
        assert_eq!(exists.exit_code(), exit_code::CONFLICT);
        assert_eq!(
            CliError::PassErrors { count: 2 }.exit_code(),
            exit_code::GENERAL
        );
    }
}
