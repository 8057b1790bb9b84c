// ── Runtime switch configuration ──
//
// Describes *what* the switch manages and how it talks to the telemetry
// backend. Never touches disk: the binary builds a `SwitchConfig` from the
// config file, environment, and flags, and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use crate::model::NodeId;

pub const DEFAULT_TELEMETRY_URL: &str = "http://127.0.0.1:8428";

/// Configuration for one switch instance.
#[derive(Debug, Clone)]
pub struct SwitchConfig {
    /// Identity of this node in the mesh.
    pub local_id: NodeId,
    /// Base URL of the PromQL backend (e.g., `http://10.1.1.109:8428`).
    pub telemetry_url: Url,
    /// Bearer token for the telemetry backend, if it requires one.
    pub telemetry_token: Option<SecretString>,
    /// Time between reconciliation passes.
    pub interval: Duration,
    /// Timeout of each telemetry HTTP request.
    pub request_timeout: Duration,
    /// Timeout of each `ip` / `sysctl` invocation.
    pub command_timeout: Duration,
    /// Remotes evaluated concurrently within one pass.
    pub max_concurrent_remotes: usize,
    /// Record route and sysctl commands instead of executing them.
    pub dry_run: bool,
    /// Apply the asymmetric routing sysctls before every pass.
    pub sysctl_enabled: bool,
}

impl SwitchConfig {
    /// A config with defaults for everything but the node identity.
    pub fn new(local_id: NodeId, telemetry_url: Url) -> Self {
        Self {
            local_id,
            telemetry_url,
            telemetry_token: None,
            interval: Duration::from_secs(5),
            request_timeout: Duration::from_secs(3),
            command_timeout: Duration::from_secs(3),
            max_concurrent_remotes: 8,
            dry_run: false,
            sysctl_enabled: true,
        }
    }
}
