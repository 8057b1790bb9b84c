//! Path selection and route reconciliation for a dual-stack WireGuard mesh.
//!
//! Every node keeps one tunnel per address family to each remote peer
//! (`wg<local>.<remote>_v4` / `_v6`). This crate decides which family
//! should carry each remote's traffic and keeps the kernel's routes for
//! `10.201.<remote>.0/24` and `fdac:c9:<remote>::/64` pointed at it:
//!
//! - **[`Switch`]**: The scheduler. [`run()`](Switch::run) fires a
//!   reconciliation pass every interval until cancelled;
//!   [`run_pass()`](Switch::run_pass) runs exactly one. The very first pass
//!   forces IPv4 for every dual-stack remote.
//!
//! - **[`selector`]**: Pure scoring of per-family availability, latency and
//!   loss into a [`Selection`].
//!
//! - **[`Reconciler`]**: Diffs the desired tunnel against a fresh route
//!   table snapshot and issues `ip route add|change` commands.
//!
//! - **Ports** ([`system`], [`MetricsSource`]): Interface inventory, route
//!   table, command execution and telemetry sit behind async traits with
//!   production adapters for sysfs, `/proc/net/route`, child processes and
//!   the `netswitch-api` HTTP client.

pub mod config;
pub mod error;
pub mod model;
pub mod reconcile;
pub mod report;
pub mod selector;
pub mod switch;
pub mod system;
pub mod telemetry;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{DEFAULT_TELEMETRY_URL, SwitchConfig};
pub use error::CoreError;
pub use reconcile::{ReconcileOutcome, Reconciler, RoutePlan};
pub use report::{PassReport, RemoteDecision, RemoteReport};
pub use selector::{Selection, SelectionReason};
pub use switch::{Inspection, Phase, Switch};
pub use telemetry::MetricsSource;

pub use model::{
    AddressFamily, FamilyMetrics, InterfaceRecord, MetricsByFamily, NodeId, PathLabel,
    RouteAction, RouteEntry, RouteTarget, TUNNEL_PREFIX,
};
