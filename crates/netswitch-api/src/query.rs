// ── PromQL builders ──
//
// Every query averages over the same trailing window and is grouped by the
// `version` label so one round-trip covers both address families.

use crate::models::LinkMetrics;

/// Trailing window every path query averages over.
pub const WINDOW: &str = "5m";

/// The aggregate queries issued for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathQuery {
    /// Mean latency (µs) from `network_latency_duration`.
    Latency,
    /// Mean of the probe loss and bandwidth-test loss series, in percent.
    PacketLoss,
    /// Mean probe success ratio from `network_latency_status`.
    Availability,
}

impl PathQuery {
    /// Issue order within one fetch.
    pub const ALL: [Self; 3] = [Self::Latency, Self::PacketLoss, Self::Availability];

    /// Render the PromQL expression for the given path label.
    pub fn expr(self, path: &str) -> String {
        match self {
            Self::Latency => format!(
                r#"avg(avg_over_time(network_latency_duration{{path=~"{path}"}}[{WINDOW}])) by (version)"#
            ),
            Self::PacketLoss => format!(
                r#"avg(avg_over_time(network_latency_loss{{path=~"{path}"}}[{WINDOW}]),avg_over_time(network_bandwidth_packet_loss{{path=~"{path}"}}[{WINDOW}])) by (version)"#
            ),
            Self::Availability => format!(
                r#"avg(avg_over_time(network_latency_status{{path=~"{path}"}}[{WINDOW}])) by (version)"#
            ),
        }
    }

    /// Human-readable field name used in parse errors.
    pub fn field(self) -> &'static str {
        match self {
            Self::Latency => "latency",
            Self::PacketLoss => "packet loss",
            Self::Availability => "availability",
        }
    }

    /// Store a parsed sample into the matching field.
    pub(crate) fn apply(self, metrics: &mut LinkMetrics, value: f64) {
        match self {
            Self::Latency => metrics.latency = value,
            Self::PacketLoss => metrics.packet_loss = value,
            Self::Availability => metrics.availability = value,
        }
    }
}
