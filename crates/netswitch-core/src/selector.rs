//! Path selection.
//!
//! A pure function from per-family metrics to the family that should carry
//! traffic. Rules, first match wins:
//!
//! 1. Unless both families are fully available, the one with strictly
//!    higher availability wins.
//! 2. If both have zero loss (infinite score), strictly lower latency wins.
//! 3. Otherwise strictly higher score wins.
//!
//! Every comparison is strict with IPv4 on the left, so exact ties go to
//! IPv6.

use serde::Serialize;
use strum::Display;

use crate::model::{AddressFamily, FamilyMetrics, MetricsByFamily};

/// Why a family was chosen for a remote.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
pub enum SelectionReason {
    #[strum(serialize = "higher availability")]
    HigherAvailability,
    #[strum(serialize = "lower latency")]
    LowerLatency,
    #[strum(serialize = "higher score")]
    HigherScore,
    /// The remote only has one tunnel.
    #[strum(serialize = "only configured family")]
    SingleFamily,
    /// First pass after startup; telemetry is not consulted.
    #[strum(serialize = "cold start")]
    ColdStart,
}

/// A family choice with its justification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub family: AddressFamily,
    pub reason: SelectionReason,
}

impl Selection {
    pub fn new(family: AddressFamily, reason: SelectionReason) -> Self {
        Self { family, reason }
    }
}

/// Quality score of a family: `1 / (latency_s * sqrt(loss_fraction))`.
///
/// Zero latency means "no data" and scores 0. Zero loss with data scores
/// `+inf`.
pub fn score(metrics: &FamilyMetrics) -> f64 {
    if metrics.latency == 0.0 {
        return 0.0;
    }
    1.0 / ((metrics.latency / 1e6) * (metrics.packet_loss / 100.0).sqrt())
}

fn is_pos_infinite(x: f64) -> bool {
    x.is_infinite() && x.is_sign_positive()
}

/// Pick the preferred family for a dual-stack remote.
pub fn choose(metrics: &MetricsByFamily) -> Selection {
    let v4 = metrics.get(AddressFamily::V4);
    let v6 = metrics.get(AddressFamily::V6);

    let pick = |v4_wins: bool, reason| {
        let family = if v4_wins {
            AddressFamily::V4
        } else {
            AddressFamily::V6
        };
        Selection::new(family, reason)
    };

    if !(v4.fully_available() && v6.fully_available()) {
        return pick(
            v4.availability > v6.availability,
            SelectionReason::HigherAvailability,
        );
    }

    let (s4, s6) = (score(&v4), score(&v6));
    if is_pos_infinite(s4) && is_pos_infinite(s6) {
        return pick(v4.latency < v6.latency, SelectionReason::LowerLatency);
    }

    pick(s4 > s6, SelectionReason::HigherScore)
}
