use std::collections::BTreeMap;

use serde::Serialize;

use super::node::AddressFamily;

/// Link quality of one address family of a path, valid for one cycle only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FamilyMetrics {
    /// Fraction of successful probes, 0..=1.
    pub availability: f64,
    /// Mean latency in microseconds.
    pub latency: f64,
    pub jitter: f64,
    /// Mean packet loss, in percent.
    pub packet_loss: f64,
}

impl FamilyMetrics {
    pub fn new(availability: f64, latency: f64, packet_loss: f64) -> Self {
        Self {
            availability,
            latency,
            jitter: 0.0,
            packet_loss,
        }
    }

    /// Every probe in the window succeeded.
    pub fn fully_available(&self) -> bool {
        self.availability >= 1.0
    }
}

/// Metrics of both families of a path. Always holds both keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MetricsByFamily(BTreeMap<AddressFamily, FamilyMetrics>);

impl MetricsByFamily {
    pub fn new(v4: FamilyMetrics, v6: FamilyMetrics) -> Self {
        Self(BTreeMap::from([
            (AddressFamily::V4, v4),
            (AddressFamily::V6, v6),
        ]))
    }

    /// Metrics for a family; an absent family reads as all zeros.
    pub fn get(&self, family: AddressFamily) -> FamilyMetrics {
        self.0.get(&family).copied().unwrap_or_default()
    }

    pub fn set(&mut self, family: AddressFamily, metrics: FamilyMetrics) {
        self.0.insert(family, metrics);
    }

    /// The same metrics with the two families' values exchanged.
    pub fn swapped(&self) -> Self {
        Self::new(self.get(AddressFamily::V6), self.get(AddressFamily::V4))
    }

    pub fn iter(&self) -> impl Iterator<Item = (AddressFamily, FamilyMetrics)> + '_ {
        self.0.iter().map(|(f, m)| (*f, *m))
    }
}
