// ── Telemetry source ──
//
// Bridges the API crate's raw `PathMetrics` (keyed by `version` label) into
// the domain `MetricsByFamily`. Nothing is cached: each call is a fresh
// round-trip to the backend.

use async_trait::async_trait;
use netswitch_api::{LinkMetrics, MetricsClient, PathMetrics};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{AddressFamily, FamilyMetrics, MetricsByFamily, NodeId, PathLabel};

/// Port supplying link metrics for one local–remote path.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    async fn fetch_metrics(&self, local: NodeId, remote: NodeId)
    -> Result<MetricsByFamily, CoreError>;
}

#[async_trait]
impl MetricsSource for MetricsClient {
    async fn fetch_metrics(
        &self,
        local: NodeId,
        remote: NodeId,
    ) -> Result<MetricsByFamily, CoreError> {
        let label = PathLabel::new(local, remote);
        debug!(path = %label, "fetching path metrics");
        let raw = self
            .fetch_path_metrics(&label.to_string())
            .await
            .map_err(|source| CoreError::Fetch {
                remote: remote.to_string(),
                source,
            })?;
        Ok(metrics_by_family(&raw))
    }
}

impl From<LinkMetrics> for FamilyMetrics {
    fn from(m: LinkMetrics) -> Self {
        Self {
            availability: m.availability,
            latency: m.latency,
            jitter: m.jitter,
            packet_loss: m.packet_loss,
        }
    }
}

/// Convert raw path metrics; both families are always present.
pub fn metrics_by_family(raw: &PathMetrics) -> MetricsByFamily {
    let mut out = MetricsByFamily::new(FamilyMetrics::default(), FamilyMetrics::default());
    for (version, link) in raw {
        if let Ok(family) = version.parse::<AddressFamily>() {
            out.set(family, (*link).into());
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn converts_known_versions_and_zero_fills() {
        let mut raw = PathMetrics::new();
        raw.insert(
            "6".into(),
            LinkMetrics {
                availability: 1.0,
                latency: 900.0,
                jitter: 0.0,
                packet_loss: 2.0,
            },
        );
        raw.insert("x".into(), LinkMetrics::default());

        let m = metrics_by_family(&raw);
        assert_eq!(m.get(AddressFamily::V6).latency, 900.0);
        assert_eq!(m.get(AddressFamily::V4), FamilyMetrics::default());
        assert_eq!(m.iter().count(), 2);
    }
}
