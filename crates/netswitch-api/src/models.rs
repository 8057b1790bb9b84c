// Wire types for the PromQL instant-query API.
//
// The backend returns `{status, data: {result: [{metric, value: [ts, "num"]}]}}`.
// Sample values arrive as strings and are only converted to `f64` when read.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// `version` label values the backend tags each series with.
pub const KNOWN_VERSIONS: [&str; 2] = ["4", "6"];

/// Envelope of `GET /api/v1/query`.
#[derive(Debug, Deserialize)]
pub struct QueryResponse {
    pub status: String,
    #[serde(default)]
    pub data: QueryData,
    /// Error description on `status: "error"` responses.
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryData {
    #[serde(default)]
    pub result: Vec<Sample>,
}

/// One series of an instant vector.
#[derive(Debug, Clone, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub metric: SampleLabels,
    /// `[unix_timestamp, "value"]`
    #[serde(default)]
    pub value: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleLabels {
    pub version: Option<String>,
}

impl Sample {
    /// The `version` label of this series, if present.
    pub fn version(&self) -> Option<&str> {
        self.metric.version.as_deref()
    }

    /// Parse the sample's value (second tuple element) as `f64`.
    ///
    /// `field` names the metric being parsed, for the error message only.
    pub fn parse_value(&self, field: &'static str) -> Result<f64, Error> {
        let raw = self.value.get(1).ok_or_else(|| Error::Parse {
            field,
            value: "<missing sample>".into(),
        })?;
        let text = raw.as_str().ok_or_else(|| Error::Parse {
            field,
            value: raw.to_string(),
        })?;
        text.trim().parse::<f64>().map_err(|_| Error::Parse {
            field,
            value: text.to_owned(),
        })
    }
}

/// Aggregated link quality for one address family of a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LinkMetrics {
    /// Fraction of successful probes in the window, 0..=1.
    pub availability: f64,
    /// Mean round-trip latency in microseconds.
    pub latency: f64,
    /// Not queried yet; always zero.
    pub jitter: f64,
    /// Mean packet loss, in percent.
    pub packet_loss: f64,
}

/// Per-version link metrics for one path, keyed by the `version` label.
pub type PathMetrics = BTreeMap<String, LinkMetrics>;

/// A `PathMetrics` with every known version present and zeroed.
pub fn empty_path_metrics() -> PathMetrics {
    KNOWN_VERSIONS
        .iter()
        .map(|v| ((*v).to_owned(), LinkMetrics::default()))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample(value: serde_json::Value) -> Sample {
        serde_json::from_value(json!({ "metric": { "version": "4" }, "value": value })).unwrap()
    }

    #[test]
    fn parses_string_value() {
        let s = sample(json!([1_700_000_000.5, "1234.5"]));
        assert_eq!(s.version(), Some("4"));
        assert_eq!(s.parse_value("latency").unwrap(), 1234.5);
    }

    #[test]
    fn rejects_numeric_value() {
        let s = sample(json!([1_700_000_000, 12]));
        assert!(matches!(
            s.parse_value("latency"),
            Err(Error::Parse { field: "latency", .. })
        ));
    }

    #[test]
    fn rejects_garbage_string() {
        let s = sample(json!([1_700_000_000, "fast"]));
        let err = s.parse_value("packet loss").unwrap_err();
        assert_eq!(err.to_string(), "Error parsing packet loss: \"fast\" is not a number");
    }

    #[test]
    fn rejects_missing_sample() {
        let s = sample(json!([1_700_000_000]));
        assert!(s.parse_value("availability").unwrap_err().is_parse());
    }

    #[test]
    fn empty_path_metrics_has_both_versions() {
        let m = empty_path_metrics();
        assert_eq!(m.len(), 2);
        assert_eq!(m["4"], LinkMetrics::default());
        assert_eq!(m["6"], LinkMetrics::default());
    }

    #[test]
    fn error_envelope_without_data_deserializes() {
        let resp: QueryResponse = serde_json::from_value(json!({
            "status": "error",
            "errorType": "bad_data",
            "error": "parse error at char 4"
        }))
        .unwrap();
        assert_eq!(resp.status, "error");
        assert!(resp.data.result.is_empty());
        assert_eq!(resp.error.as_deref(), Some("parse error at char 4"));
    }
}
