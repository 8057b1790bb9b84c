// Telemetry HTTP client
//
// Wraps `reqwest::Client` with PromQL instant-query URL construction and
// envelope unwrapping. A fetch is all-or-nothing: any transport failure,
// non-200 status, or malformed sample aborts the whole fetch so the caller
// never acts on half a picture of a path.

use reqwest::StatusCode;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{PathMetrics, QueryResponse, Sample, empty_path_metrics};
use crate::query::PathQuery;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in an error.
const BODY_PREVIEW_CHARS: usize = 200;

/// HTTP client for a Prometheus-compatible query API (Prometheus,
/// VictoriaMetrics, Thanos, ...).
#[derive(Debug, Clone)]
pub struct MetricsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MetricsClient {
    /// Create a new client from a `TransportConfig`.
    ///
    /// `base_url` is the backend root, e.g. `http://10.1.1.109:8428`.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self { http, base_url })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self { http, base_url }
    }

    /// The backend base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Build `{base}/api/v1/query?query={expr}`.
    fn query_url(&self, expr: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}/api/v1/query"))?;
        url.query_pairs_mut().append_pair("query", expr);
        Ok(url)
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Run one instant query and return its result vector.
    pub async fn query(&self, expr: &str) -> Result<Vec<Sample>, Error> {
        let url = self.query_url(expr)?;
        debug!(query = expr, "GET {}", url.path());

        let resp = self.http.get(url).send().await.map_err(Error::Transport)?;
        let status = resp.status();

        if status != StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Http {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let body = resp.text().await.map_err(Error::Transport)?;
        let response: QueryResponse =
            serde_json::from_str(&body).map_err(|e| Error::Deserialization {
                message: format!("{e} (body preview: {:?})", preview(&body)),
                body: body.clone(),
            })?;

        if response.status != "success" {
            return Err(Error::QueryFailed {
                status: match response.error {
                    Some(msg) => format!("{}: {msg}", response.status),
                    None => response.status,
                },
            });
        }

        trace!(series = response.data.result.len(), "query succeeded");
        Ok(response.data.result)
    }

    /// Fetch latency, packet loss, and availability for a path label.
    ///
    /// Both known versions start out zeroed, so a family absent from the
    /// backend's answer reads as `{0, 0, 0, 0}` rather than missing.
    /// Series carrying an unknown `version` label are ignored.
    pub async fn fetch_path_metrics(&self, path: &str) -> Result<PathMetrics, Error> {
        let mut metrics = empty_path_metrics();

        for query in PathQuery::ALL {
            let samples = self.query(&query.expr(path)).await?;
            for sample in &samples {
                let value = sample.parse_value(query.field())?;
                let Some(entry) = sample.version().and_then(|v| metrics.get_mut(v)) else {
                    trace!(version = ?sample.version(), "ignoring series with unknown version");
                    continue;
                };
                query.apply(entry, value);
            }
        }

        debug!(path, ?metrics, "fetched path metrics");
        Ok(metrics)
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn query_url_encodes_expression() {
        let client = MetricsClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://10.1.1.109:8428/").unwrap(),
        );
        let url = client.query_url(r#"up{path=~"1-2"}"#).unwrap();
        assert_eq!(url.path(), "/api/v1/query");
        let (key, value) = url.query_pairs().next().unwrap();
        assert_eq!(key, "query");
        assert_eq!(value, r#"up{path=~"1-2"}"#);
    }

    #[test]
    fn preview_truncates_on_char_boundary() {
        let body = "é".repeat(300);
        assert_eq!(preview(&body).chars().count(), BODY_PREVIEW_CHARS);
    }
}
