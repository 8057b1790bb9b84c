// netswitch-api: Async client for the PromQL telemetry backend

pub mod client;
pub mod error;
pub mod models;
pub mod query;
pub mod transport;

pub use client::MetricsClient;
pub use error::Error;
pub use models::{LinkMetrics, PathMetrics, Sample};
pub use query::PathQuery;
pub use transport::TransportConfig;
