pub mod metrics;
pub mod node;
pub mod route;

pub use metrics::{FamilyMetrics, MetricsByFamily};
pub use node::{AddressFamily, NodeId, PathLabel};
pub use route::{InterfaceRecord, RouteAction, RouteEntry, RouteTarget, TUNNEL_PREFIX};
