//! Kernel route table snapshots.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::CoreError;
use crate::model::{NodeId, RouteEntry, TUNNEL_PREFIX};

/// Default location of the kernel's IPv4 route table.
pub const PROC_NET_ROUTE: &str = "/proc/net/route";

/// Port returning the routes currently bound to tunnel interfaces.
#[async_trait]
pub trait RouteTable: Send + Sync {
    async fn routes(&self) -> Result<Vec<RouteEntry>, CoreError>;
}

/// Reads `/proc/net/route`.
pub struct ProcRouteTable {
    path: PathBuf,
}

impl ProcRouteTable {
    pub fn new() -> Self {
        Self::with_path(PROC_NET_ROUTE)
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Default for ProcRouteTable {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RouteTable for ProcRouteTable {
    async fn routes(&self) -> Result<Vec<RouteEntry>, CoreError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| CoreError::RouteTable {
                message: format!("{}: {e}", self.path.display()),
            })?;
        Ok(parse_route_table(&text))
    }
}

/// Parse `/proc/net/route` text, keeping tunnel interfaces only.
///
/// The header line and malformed lines are skipped.
pub fn parse_route_table(text: &str) -> Vec<RouteEntry> {
    text.lines().skip(1).filter_map(parse_route_line).collect()
}

fn parse_route_line(line: &str) -> Option<RouteEntry> {
    // Iface Destination Gateway Flags RefCnt Use Metric Mask MTU Window IRTT
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 8 {
        return None;
    }
    let iface = *fields.first()?;
    if !iface.starts_with(TUNNEL_PREFIX) {
        return None;
    }
    Some(RouteEntry {
        iface: iface.to_owned(),
        destination: parse_hex_ipv4(fields.get(1)?)?,
        gateway: parse_hex_ipv4(fields.get(2)?)?,
        flags: u32::from_str_radix(fields.get(3)?, 16).ok()?,
        mask: parse_hex_ipv4(fields.get(7)?)?,
    })
}

/// Addresses are printed as host-order (little-endian) hex words.
fn parse_hex_ipv4(hex: &str) -> Option<Ipv4Addr> {
    let raw = u32::from_str_radix(hex, 16).ok()?;
    Some(Ipv4Addr::from(raw.to_le_bytes()))
}

/// Interface currently carrying `remote`'s mesh subnet, if any.
pub fn installed_interface(routes: &[RouteEntry], remote: NodeId) -> Option<&str> {
    routes
        .iter()
        .find(|r| r.is_subnet_of(remote))
        .map(|r| r.iface.as_str())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
eth0\t00000000\t0101A8C0\t0003\t0\t0\t100\t00000000\t0\t0\t0
wg1.2_v4\t0002C90A\t00000000\t0001\t0\t0\t0\t00FFFFFF\t0\t0\t0
wg1.5_v6\t0005C90A\t00000000\t0001\t0\t0\t0\t00FFFFFF\t0\t0\t0
wg1.9_v4\tZZZZ\t00000000\t0001\t0\t0\t0\t00FFFFFF\t0\t0\t0
wg1.7_v4\t0007C90A
";

    #[test]
    fn parses_tunnel_routes_only() {
        let routes = parse_route_table(SAMPLE);
        assert_eq!(routes.len(), 2);
        assert_eq!(
            routes[0],
            RouteEntry {
                iface: "wg1.2_v4".into(),
                destination: Ipv4Addr::new(10, 201, 2, 0),
                gateway: Ipv4Addr::UNSPECIFIED,
                flags: 1,
                mask: Ipv4Addr::new(255, 255, 255, 0),
            }
        );
    }

    #[test]
    fn finds_installed_interface() {
        let routes = parse_route_table(SAMPLE);
        assert_eq!(installed_interface(&routes, NodeId::new(2)), Some("wg1.2_v4"));
        assert_eq!(installed_interface(&routes, NodeId::new(5)), Some("wg1.5_v6"));
        assert_eq!(installed_interface(&routes, NodeId::new(7)), None);
    }

    #[tokio::test]
    async fn reads_route_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), SAMPLE).unwrap();

        let routes = ProcRouteTable::with_path(file.path()).routes().await.unwrap();
        assert_eq!(routes.len(), 2);
    }

    #[tokio::test]
    async fn missing_file_is_route_table_error() {
        let err = ProcRouteTable::with_path("/nonexistent/netswitch/route")
            .routes()
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::RouteTable { .. }));
        assert!(!err.is_fatal());
    }
}
