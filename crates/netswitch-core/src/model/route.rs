// ── Tunnel and route types ──
//
// Naming and addressing conventions of the mesh:
//   interface  wg<local>.<remote>_v<family>
//   IPv4       10.201.<remote>.0/24, sourced from 10.201.<local>.1
//   IPv6       fdac:c9:<remote>::/64

use std::fmt;
use std::net::Ipv4Addr;

use serde::Serialize;
use strum::Display;

use super::node::{AddressFamily, NodeId};
use crate::system::executor::SystemCommand;

/// Name prefix shared by every tunnel interface.
pub const TUNNEL_PREFIX: &str = "wg";

/// Second octet of every mesh IPv4 subnet.
pub const MESH_V4_OCTET: u8 = 201;

/// One local tunnel endpoint, as reported by the interface inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceRecord {
    pub name: String,
    pub local: NodeId,
    pub remote: NodeId,
    pub family: AddressFamily,
}

impl InterfaceRecord {
    /// Parse a tunnel interface name of the form `wg<local>.<remote>_v<family>`.
    ///
    /// Returns `None` for anything else (loopback, physical NICs, tunnels
    /// outside the naming scheme).
    pub fn parse(name: &str) -> Option<Self> {
        let rest = name.strip_prefix(TUNNEL_PREFIX)?;
        let (local, rest) = rest.split_once('.')?;
        let (remote, family) = rest.rsplit_once("_v")?;
        Some(Self {
            name: name.to_owned(),
            local: local.parse().ok()?,
            remote: remote.parse().ok()?,
            family: family.parse().ok()?,
        })
    }
}

/// One entry of the kernel's IPv4 route table (tunnel interfaces only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub iface: String,
    pub destination: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub flags: u32,
    pub mask: Ipv4Addr,
}

impl RouteEntry {
    /// Whether this entry is the mesh subnet route of `remote`.
    pub fn is_subnet_of(&self, remote: NodeId) -> bool {
        let [_, second, third, fourth] = self.destination.octets();
        second == MESH_V4_OCTET && third == remote.get() && fourth == 0
    }
}

/// What the reconciler does for one remote in one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum RouteAction {
    /// Installed route already points at the desired interface.
    None,
    /// No route installed yet.
    Add,
    /// Route installed on the other family's interface.
    Change,
}

impl RouteAction {
    /// The `ip route` verb for this action, if it issues commands.
    pub fn verb(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Add => Some("add"),
            Self::Change => Some("change"),
        }
    }
}

/// Desired routing for one remote: which family's tunnel carries its subnets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteTarget {
    pub local: NodeId,
    pub remote: NodeId,
    pub family: AddressFamily,
}

impl RouteTarget {
    pub fn new(local: NodeId, remote: NodeId, family: AddressFamily) -> Self {
        Self {
            local,
            remote,
            family,
        }
    }

    /// `wg<local>.<remote>_v<family>`
    pub fn interface(&self) -> String {
        format!("{TUNNEL_PREFIX}{}.{}_v{}", self.local, self.remote, self.family)
    }

    /// `10.201.<remote>.0/24`
    pub fn v4_subnet(&self) -> String {
        format!("10.{MESH_V4_OCTET}.{}.0/24", self.remote)
    }

    /// `10.201.<local>.1`
    pub fn v4_source(&self) -> String {
        format!("10.{MESH_V4_OCTET}.{}.1", self.local)
    }

    /// `fdac:c9:<remote>::/64`
    pub fn v6_subnet(&self) -> String {
        format!("fdac:c9:{}::/64", self.remote)
    }

    /// The `ip` invocations that carry out `action`, IPv4 first.
    ///
    /// Empty for [`RouteAction::None`].
    pub fn commands(&self, action: RouteAction) -> Vec<SystemCommand> {
        let Some(verb) = action.verb() else {
            return Vec::new();
        };
        let iface = self.interface();
        let v4_subnet = self.v4_subnet();
        let v4_source = self.v4_source();
        let v6_subnet = self.v6_subnet();
        vec![
            SystemCommand::new(
                "ip",
                [
                    "route",
                    verb,
                    v4_subnet.as_str(),
                    "dev",
                    iface.as_str(),
                    "scope",
                    "link",
                    "src",
                    v4_source.as_str(),
                ],
            ),
            SystemCommand::new(
                "ip",
                [
                    "-6",
                    "route",
                    verb,
                    v6_subnet.as_str(),
                    "dev",
                    iface.as_str(),
                    "scope",
                    "link",
                ],
            ),
        ]
    }
}

impl fmt::Display for RouteTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.interface())
    }
}
