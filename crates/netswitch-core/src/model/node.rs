// ── Mesh identity types ──
//
// NodeId, AddressFamily, and PathLabel are the vocabulary every other
// module speaks. Node ids double as address octets (`10.201.<id>.0/24`),
// so they are bounded to a byte at parse time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::error::CoreError;

// ── NodeId ──────────────────────────────────────────────────────────

/// Identifier of a mesh node (local host or remote peer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeId(u8);

impl NodeId {
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NodeId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .map(Self)
            .map_err(|e| CoreError::Label {
                value: s.to_owned(),
                reason: e.to_string(),
            })
    }
}

impl TryFrom<String> for NodeId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<NodeId> for String {
    fn from(id: NodeId) -> Self {
        id.to_string()
    }
}

impl From<u8> for NodeId {
    fn from(id: u8) -> Self {
        Self(id)
    }
}

// ── AddressFamily ───────────────────────────────────────────────────

/// Transport family of a tunnel. Displays as the backend's `version` label.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
pub enum AddressFamily {
    #[strum(serialize = "4")]
    #[serde(rename = "4")]
    V4,
    #[strum(serialize = "6")]
    #[serde(rename = "6")]
    V6,
}

impl AddressFamily {
    /// The family used when no telemetry can be trusted yet.
    pub const COLD_START: Self = Self::V4;
}

// ── PathLabel ───────────────────────────────────────────────────────

/// Canonical, order-independent key of a link's telemetry series.
///
/// Both directions of a link share one series, so the smaller id always
/// comes first: `PathLabel::new(7, 3) == PathLabel::new(3, 7) == "3-7"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathLabel {
    low: NodeId,
    high: NodeId,
}

impl PathLabel {
    pub fn new(a: NodeId, b: NodeId) -> Self {
        if a <= b {
            Self { low: a, high: b }
        } else {
            Self { low: b, high: a }
        }
    }

    /// Build a label from raw identifiers, failing if either is not a node id.
    pub fn parse(a: &str, b: &str) -> Result<Self, CoreError> {
        Ok(Self::new(a.parse()?, b.parse()?))
    }
}

impl fmt::Display for PathLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn path_label_is_order_independent() {
        let a = PathLabel::new(NodeId::new(3), NodeId::new(7));
        let b = PathLabel::new(NodeId::new(7), NodeId::new(3));
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "3-7");
        assert_eq!(b.to_string(), "3-7");
    }

    #[test]
    fn path_label_orders_numerically() {
        let label = PathLabel::parse("12", "9").unwrap();
        assert_eq!(label.to_string(), "9-12");
    }

    #[test]
    fn path_label_rejects_non_numeric_ids() {
        let err = PathLabel::parse("1", "peer-b").unwrap_err();
        assert!(matches!(err, CoreError::Label { ref value, .. } if value == "peer-b"));
    }

    #[test]
    fn node_id_rejects_out_of_range() {
        assert!("256".parse::<NodeId>().is_err());
        assert!("-1".parse::<NodeId>().is_err());
        assert_eq!("255".parse::<NodeId>().unwrap().get(), 255);
    }

    #[test]
    fn address_family_round_trips_label() {
        assert_eq!(AddressFamily::V4.to_string(), "4");
        assert_eq!("6".parse::<AddressFamily>().unwrap(), AddressFamily::V6);
        assert!("5".parse::<AddressFamily>().is_err());
        assert_eq!(AddressFamily::V6.to_string(), "6");
    }
}
