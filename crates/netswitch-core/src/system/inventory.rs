//! Tunnel interface inventory.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::trace;

use crate::error::CoreError;
use crate::model::{AddressFamily, InterfaceRecord, NodeId};

/// Default location of the kernel's network interface list.
pub const SYSFS_NET: &str = "/sys/class/net";

/// Port listing every configured tunnel interface.
#[async_trait]
pub trait InterfaceInventory: Send + Sync {
    async fn interfaces(&self) -> Result<Vec<InterfaceRecord>, CoreError>;
}

/// Reads interface names from sysfs and keeps the ones following the
/// tunnel naming scheme.
pub struct SysfsInventory {
    root: PathBuf,
}

impl SysfsInventory {
    pub fn new() -> Self {
        Self::with_root(SYSFS_NET)
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl Default for SysfsInventory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InterfaceInventory for SysfsInventory {
    async fn interfaces(&self) -> Result<Vec<InterfaceRecord>, CoreError> {
        let inventory_err = |e: std::io::Error| CoreError::Inventory {
            message: format!("{}: {e}", self.root.display()),
        };

        let mut dir = tokio::fs::read_dir(&self.root).await.map_err(inventory_err)?;
        let mut records = Vec::new();
        while let Some(entry) = dir.next_entry().await.map_err(inventory_err)? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            match InterfaceRecord::parse(name) {
                Some(record) => records.push(record),
                None => trace!(name, "not a tunnel interface"),
            }
        }

        records.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(records)
    }
}

/// Group tunnel records into the set of families configured per remote.
pub fn families_by_remote(records: &[InterfaceRecord]) -> BTreeMap<NodeId, BTreeSet<AddressFamily>> {
    let mut remotes: BTreeMap<NodeId, BTreeSet<AddressFamily>> = BTreeMap::new();
    for record in records {
        remotes.entry(record.remote).or_default().insert(record.family);
    }
    remotes
}

/// Derive the local node id from tunnel names, which all embed it.
///
/// Fails if there are no tunnels or if they disagree.
pub fn infer_local_id(records: &[InterfaceRecord]) -> Result<NodeId, CoreError> {
    let ids: BTreeSet<NodeId> = records.iter().map(|r| r.local).collect();
    let mut iter = ids.iter();
    match (iter.next(), iter.next()) {
        (Some(id), None) => Ok(*id),
        (None, _) => Err(CoreError::Config {
            message: "local id not configured and no tunnel interfaces to infer it from".into(),
        }),
        (Some(_), Some(_)) => Err(CoreError::Config {
            message: format!(
                "local id not configured and tunnel interfaces disagree: {}",
                ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
            ),
        }),
    }
}
