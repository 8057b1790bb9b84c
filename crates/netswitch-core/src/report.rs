// ── Pass reports ──
//
// Every reconciliation pass produces a `PassReport` describing what was
// decided per remote. The switch publishes the latest one on a watch
// channel; the CLI renders it.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::{AddressFamily, NodeId, RouteAction};
use crate::selector::SelectionReason;

/// Outcome of one full pass over all remotes.
#[derive(Debug, Clone, Serialize)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Whether this was the first pass, which forces IPv4.
    pub cold_start: bool,
    pub sysctl_errors: Vec<String>,
    /// Sorted by remote id.
    pub remotes: Vec<RemoteReport>,
}

impl PassReport {
    /// Remotes whose route was added or changed this pass.
    pub fn changed(&self) -> impl Iterator<Item = &RemoteReport> {
        self.remotes.iter().filter(|r| {
            matches!(
                r.decision,
                RemoteDecision::Reconciled {
                    action: RouteAction::Add | RouteAction::Change,
                    ..
                }
            )
        })
    }

    /// Number of failed commands and skipped remotes.
    pub fn error_count(&self) -> usize {
        let remote_errors: usize = self
            .remotes
            .iter()
            .map(|r| match &r.decision {
                RemoteDecision::Reconciled { errors, .. } => errors.len(),
                RemoteDecision::Skipped { .. } => 1,
            })
            .sum();
        remote_errors + self.sysctl_errors.len()
    }

    pub fn remote(&self, id: NodeId) -> Option<&RemoteReport> {
        self.remotes.iter().find(|r| r.remote == id)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RemoteReport {
    pub remote: NodeId,
    /// Families with a tunnel to this remote.
    pub families: BTreeSet<AddressFamily>,
    pub decision: RemoteDecision,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RemoteDecision {
    /// A family was chosen and the route brought in line with it.
    Reconciled {
        family: AddressFamily,
        reason: SelectionReason,
        action: RouteAction,
        interface: String,
        previous: Option<String>,
        errors: Vec<String>,
    },
    /// No preference this pass; the installed route was left alone.
    Skipped { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconciled(remote: u8, action: RouteAction, errors: usize) -> RemoteReport {
        RemoteReport {
            remote: NodeId::new(remote),
            families: BTreeSet::from([AddressFamily::V4, AddressFamily::V6]),
            decision: RemoteDecision::Reconciled {
                family: AddressFamily::V6,
                reason: SelectionReason::HigherScore,
                action,
                interface: format!("wg1.{remote}_v6"),
                previous: None,
                errors: vec!["boom".to_owned(); errors],
            },
        }
    }

    #[test]
    fn counts_changes_and_errors() {
        let now = Utc::now();
        let report = PassReport {
            started_at: now,
            finished_at: now,
            cold_start: false,
            sysctl_errors: vec!["sysctl".into()],
            remotes: vec![
                reconciled(2, RouteAction::Change, 1),
                reconciled(3, RouteAction::None, 0),
                RemoteReport {
                    remote: NodeId::new(4),
                    families: BTreeSet::from([AddressFamily::V4, AddressFamily::V6]),
                    decision: RemoteDecision::Skipped {
                        reason: "no preference".into(),
                    },
                },
            ],
        };

        assert_eq!(report.changed().count(), 1);
        assert_eq!(report.error_count(), 3);
        assert!(report.remote(NodeId::new(3)).is_some());
        assert!(report.remote(NodeId::new(9)).is_none());
    }
}
