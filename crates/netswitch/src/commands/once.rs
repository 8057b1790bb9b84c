//! Single-pass mode.

use std::collections::BTreeSet;

use tabled::Tabled;

use netswitch_core::{AddressFamily, PassReport, RemoteDecision, RemoteReport};

use crate::cli::{GlobalOpts, OnceArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RemoteRow {
    #[tabled(rename = "Remote")]
    remote: String,
    #[tabled(rename = "Tunnels")]
    tunnels: String,
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Note")]
    note: String,
}

fn tunnels(families: &BTreeSet<AddressFamily>) -> String {
    families
        .iter()
        .map(|f| format!("v{f}"))
        .collect::<Vec<_>>()
        .join(",")
}

impl From<&RemoteReport> for RemoteRow {
    fn from(r: &RemoteReport) -> Self {
        let remote = r.remote.to_string();
        let tunnels = tunnels(&r.families);
        match &r.decision {
            RemoteDecision::Reconciled {
                family,
                reason,
                action,
                interface,
                previous,
                errors,
            } => Self {
                remote,
                tunnels,
                family: format!("v{family}"),
                reason: reason.to_string(),
                action: action.to_string(),
                interface: interface.clone(),
                note: if errors.is_empty() {
                    previous
                        .as_ref()
                        .filter(|p| *p != interface)
                        .map(|p| format!("was {p}"))
                        .unwrap_or_default()
                } else {
                    errors.join("; ")
                },
            },
            RemoteDecision::Skipped { reason } => Self {
                remote,
                tunnels,
                family: "-".into(),
                reason: "-".into(),
                action: "skipped".into(),
                interface: "-".into(),
                note: reason.clone(),
            },
        }
    }
}

/// Summary line plus one row per remote.
pub fn pass_detail(report: &PassReport) -> String {
    let took = report.finished_at - report.started_at;
    let mut lines = vec![format!(
        "Pass finished {} ({}ms, {})",
        report.finished_at.format("%Y-%m-%d %H:%M:%S UTC"),
        took.num_milliseconds(),
        if report.cold_start {
            "cold start"
        } else {
            "steady"
        },
    )];
    for err in &report.sysctl_errors {
        lines.push(format!("sysctl: {err}"));
    }
    if report.remotes.is_empty() {
        lines.push("No tunnel interfaces found.".into());
    } else {
        let rows: Vec<RemoteRow> = report.remotes.iter().map(RemoteRow::from).collect();
        lines.push(output::render_table(&rows));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(args: OnceArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let cfg = config::load(global)?;
    let format = config::output_format(global, &cfg);
    let switch = super::build_switch(global, cfg).await?;
    if args.steady {
        switch.skip_cold_start();
    }

    let report = switch.run_pass().await?;
    let out = output::render_single(format, &*report, pass_detail)?;
    output::print_output(&out);

    match report.error_count() {
        0 => Ok(()),
        count => Err(CliError::PassErrors { count }),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use netswitch_core::{NodeId, RouteAction, SelectionReason};

    use super::*;

    #[test]
    fn detail_lists_each_remote() {
        let now = Utc::now();
        let report = PassReport {
            started_at: now,
            finished_at: now,
            cold_start: false,
            sysctl_errors: vec![],
            remotes: vec![
                RemoteReport {
                    remote: NodeId::new(2),
                    families: BTreeSet::from([AddressFamily::V4, AddressFamily::V6]),
                    decision: RemoteDecision::Reconciled {
                        family: AddressFamily::V6,
                        reason: SelectionReason::HigherScore,
                        action: RouteAction::Change,
                        interface: "wg1.2_v6".into(),
                        previous: Some("wg1.2_v4".into()),
                        errors: vec![],
                    },
                },
                RemoteReport {
                    remote: NodeId::new(3),
                    families: BTreeSet::from([AddressFamily::V4, AddressFamily::V6]),
                    decision: RemoteDecision::Skipped {
                        reason: "no preference: backend down".into(),
                    },
                },
            ],
        };

        let text = pass_detail(&report);
        assert!(text.contains("steady"));
        assert!(text.contains("wg1.2_v6"));
        assert!(text.contains("was wg1.2_v4"));
        assert!(text.contains("higher score"));
        assert!(text.contains("v4,v6"));
        assert!(text.contains("no preference: backend down"));
    }
}
