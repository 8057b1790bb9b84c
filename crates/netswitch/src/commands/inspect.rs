//! Inspect command: show what the selector sees for one remote.

use tabled::Tabled;

use netswitch_core::{AddressFamily, Inspection, NodeId, RouteAction};

use crate::cli::{GlobalOpts, InspectArgs};
use crate::config;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct FamilyRow {
    #[tabled(rename = "Family")]
    family: String,
    #[tabled(rename = "Availability")]
    availability: String,
    #[tabled(rename = "Latency (ms)")]
    latency: String,
    #[tabled(rename = "Loss (%)")]
    loss: String,
    #[tabled(rename = "Score")]
    score: String,
}

fn detail(i: &Inspection) -> String {
    let rows: Vec<FamilyRow> = i
        .metrics
        .iter()
        .map(|(family, m)| FamilyRow {
            family: format!("v{family}"),
            availability: format!("{:.3}", m.availability),
            latency: format!("{:.2}", m.latency / 1000.0),
            loss: format!("{:.2}", m.packet_loss),
            score: match i.scores.get(&family).copied().flatten() {
                Some(s) => format!("{s:.1}"),
                None => "inf".into(),
            },
        })
        .collect();

    let action = match i.plan.action {
        RouteAction::None => "none (already in place)".to_owned(),
        other => other.to_string(),
    };

    [
        format!("Path:      {}", i.path),
        format!(
            "Selected:  {} ({})",
            family_name(i.selection.family),
            i.selection.reason
        ),
        format!(
            "Installed: {}",
            i.plan.installed.as_deref().unwrap_or("-")
        ),
        format!("Action:    {action}"),
        output::render_table(&rows),
    ]
    .join("\n")
}

fn family_name(family: AddressFamily) -> &'static str {
    match family {
        AddressFamily::V4 => "IPv4",
        AddressFamily::V6 => "IPv6",
    }
}

pub async fn handle(args: InspectArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let remote: NodeId = args.remote.parse()?;
    let cfg = config::load(global)?;
    let format = config::output_format(global, &cfg);
    let switch = super::build_switch(global, cfg).await?;

    let inspection = switch.inspect(remote).await?;
    let out = output::render_single(format, &inspection, detail)?;
    output::print_output(&out);
    Ok(())
}
