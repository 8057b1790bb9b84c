//! CLI-specific config wrappers.
//!
//! Layers `GlobalOpts` flags over the file/env configuration and resolves
//! the local node id.

use std::path::PathBuf;

use netswitch_config::{Config, SwitchSection};
use netswitch_core::system::{InterfaceInventory, SysfsInventory, infer_local_id};
use netswitch_core::{CoreError, NodeId, SwitchConfig};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Config file in use: `--config` or the platform default.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(netswitch_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(netswitch_config::load_config(&config_path(global))?)
}

/// Output format: flag, then `[defaults] output`, then table.
pub fn output_format(global: &GlobalOpts, cfg: &Config) -> OutputFormat {
    global.output.unwrap_or(match cfg.defaults.output.as_str() {
        "json" => OutputFormat::Json,
        "json-compact" => OutputFormat::JsonCompact,
        _ => OutputFormat::Table,
    })
}

/// Apply flag overrides to the `[switch]` section.
pub fn apply_overrides(section: &mut SwitchSection, global: &GlobalOpts) {
    if let Some(id) = global.local_id {
        section.local_id = Some(u32::from(id));
    }
    if let Some(ref url) = global.telemetry_url {
        section.telemetry_url.clone_from(url);
    }
    if let Some(secs) = global.interval {
        section.interval_secs = secs;
    }
    if let Some(secs) = global.timeout {
        section.request_timeout_secs = secs;
    }
    if global.dry_run {
        section.dry_run = true;
    }
}

/// Resolve the local id: configured, or inferred from tunnel names.
pub async fn resolve_local_id(section: &SwitchSection) -> Result<NodeId, CliError> {
    if let Some(id) = section.local_id()? {
        return Ok(id);
    }

    let records = SysfsInventory::new().interfaces().await?;
    let id = infer_local_id(&records).map_err(|e| match e {
        CoreError::Config { message } => CliError::LocalIdUnknown { reason: message },
        other => other.into(),
    })?;
    tracing::info!(local = %id, "inferred local id from tunnel interfaces");
    Ok(id)
}

/// Build the runtime `SwitchConfig` from file, env, and flags.
pub async fn build_switch_config(
    global: &GlobalOpts,
    mut cfg: Config,
) -> Result<SwitchConfig, CliError> {
    apply_overrides(&mut cfg.switch, global);
    let local_id = resolve_local_id(&cfg.switch).await?;
    Ok(cfg.switch.to_switch_config(local_id)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["netswitch"];
        argv.extend_from_slice(args);
        argv.push("run");
        Cli::try_parse_from(argv).unwrap().global
    }

    #[test]
    fn flags_override_file_values() {
        let g = global(&[
            "--local-id",
            "3",
            "--telemetry-url",
            "http://10.1.1.109:8428",
            "--interval",
            "9",
            "--dry-run",
        ]);
        let mut section = SwitchSection::default();
        apply_overrides(&mut section, &g);

        assert_eq!(section.local_id, Some(3));
        assert_eq!(section.telemetry_url, "http://10.1.1.109:8428");
        assert_eq!(section.interval_secs, 9);
        assert_eq!(section.request_timeout_secs, 3);
        assert!(section.dry_run);
    }

    #[test]
    fn output_flag_beats_config_default() {
        let mut cfg = Config::default();
        cfg.defaults.output = "json".into();

        assert_eq!(output_format(&global(&[]), &cfg), OutputFormat::Json);
        assert_eq!(
            output_format(&global(&["-o", "table"]), &cfg),
            OutputFormat::Table
        );
    }

    #[tokio::test]
    async fn configured_local_id_skips_inference() {
        let section = SwitchSection {
            local_id: Some(7),
            ..SwitchSection::default()
        };
        assert_eq!(resolve_local_id(&section).await.unwrap(), NodeId::new(7));
    }
}
