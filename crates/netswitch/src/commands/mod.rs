//! Command dispatch: bridges CLI args -> the core `Switch` -> output formatting.

pub mod config_cmd;
pub mod inspect;
pub mod once;
pub mod run;

use netswitch_config::Config;
use netswitch_core::Switch;

use crate::cli::{Command, GlobalOpts};
use crate::config;
use crate::error::CliError;

/// Dispatch a parsed command to its handler.
pub async fn dispatch(cmd: Command, global: &GlobalOpts) -> Result<(), CliError> {
    match cmd {
        Command::Run => run::handle(global).await,
        Command::Once(args) => once::handle(args, global).await,
        Command::Inspect(args) => inspect::handle(args, global).await,
        Command::Config(args) => config_cmd::handle(args, global),
    }
}

/// Build a production `Switch` from the loaded config plus flag overrides.
async fn build_switch(global: &GlobalOpts, cfg: Config) -> Result<Switch, CliError> {
    let switch_config = config::build_switch_config(global, cfg).await?;
    tracing::debug!(
        local = %switch_config.local_id,
        telemetry_url = %switch_config.telemetry_url,
        dry_run = switch_config.dry_run,
        "switch configured"
    );
    Ok(Switch::from_config(switch_config)?)
}
