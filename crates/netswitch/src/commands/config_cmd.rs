//! Config subcommand handlers.

use netswitch_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output;

/// Mask the bearer token so `config show` is safe to paste.
fn redact(cfg: &mut Config) {
    if cfg.switch.telemetry_token.is_some() {
        cfg.switch.telemetry_token = Some("****".into());
    }
}

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init { force } => {
            let path = config::config_path(global);
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }
            netswitch_config::save_config(&Config::default(), &path)?;
            eprintln!("Config written to {}", path.display());
            Ok(())
        }

        ConfigCommand::Show => {
            let mut cfg = config::load(global)?;
            let format = config::output_format(global, &cfg);
            config::apply_overrides(&mut cfg.switch, global);
            redact(&mut cfg);

            let out = match format {
                OutputFormat::Table => toml::to_string_pretty(&cfg)?,
                other => output::render_single(other, &cfg, |_| String::new())?,
            };
            output::print_output(&out);
            Ok(())
        }

        ConfigCommand::Path => {
            output::print_output(&config::config_path(global).display().to_string());
            Ok(())
        }
    }
}
