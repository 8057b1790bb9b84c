//! Configuration for the netswitch daemon.
//!
//! A TOML file with a `[switch]` section, overlaid by `NETSWITCH_`
//! environment variables, and translated to `netswitch_core::SwitchConfig`.
//! The CLI applies its flag overrides on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use netswitch_core::{DEFAULT_TELEMETRY_URL, NodeId, SwitchConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub switch: SwitchSection,

    #[serde(default)]
    pub defaults: Defaults,
}

/// The `[switch]` section.
#[derive(Debug, Deserialize, Serialize)]
pub struct SwitchSection {
    /// This node's id. Inferred from tunnel interface names when unset.
    pub local_id: Option<u32>,

    /// PromQL backend base URL.
    #[serde(default = "default_telemetry_url")]
    pub telemetry_url: String,

    /// Bearer token for the backend (plaintext; prefer `telemetry_token_env`).
    pub telemetry_token: Option<String>,

    /// Environment variable name containing the bearer token.
    pub telemetry_token_env: Option<String>,

    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_timeout")]
    pub command_timeout_secs: u64,

    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_remotes: usize,

    #[serde(default)]
    pub dry_run: bool,

    /// Apply the asymmetric routing sysctls before every pass.
    #[serde(default = "default_true")]
    pub sysctl: bool,
}

impl Default for SwitchSection {
    fn default() -> Self {
        Self {
            local_id: None,
            telemetry_url: default_telemetry_url(),
            telemetry_token: None,
            telemetry_token_env: None,
            interval_secs: default_interval(),
            request_timeout_secs: default_timeout(),
            command_timeout_secs: default_timeout(),
            max_concurrent_remotes: default_max_concurrent(),
            dry_run: false,
            sysctl: true,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_telemetry_url() -> String {
    DEFAULT_TELEMETRY_URL.into()
}
fn default_interval() -> u64 {
    5
}
fn default_timeout() -> u64 {
    3
}
fn default_max_concurrent() -> usize {
    8
}
fn default_true() -> bool {
    true
}
fn default_output() -> String {
    "table".into()
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "netswitch", "netswitch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("netswitch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from defaults, the file at `path` (if present),
/// and `NETSWITCH_` environment variables.
///
/// Nested keys use a double underscore: `NETSWITCH_SWITCH__LOCAL_ID=3`.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETSWITCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to the runtime config ───────────────────────────────

impl SwitchSection {
    /// The configured local id, if any.
    pub fn local_id(&self) -> Result<Option<NodeId>, ConfigError> {
        self.local_id
            .map(|id| {
                u8::try_from(id)
                    .map(NodeId::new)
                    .map_err(|_| invalid("local_id", format!("{id} is not in 0..=255")))
            })
            .transpose()
    }

    /// Resolve the bearer token: named env var first, then plaintext.
    pub fn resolve_token(&self) -> Option<SecretString> {
        if let Some(ref env_name) = self.telemetry_token_env {
            if let Ok(val) = std::env::var(env_name) {
                return Some(SecretString::from(val));
            }
        }
        self.telemetry_token.clone().map(SecretString::from)
    }

    /// Build a validated `SwitchConfig` for the given node.
    pub fn to_switch_config(&self, local_id: NodeId) -> Result<SwitchConfig, ConfigError> {
        let url: url::Url = self
            .telemetry_url
            .parse()
            .map_err(|e| invalid("telemetry_url", format!("{e}: {}", self.telemetry_url)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(invalid(
                "telemetry_url",
                format!("expected http or https, got '{}'", url.scheme()),
            ));
        }

        let positive = |field: &str, secs: u64| {
            if secs == 0 {
                Err(invalid(field, "must be greater than zero"))
            } else {
                Ok(Duration::from_secs(secs))
            }
        };
        if self.max_concurrent_remotes == 0 {
            return Err(invalid("max_concurrent_remotes", "must be greater than zero"));
        }

        Ok(SwitchConfig {
            local_id,
            telemetry_url: url,
            telemetry_token: self.resolve_token(),
            interval: positive("interval_secs", self.interval_secs)?,
            request_timeout: positive("request_timeout_secs", self.request_timeout_secs)?,
            command_timeout: positive("command_timeout_secs", self.command_timeout_secs)?,
            max_concurrent_remotes: self.max_concurrent_remotes,
            dry_run: self.dry_run,
            sysctl_enabled: self.sysctl,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    #[test]
    fn defaults_translate_cleanly() {
        let cfg = SwitchSection::default()
            .to_switch_config(NodeId::new(1))
            .unwrap();
        assert_eq!(cfg.telemetry_url.as_str(), "http://127.0.0.1:8428/");
        assert_eq!(cfg.interval, Duration::from_secs(5));
        assert_eq!(cfg.request_timeout, Duration::from_secs(3));
        assert_eq!(cfg.max_concurrent_remotes, 8);
        assert!(cfg.sysctl_enabled);
        assert!(!cfg.dry_run);
        assert!(cfg.telemetry_token.is_none());
    }

    #[test]
    fn file_and_env_are_layered() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
                [switch]
                local_id = 4
                telemetry_url = "http://10.1.1.109:8428"
                interval_secs = 10
                "#,
            )?;
            jail.set_env("NETSWITCH_SWITCH__INTERVAL_SECS", "2");
            jail.set_env("NETSWITCH_DEFAULTS__OUTPUT", "json");

            let config = load_config(Path::new("config.toml")).unwrap();
            assert_eq!(config.switch.local_id, Some(4));
            assert_eq!(config.switch.telemetry_url, "http://10.1.1.109:8428");
            assert_eq!(config.switch.interval_secs, 2);
            assert_eq!(config.switch.command_timeout_secs, 3);
            assert_eq!(config.defaults.output, "json");
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        Jail::expect_with(|_| {
            let config = load_config(Path::new("absent.toml")).unwrap();
            assert_eq!(config.switch.local_id, None);
            assert_eq!(config.switch.telemetry_url, DEFAULT_TELEMETRY_URL);
            Ok(())
        });
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.switch.local_id = Some(9);
        cfg.switch.dry_run = true;
        save_config(&cfg, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("[switch]"));

        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded.switch.local_id, Some(9));
        assert!(loaded.switch.dry_run);
    }

    #[test]
    fn rejects_invalid_values() {
        let section = SwitchSection {
            local_id: Some(300),
            ..SwitchSection::default()
        };
        assert!(matches!(
            section.local_id(),
            Err(ConfigError::Validation { ref field, .. }) if field == "local_id"
        ));

        let section = SwitchSection {
            telemetry_url: "not a url".into(),
            ..SwitchSection::default()
        };
        assert!(section.to_switch_config(NodeId::new(1)).is_err());

        let section = SwitchSection {
            telemetry_url: "ftp://10.1.1.109".into(),
            ..SwitchSection::default()
        };
        assert!(section.to_switch_config(NodeId::new(1)).is_err());

        let section = SwitchSection {
            interval_secs: 0,
            ..SwitchSection::default()
        };
        let err = section.to_switch_config(NodeId::new(1)).unwrap_err();
        assert!(err.to_string().contains("interval_secs"), "got: {err}");
    }

    #[test]
    fn token_env_takes_precedence() {
        Jail::expect_with(|jail| {
            jail.set_env("NETSWITCH_TEST_TOKEN", "from-env");
            let section = SwitchSection {
                telemetry_token: Some("plain".into()),
                telemetry_token_env: Some("NETSWITCH_TEST_TOKEN".into()),
                ..SwitchSection::default()
            };
            let token = section.resolve_token().unwrap();
            assert_eq!(token.expose_secret(), "from-env");

            let section = SwitchSection {
                telemetry_token: Some("plain".into()),
                ..SwitchSection::default()
            };
            assert_eq!(section.resolve_token().unwrap().expose_secret(), "plain");
            Ok(())
        });
    }
}
