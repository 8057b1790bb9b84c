//! Clap derive structures for the `netswitch` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netswitch -- keep each mesh peer routed over its best address family
#[derive(Debug, Parser)]
#[command(
    name = "netswitch",
    version,
    about = "Route each WireGuard mesh peer over its healthiest address family",
    long_about = "Watches per-path latency, loss and availability in a PromQL backend\n\
        and moves each remote's mesh routes between its IPv4 and IPv6 tunnels.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file path (defaults to the platform config dir)
    #[arg(long, short = 'C', env = "NETSWITCH_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// This node's mesh id (inferred from tunnel names when omitted)
    #[arg(long, env = "NETSWITCH_LOCAL_ID", global = true)]
    pub local_id: Option<u8>,

    /// Telemetry backend base URL
    #[arg(long, env = "NETSWITCH_TELEMETRY_URL", global = true)]
    pub telemetry_url: Option<String>,

    /// Seconds between reconciliation passes
    #[arg(long, env = "NETSWITCH_INTERVAL", global = true)]
    pub interval: Option<u64>,

    /// Telemetry request timeout in seconds
    #[arg(long, env = "NETSWITCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Log route and sysctl commands instead of executing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Output format
    #[arg(long, short = 'o', env = "NETSWITCH_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

// ── Output & Log Enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run reconciliation passes until interrupted
    Run,

    /// Run a single reconciliation pass and print its report
    Once(OnceArgs),

    /// Show current metrics, scores and the decision for one remote
    #[command(alias = "i")]
    Inspect(InspectArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct OnceArgs {
    /// Consult telemetry instead of applying the cold-start IPv4 default
    #[arg(long)]
    pub steady: bool,
}

#[derive(Debug, Args)]
pub struct InspectArgs {
    /// Remote node id
    pub remote: String,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,
}
