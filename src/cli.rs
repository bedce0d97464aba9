//! Command line interface.

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::pool::SyncPolicy;

/// Default Sentinel address.
pub const DEFAULT_SENTINEL: &str = "localhost:26379";

#[derive(Parser, Debug)]
#[command(name = "daisy")]
#[command(version)]
#[command(
    about = "Create and alter a slavepool in a chained replication configuration",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags accepted before or after any subcommand.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// The name of the pod
    #[arg(short = 'n', long, global = true)]
    pub podname: Option<String>,

    /// Address of the sentinel
    #[arg(
        short = 's',
        long,
        global = true,
        env = "SentinelAddress",
        default_value = DEFAULT_SENTINEL
    )]
    pub sentinel: String,

    /// Password for the sentinel
    #[arg(long, global = true, env = "SENTINEL_PASSWORD", hide_env_values = true)]
    pub sentinel_password: Option<String>,

    /// Password for the slave pool instances
    #[arg(long, global = true, env = "REDIS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connect to sentinel and slaves over TLS
    #[arg(long, global = true)]
    pub tls: bool,

    /// Connection timeout in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = 10)]
    pub connect_timeout: u64,

    /// Command timeout in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = 30)]
    pub command_timeout: u64,

    /// Log output format
    #[arg(
        long,
        global = true,
        env = "DAISY_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Text
    )]
    pub log_format: LogFormat,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Actions taken on the secondary slave pool.
    Slavepool {
        #[command(subcommand)]
        command: SlavePoolCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum SlavePoolCommand {
    /// Create a read-only, non-promotable slave pool.
    Create(CreateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateArgs {
    /// Comma separated list of IP:PORT listing for the slaves to put into the pool
    #[arg(long, value_name = "HOST:PORT,...")]
    pub slaves: Option<String>,

    /// The policy to use when enslaving the pool to the master pod (single, direct, ring)
    #[arg(long, value_name = "POLICY", default_value = "single")]
    pub syncpolicy: SyncPolicy,

    /// Compute and print the assignment plan without issuing SLAVEOF
    #[arg(long)]
    pub dry_run: bool,

    /// Format of the report printed when the run completes
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}
