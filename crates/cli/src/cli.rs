//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Radio Logger - per-viewpoint packet capture for simulated radio networks
#[derive(Parser, Debug)]
#[command(
    name = "radio-logger",
    author,
    version,
    about = "Radio traffic capture logger",
    long_about = "Records simulated radio transmissions into pcap files.\n\n\
                  Every transmission is written once to the sender view and once \n\
                  to the view of each node that received it."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "RADIO_LOGGER_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "RADIO_LOGGER_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a transmission trace into capture files
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration and derived capture paths
    Info(InfoArgs),

    /// List the records of a capture file
    Inspect(InspectArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "config.toml",
        env = "RADIO_LOGGER_CONFIG"
    )]
    pub config: PathBuf,

    /// Transmission trace (JSON lines)
    #[arg(short, long, env = "RADIO_LOGGER_TRACE")]
    pub trace: PathBuf,

    /// Override the capture base path from configuration
    #[arg(short, long, env = "RADIO_LOGGER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Override the node count from configuration
    #[arg(long, env = "RADIO_LOGGER_NODES")]
    pub nodes: Option<usize>,

    /// Restart statistics once the trace reaches this simulated time (us)
    #[arg(long)]
    pub restart_at: Option<u64>,

    /// Write the configuration back with the capture path actually used
    #[arg(long)]
    pub save_config: Option<PathBuf>,

    /// Queue capacity between the trace reader and the capture service
    #[arg(long, default_value = "256", env = "RADIO_LOGGER_QUEUE_SIZE")]
    pub queue_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "RADIO_LOGGER_METRICS_PORT")]
    pub metrics_port: u16,

    /// Validate configuration and trace, then exit without writing
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `inspect` command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Capture file to read
    pub capture: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show at most this many records (0 = all)
    #[arg(long, default_value = "0")]
    pub limit: usize,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
