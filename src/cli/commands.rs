use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub use crate::config::DEFAULT_CONFIG_FILE;

pub const DEFAULT_TOKENS_FILE: &str = "tokens.txt";
pub const DEFAULT_PROXIES_FILE: &str = "proxies.txt";

#[derive(Parser)]
#[command(name = "reward-fleet")]
#[command(author, version, about = "Keep a fleet of reward accounts pinged and claimed", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Path to a TOML config file (defaults apply when omitted)
    #[arg(short, long, global = true, env = "REWARD_FLEET_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Output format for CLI results.
/// - Text: live table on the terminal (default)
/// - Json: one JSON document with the final state
/// - Stream: NDJSON, one object per refresh and summary
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Stream,
}

/// Where credentials and proxies come from.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// File with one credential per line
    #[arg(short, long, default_value = DEFAULT_TOKENS_FILE, env = "REWARD_FLEET_TOKENS")]
    pub tokens: PathBuf,

    /// File with one proxy per line, assigned round-robin
    #[arg(short, long, default_value = DEFAULT_PROXIES_FILE, env = "REWARD_FLEET_PROXIES")]
    pub proxies: PathBuf,

    /// Ignore the proxy file and connect directly
    #[arg(long)]
    pub direct: bool,
}

impl SourceArgs {
    pub fn proxies_path(&self) -> Option<PathBuf> {
        (!self.direct).then(|| self.proxies.clone())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every account until interrupted
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Also claim the daily reward each cycle
        #[arg(long)]
        claim_daily: bool,

        /// Validate each credential before the first cycle
        #[arg(long)]
        validate: bool,
    },

    /// Validate every credential once and report
    Check {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write a default configuration file
    Init {
        /// Destination path
        #[arg(default_value = DEFAULT_CONFIG_FILE)]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
