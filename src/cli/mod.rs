//! Command-line interface definitions.
//!
//! - `Cli`, `Commands`: argument definitions via clap
//! - `Display`: styled terminal messages and the credential check table

mod commands;
mod display;

pub use commands::{
    Cli, Commands, ConfigAction, DEFAULT_CONFIG_FILE, DEFAULT_PROXIES_FILE, DEFAULT_TOKENS_FILE,
    OutputFormat, SourceArgs,
};
pub use display::Display;
