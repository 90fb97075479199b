use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FleetError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Account not found: {0}")]
    AccountNotFound(usize),

    #[error("Status record for account {0} already has a writer")]
    WriterTaken(usize),

    #[error("Failed to open session for account {index}: {message}")]
    Session { index: usize, message: String },

    #[error("Invalid proxy route for account {index}: {proxy}")]
    InvalidProxy { index: usize, proxy: String },

    #[error("Failed to read {path}: {source}")]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, FleetError>;

/// Returned by cancellable operations once the shutdown signal has fired.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled by shutdown")]
pub struct Cancelled;
