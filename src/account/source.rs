use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::error::{FleetError, Result};

/// Supplies the ordered credential and proxy lists the fleet is built from.
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn load_credentials(&self) -> Result<Vec<String>>;
    async fn load_proxies(&self) -> Result<Vec<String>>;
}

/// Line-oriented files: one entry per non-blank line.
#[derive(Debug, Clone)]
pub struct FileSource {
    credentials_path: PathBuf,
    proxies_path: Option<PathBuf>,
}

impl FileSource {
    pub fn new(credentials_path: impl Into<PathBuf>, proxies_path: Option<PathBuf>) -> Self {
        Self {
            credentials_path: credentials_path.into(),
            proxies_path,
        }
    }

    async fn read_lines(path: &Path) -> Result<Vec<String>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(parse_lines(&content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "List file not found, treating as empty");
                Ok(Vec::new())
            }
            Err(source) => Err(FleetError::SourceRead {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[async_trait]
impl CredentialSource for FileSource {
    async fn load_credentials(&self) -> Result<Vec<String>> {
        let credentials = Self::read_lines(&self.credentials_path).await?;
        debug!(count = credentials.len(), "Loaded credentials");
        Ok(credentials)
    }

    async fn load_proxies(&self) -> Result<Vec<String>> {
        let Some(path) = &self.proxies_path else {
            return Ok(Vec::new());
        };
        let proxies: Vec<String> = Self::read_lines(path)
            .await?
            .iter()
            .map(|p| normalize_proxy(p))
            .collect();
        debug!(count = proxies.len(), "Loaded proxies");
        Ok(proxies)
    }
}

/// In-memory lists, handy for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    pub credentials: Vec<String>,
    pub proxies: Vec<String>,
}

#[async_trait]
impl CredentialSource for StaticSource {
    async fn load_credentials(&self) -> Result<Vec<String>> {
        Ok(self.credentials.clone())
    }

    async fn load_proxies(&self) -> Result<Vec<String>> {
        Ok(self.proxies.iter().map(|p| normalize_proxy(p)).collect())
    }
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

/// Scheme-less routes are taken to be plain HTTP proxies.
pub fn normalize_proxy(proxy: &str) -> String {
    let proxy = proxy.trim();
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}
