use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{FleetError, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.nodepay.ai/api";
pub const DEFAULT_PING_URL: &str = "https://nw.nodepay.ai/api/network/ping";
pub const DEFAULT_CONFIG_FILE: &str = "reward-fleet.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    pub worker: WorkerConfig,
    pub retry: RetryConfig,
    pub remote: RemoteConfig,
    pub presenter: PresenterConfig,
    pub notification: NotificationConfig,
    pub supervisor: SupervisorConfig,
}

impl FleetConfig {
    /// Load from `path` when given, else from `DEFAULT_CONFIG_FILE` in the
    /// working directory when it exists, else defaults.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_file(path).await,
            None => Self::load_or_default(Path::new(DEFAULT_CONFIG_FILE)).await,
        }
    }

    /// Read `path` if it exists; a missing file means defaults.
    pub async fn load_or_default(path: &Path) -> Result<Self> {
        if fs::try_exists(path).await.unwrap_or(false) {
            Self::load_file(path).await
        } else {
            let config = Self::default();
            config.validate()?;
            Ok(config)
        }
    }

    async fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|source| FleetError::SourceRead {
                path: path.to_path_buf(),
                source,
            })?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub async fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, content).await?;
        Ok(())
    }

    /// Validate configuration values, reporting every violation at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        if self.worker.poll_interval_secs == 0 {
            errors.push("worker.poll_interval_secs must be greater than 0");
        }

        if self.retry.delay_secs == 0 {
            errors.push("retry.delay_secs must be greater than 0");
        }
        if self.retry.max_attempts == Some(0) {
            errors.push("retry.max_attempts must be greater than 0 when set");
        }

        if self.remote.base_url.trim().is_empty() {
            errors.push("remote.base_url must not be empty");
        }
        if self.remote.ping_url.trim().is_empty() {
            errors.push("remote.ping_url must not be empty");
        }
        if self.remote.timeout_secs == 0 {
            errors.push("remote.timeout_secs must be greater than 0");
        }
        if self.remote.user_agents.is_empty() {
            errors.push("remote.user_agents must contain at least one entry");
        }

        if self.presenter.refresh_secs == 0 {
            errors.push("presenter.refresh_secs must be greater than 0");
        }
        if self.presenter.summary_interval_secs == 0 {
            errors.push("presenter.summary_interval_secs must be greater than 0");
        }

        if self.notification.command_timeout_secs == 0 {
            errors.push("notification.command_timeout_secs must be greater than 0");
        }

        if self.supervisor.shutdown_grace_secs == 0 {
            errors.push("supervisor.shutdown_grace_secs must be greater than 0");
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(FleetError::Config(format!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            )))
        }
    }
}

/// What a worker does with the rest of a cycle after the balance fetch is
/// rejected for authentication reasons.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailurePolicy {
    /// Keep going: missions and ping may still be accepted.
    #[default]
    Continue,
    /// Skip claiming and pinging, go straight to sleep.
    AbortCycle,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Seconds between the end of one poll cycle and the start of the next.
    pub poll_interval_secs: u64,
    pub auth_failure_policy: AuthFailurePolicy,
    /// Also hit the daily reward endpoint in every cycle.
    pub claim_daily_reward: bool,
    /// Validate the credential once before the first cycle.
    pub validate_on_start: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 60,
            auth_failure_policy: AuthFailurePolicy::Continue,
            claim_daily_reward: false,
            validate_on_start: false,
        }
    }
}

impl WorkerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub delay_secs: u64,
    /// Total attempts per call site, including the first. None retries until
    /// the call resolves or shutdown is signalled.
    pub max_attempts: Option<u32>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            delay_secs: 15,
            max_attempts: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub base_url: String,
    pub ping_url: String,
    pub platform: String,
    pub timeout_secs: u64,
    /// Accounts pick from this list by index so each keeps a stable agent.
    pub user_agents: Vec<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            ping_url: DEFAULT_PING_URL.to_string(),
            platform: "MOBILE".to_string(),
            timeout_secs: 30,
            user_agents: vec![
                "Mozilla/5.0 (Linux; Android 12; Pixel 5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.6045.134 Mobile Safari/537.36".to_string(),
                "Mozilla/5.0 (iPhone; CPU iPhone OS 16_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.0 Mobile Safari/604.1".to_string(),
                "Mozilla/5.0 (Android 11; Mobile; rv:109.0) Gecko/109.0 Firefox/109.0".to_string(),
            ],
        }
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn user_agent_for(&self, index: usize) -> &str {
        if self.user_agents.is_empty() {
            return "";
        }
        &self.user_agents[index.saturating_sub(1) % self.user_agents.len()]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    pub refresh_secs: u64,
    pub summary_interval_secs: u64,
    /// Balances above this are highlighted in the terminal table.
    pub balance_highlight_threshold: f64,
    /// Clear the terminal before each render.
    pub clear_screen: bool,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            refresh_secs: 1,
            summary_interval_secs: 300,
            balance_highlight_threshold: 50.0,
            clear_screen: true,
        }
    }
}

impl PresenterConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    pub fn summary_interval(&self) -> Duration {
        Duration::from_secs(self.summary_interval_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub enabled: bool,
    /// Ring the terminal bell on stderr.
    pub bell: bool,
    /// Desktop or speech notification, only for alerts a retry cannot fix.
    pub desktop: bool,
    pub event_log: bool,
    pub logs_dir: Option<PathBuf>,
    pub hook_command: Option<String>,
    /// Hook and desktop commands still running after this are killed.
    pub command_timeout_secs: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bell: true,
            desktop: false,
            event_log: false,
            logs_dir: None,
            hook_command: None,
            command_timeout_secs: 30,
        }
    }
}

impl NotificationConfig {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// How long shutdown waits for tasks before aborting them.
    pub shutdown_grace_secs: u64,
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            shutdown_grace_secs: 5,
        }
    }
}

impl SupervisorConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = FleetConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker.poll_interval(), Duration::from_secs(60));
        assert_eq!(config.retry.delay_secs, 15);
        assert!(config.retry.max_attempts.is_none());
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let mut config = FleetConfig::default();
        config.worker.poll_interval_secs = 0;
        config.retry.max_attempts = Some(0);
        config.remote.user_agents.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("poll_interval_secs"));
        assert!(err.contains("max_attempts"));
        assert!(err.contains("user_agents"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: FleetConfig = toml::from_str(
            r#"
            [worker]
            auth_failure_policy = "abort_cycle"

            [retry]
            delay_secs = 3
            max_attempts = 4
            "#,
        )
        .unwrap();

        assert_eq!(
            config.worker.auth_failure_policy,
            AuthFailurePolicy::AbortCycle
        );
        assert_eq!(config.worker.poll_interval_secs, 60);
        assert_eq!(config.retry.delay_secs, 3);
        assert_eq!(config.retry.max_attempts, Some(4));
        assert_eq!(config.remote.platform, "MOBILE");
    }

    #[test]
    fn test_user_agent_is_stable_per_index() {
        let remote = RemoteConfig::default();
        let n = remote.user_agents.len();
        assert_eq!(remote.user_agent_for(1), remote.user_agent_for(1 + n));
        assert_ne!(remote.user_agent_for(1), remote.user_agent_for(2));
    }
}
