use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    FleetStarted,
    FleetStopped,
    RetryScheduled,
    CredentialRejected,
    MissionsUnavailable,
    ClaimFailed,
    PingFailed,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FleetStarted => "fleet.started",
            Self::FleetStopped => "fleet.stopped",
            Self::RetryScheduled => "call.retry",
            Self::CredentialRejected => "credential.rejected",
            Self::MissionsUnavailable => "missions.unavailable",
            Self::ClaimFailed => "mission.claim_failed",
            Self::PingFailed => "ping.failed",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Self::FleetStarted => "🚀",
            Self::FleetStopped => "🛑",
            Self::RetryScheduled => "🔄",
            Self::CredentialRejected => "🔑",
            Self::MissionsUnavailable => "⚠️",
            Self::ClaimFailed => "❌",
            Self::PingFailed => "📡",
        }
    }

    pub fn is_error(&self) -> bool {
        !matches!(self, Self::FleetStarted | Self::FleetStopped)
    }

    /// Needs a human; retries alone will not fix it.
    pub fn needs_operator(&self) -> bool {
        matches!(self, Self::CredentialRejected)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetEvent {
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_index: Option<usize>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl FleetEvent {
    pub fn new(event_type: EventType, account_index: usize) -> Self {
        Self {
            event_type,
            account_index: Some(account_index),
            created_at: Utc::now(),
            action: None,
            message: None,
        }
    }

    pub fn fleet(event_type: EventType) -> Self {
        Self {
            event_type,
            account_index: None,
            created_at: Utc::now(),
            action: None,
            message: None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn title(&self) -> String {
        format!(
            "{} Reward-Fleet: {}",
            self.event_type.emoji(),
            self.event_type.as_str()
        )
    }

    pub fn body(&self) -> String {
        let mut parts = Vec::new();

        match self.account_index {
            Some(index) => parts.push(format!("Account {}", index)),
            None => parts.push("Fleet".to_string()),
        }

        if let Some(action) = &self.action {
            parts.push(format!("Action: {}", action));
        }

        if let Some(msg) = &self.message {
            parts.push(msg.clone());
        }

        parts.join("\n")
    }

    /// One-line form for speech and log files.
    pub fn spoken(&self) -> String {
        self.body().replace('\n', ". ")
    }
}
