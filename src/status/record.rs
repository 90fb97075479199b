use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::remote::FailureKind;

/// Where an account's worker currently is in its poll cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerPhase {
    #[default]
    Idle,
    Validating,
    Fetching,
    Claiming,
    Pinging,
    Sleeping,
    Stopped,
}

impl fmt::Display for WorkerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Fetching => "fetching",
            Self::Claiming => "claiming",
            Self::Pinging => "pinging",
            Self::Sleeping => "sleeping",
            Self::Stopped => "stopped",
        };
        f.pad(s)
    }
}

/// Most recent failure recorded for an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSummary {
    pub kind: FailureKind,
    pub action: String,
    pub message: String,
    pub at: DateTime<Utc>,
}

impl fmt::Display for ErrorSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} during {}: {}", self.kind, self.action, self.message)
    }
}

/// Live state of one account, written only by that account's worker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub index: usize,
    pub proxy: Option<String>,
    pub phase: WorkerPhase,
    pub balance: f64,
    pub missions_claimed: u64,
    pub daily_claims: u64,
    pub last_ping_at: Option<DateTime<Utc>>,
    pub ping_ok: Option<bool>,
    pub last_claim_at: Option<DateTime<Utc>>,
    pub last_error: Option<ErrorSummary>,
    pub consecutive_failures: u32,
    /// Set when the credential was rejected; retries will not fix it.
    pub needs_attention: bool,
    pub cycles: u64,
}

impl StatusRecord {
    pub fn new(index: usize, proxy: Option<String>) -> Self {
        Self {
            index,
            proxy,
            phase: WorkerPhase::Idle,
            balance: 0.0,
            missions_claimed: 0,
            daily_claims: 0,
            last_ping_at: None,
            ping_ok: None,
            last_claim_at: None,
            last_error: None,
            consecutive_failures: 0,
            needs_attention: false,
            cycles: 0,
        }
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    /// The last error stays visible until a later failure replaces it.
    pub fn record_failure(
        &mut self,
        kind: FailureKind,
        action: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.last_error = Some(ErrorSummary {
            kind,
            action: action.into(),
            message: message.into(),
            at: Utc::now(),
        });
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        if kind == FailureKind::Auth {
            self.needs_attention = true;
        }
    }

    pub fn record_claim(&mut self, at: DateTime<Utc>) {
        self.missions_claimed += 1;
        self.last_claim_at = Some(at);
        self.record_success();
    }

    pub fn record_ping(&mut self, at: DateTime<Utc>) {
        self.last_ping_at = Some(at);
        self.ping_ok = Some(true);
        self.record_success();
    }

    pub fn last_error_kind(&self) -> Option<FailureKind> {
        self.last_error.as_ref().map(|e| e.kind)
    }
}
