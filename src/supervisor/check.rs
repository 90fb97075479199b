use futures::future::join_all;
use serde::Serialize;
use tracing::debug;

use crate::account::Account;
use crate::remote::{ClientFactory, Outcome};

/// Result of validating one credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckVerdict {
    Valid,
    /// Upstream answered but reported the credential unusable.
    Invalid,
    Rejected,
    Unreachable,
    Unreadable,
    SessionError,
}

impl CheckVerdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
            Self::Rejected => "rejected",
            Self::Unreachable => "unreachable",
            Self::Unreadable => "unreadable",
            Self::SessionError => "session error",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CredentialCheck {
    pub index: usize,
    pub credential: String,
    pub proxy: Option<String>,
    pub verdict: CheckVerdict,
    pub balance: Option<f64>,
    pub detail: Option<String>,
}

/// Validate every account once, concurrently, without retries.
pub async fn check_credentials(
    accounts: &[Account],
    factory: &dyn ClientFactory,
) -> Vec<CredentialCheck> {
    join_all(accounts.iter().map(|account| check_one(account, factory))).await
}

async fn check_one(account: &Account, factory: &dyn ClientFactory) -> CredentialCheck {
    let mut check = CredentialCheck {
        index: account.index,
        credential: account.masked_credential(),
        proxy: account.masked_proxy(),
        verdict: CheckVerdict::SessionError,
        balance: None,
        detail: None,
    };

    let client = match factory.open(account) {
        Ok(client) => client,
        Err(e) => {
            check.detail = Some(e.to_string());
            return check;
        }
    };

    let (verdict, detail) = match client.validate_credential().await {
        Outcome::Success(true) => (CheckVerdict::Valid, None),
        Outcome::Success(false) => (CheckVerdict::Invalid, None),
        Outcome::AuthFailure(r) => (CheckVerdict::Rejected, Some(r)),
        Outcome::TransientFailure(r) => (CheckVerdict::Unreachable, Some(r)),
        Outcome::ParseFailure(r) => (CheckVerdict::Unreadable, Some(r)),
    };
    check.verdict = verdict;
    check.detail = detail;

    if verdict.is_valid() {
        check.balance = client.fetch_balance().await.success();
    }

    debug!(account = account.index, verdict = verdict.label(), "Credential checked");
    check
}
