use std::fmt;

use serde::{Deserialize, Serialize};

/// Classified result of one remote action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Connectivity error, timeout, or a non-auth error status.
    TransientFailure(String),
    /// Upstream rejected the credential (401/403).
    AuthFailure(String),
    /// The response could not be read as the expected structure.
    ParseFailure(String),
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::TransientFailure(_))
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::Success(_) => None,
            Self::TransientFailure(_) => Some(FailureKind::Transient),
            Self::AuthFailure(_) => Some(FailureKind::Auth),
            Self::ParseFailure(_) => Some(FailureKind::Parse),
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::TransientFailure(r) | Self::AuthFailure(r) | Self::ParseFailure(r) => Some(r),
        }
    }

    pub fn success(self) -> Option<T> {
        match self {
            Self::Success(v) => Some(v),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success(v) => Outcome::Success(f(v)),
            Self::TransientFailure(r) => Outcome::TransientFailure(r),
            Self::AuthFailure(r) => Outcome::AuthFailure(r),
            Self::ParseFailure(r) => Outcome::ParseFailure(r),
        }
    }
}

/// Failure classes recorded on a status row.
///
/// `Rejected` covers well-formed responses where upstream declined the
/// action (a claim or ping answered with `success: false`). `Unclassified`
/// is a step that panicked instead of producing an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Transient,
    Auth,
    Parse,
    Rejected,
    Unclassified,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Transient => "TransientFailure",
            Self::Auth => "AuthFailure",
            Self::Parse => "ParseFailure",
            Self::Rejected => "Rejected",
            Self::Unclassified => "Unclassified",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Upstream mission entry, re-fetched every cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub claimed: bool,
}

impl Mission {
    pub fn new(id: impl Into<String>, title: impl Into<String>, claimed: bool) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            claimed,
        }
    }
}
