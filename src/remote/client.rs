use std::sync::Arc;

use async_trait::async_trait;

use super::{Mission, Outcome};
use crate::account::Account;
use crate::error::Result;

/// One account's session against the rewards API.
///
/// A session is bound to a single credential and proxy route when it is
/// opened, so every operation here acts on behalf of that account only.
/// Implementations must classify every result; nothing is allowed to
/// escape as a panic or raw transport error.
#[async_trait]
pub trait RemoteClient: Send + Sync {
    async fn fetch_balance(&self) -> Outcome<f64>;

    async fn list_missions(&self) -> Outcome<Vec<Mission>>;

    async fn claim_mission(&self, mission_id: &str) -> Outcome<bool>;

    async fn send_ping(&self) -> Outcome<bool>;

    async fn validate_credential(&self) -> Outcome<bool>;

    async fn claim_daily_reward(&self) -> Outcome<bool>;
}

/// Opens a private session for an account.
///
/// Called once per worker; the returned session is never shared with
/// another account.
pub trait ClientFactory: Send + Sync {
    fn open(&self, account: &Account) -> Result<Arc<dyn RemoteClient>>;
}
