//! Scripted remote API for driving workers without a network.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use reward_fleet::account::Account;
use reward_fleet::error::{FleetError, Result};
use reward_fleet::remote::{ClientFactory, Mission, Outcome, RemoteClient};

/// Outcomes handed out in order, then `fallback` forever.
#[derive(Debug)]
pub struct Scripted<T> {
    queue: Mutex<VecDeque<Outcome<T>>>,
    fallback: Mutex<Outcome<T>>,
}

impl<T: Clone> Scripted<T> {
    pub fn always(outcome: Outcome<T>) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(outcome),
        }
    }

    pub fn sequence(outcomes: Vec<Outcome<T>>, fallback: Outcome<T>) -> Self {
        Self {
            queue: Mutex::new(outcomes.into()),
            fallback: Mutex::new(fallback),
        }
    }

    pub fn set(&self, outcome: Outcome<T>) {
        self.queue.lock().clear();
        *self.fallback.lock() = outcome;
    }

    fn next(&self) -> Outcome<T> {
        self.queue
            .lock()
            .pop_front()
            .unwrap_or_else(|| self.fallback.lock().clone())
    }
}

#[derive(Debug, Clone)]
pub struct Call {
    pub action: &'static str,
    pub arg: Option<String>,
    pub at: tokio::time::Instant,
    pub wall: DateTime<Utc>,
}

/// One account's upstream. Successful claims mark the mission claimed, so
/// later listings reflect them like the real service does.
#[derive(Debug)]
pub struct FakeRemote {
    pub balance: Scripted<f64>,
    pub listing: Scripted<()>,
    pub claim: Scripted<bool>,
    pub ping: Scripted<bool>,
    pub validate: Scripted<bool>,
    pub daily: Scripted<bool>,
    missions: Mutex<Vec<Mission>>,
    latency: Option<Duration>,
    panic_on_ping: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeRemote {
    pub fn builder() -> FakeRemoteBuilder {
        FakeRemoteBuilder::default()
    }

    pub fn add_mission(&self, mission: Mission) {
        self.missions.lock().push(mission);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn count(&self, action: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.action == action).count()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().len()
    }

    async fn record(&self, action: &'static str, arg: Option<String>) {
        self.calls.lock().push(Call {
            action,
            arg,
            at: tokio::time::Instant::now(),
            wall: Utc::now(),
        });
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl RemoteClient for FakeRemote {
    async fn fetch_balance(&self) -> Outcome<f64> {
        self.record("fetch_balance", None).await;
        self.balance.next()
    }

    async fn list_missions(&self) -> Outcome<Vec<Mission>> {
        self.record("list_missions", None).await;
        let missions = self.missions.lock().clone();
        self.listing.next().map(|()| missions)
    }

    async fn claim_mission(&self, mission_id: &str) -> Outcome<bool> {
        self.record("claim_mission", Some(mission_id.to_string()))
            .await;
        let outcome = self.claim.next();
        if outcome == Outcome::Success(true) {
            for mission in self.missions.lock().iter_mut() {
                if mission.id == mission_id {
                    mission.claimed = true;
                }
            }
        }
        outcome
    }

    async fn send_ping(&self) -> Outcome<bool> {
        self.record("send_ping", None).await;
        if self.panic_on_ping {
            panic!("ping handler blew up");
        }
        self.ping.next()
    }

    async fn validate_credential(&self) -> Outcome<bool> {
        self.record("validate_credential", None).await;
        self.validate.next()
    }

    async fn claim_daily_reward(&self) -> Outcome<bool> {
        self.record("claim_daily_reward", None).await;
        self.daily.next()
    }
}

pub struct FakeRemoteBuilder {
    balance: Scripted<f64>,
    listing: Scripted<()>,
    claim: Scripted<bool>,
    ping: Scripted<bool>,
    validate: Scripted<bool>,
    daily: Scripted<bool>,
    missions: Vec<Mission>,
    latency: Option<Duration>,
    panic_on_ping: bool,
}

impl Default for FakeRemoteBuilder {
    fn default() -> Self {
        Self {
            balance: Scripted::always(Outcome::Success(0.0)),
            listing: Scripted::always(Outcome::Success(())),
            claim: Scripted::always(Outcome::Success(true)),
            ping: Scripted::always(Outcome::Success(true)),
            validate: Scripted::always(Outcome::Success(true)),
            daily: Scripted::always(Outcome::Success(true)),
            missions: Vec::new(),
            latency: None,
            panic_on_ping: false,
        }
    }
}

impl FakeRemoteBuilder {
    pub fn balance(mut self, balance: f64) -> Self {
        self.balance = Scripted::always(Outcome::Success(balance));
        self
    }

    pub fn balance_script(mut self, script: Scripted<f64>) -> Self {
        self.balance = script;
        self
    }

    pub fn listing(mut self, script: Scripted<()>) -> Self {
        self.listing = script;
        self
    }

    pub fn claim(mut self, script: Scripted<bool>) -> Self {
        self.claim = script;
        self
    }

    pub fn ping(mut self, script: Scripted<bool>) -> Self {
        self.ping = script;
        self
    }

    pub fn validate(mut self, script: Scripted<bool>) -> Self {
        self.validate = script;
        self
    }

    pub fn daily(mut self, script: Scripted<bool>) -> Self {
        self.daily = script;
        self
    }

    pub fn missions(mut self, missions: Vec<Mission>) -> Self {
        self.missions = missions;
        self
    }

    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn panic_on_ping(mut self) -> Self {
        self.panic_on_ping = true;
        self
    }

    /// Every action fails transiently.
    pub fn unreachable(self) -> Self {
        fn down<T>() -> Outcome<T> {
            Outcome::TransientFailure("connection refused".to_string())
        }
        self.balance_script(Scripted::always(down()))
            .listing(Scripted::always(down()))
            .claim(Scripted::always(down()))
            .ping(Scripted::always(down()))
            .validate(Scripted::always(down()))
            .daily(Scripted::always(down()))
    }

    pub fn build(self) -> Arc<FakeRemote> {
        Arc::new(FakeRemote {
            balance: self.balance,
            listing: self.listing,
            claim: self.claim,
            ping: self.ping,
            validate: self.validate,
            daily: self.daily,
            missions: Mutex::new(self.missions),
            latency: self.latency,
            panic_on_ping: self.panic_on_ping,
            calls: Mutex::new(Vec::new()),
        })
    }
}

/// Hands each account index its scripted remote. Unscripted accounts get a
/// default always-succeeding remote, created on first open.
#[derive(Default)]
pub struct FakeClientFactory {
    remotes: Mutex<HashMap<usize, Arc<FakeRemote>>>,
    broken: HashSet<usize>,
    opens: AtomicUsize,
}

impl FakeClientFactory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, index: usize, remote: Arc<FakeRemote>) -> Self {
        self.remotes.lock().insert(index, remote);
        self
    }

    /// Opening a session for `index` fails.
    pub fn broken(mut self, index: usize) -> Self {
        self.broken.insert(index);
        self
    }

    pub fn remote(&self, index: usize) -> Arc<FakeRemote> {
        Arc::clone(
            self.remotes
                .lock()
                .entry(index)
                .or_insert_with(|| FakeRemote::builder().build()),
        )
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }
}

impl ClientFactory for FakeClientFactory {
    fn open(&self, account: &Account) -> Result<Arc<dyn RemoteClient>> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.broken.contains(&account.index) {
            return Err(FleetError::InvalidProxy {
                index: account.index,
                proxy: account.proxy().unwrap_or("none").to_string(),
            });
        }
        let remote: Arc<dyn RemoteClient> = self.remote(account.index);
        Ok(remote)
    }
}
