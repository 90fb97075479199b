use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tracing::{debug, error, info, warn};

use crate::account::Account;
use crate::config::{AuthFailurePolicy, WorkerConfig};
use crate::error::Cancelled;
use crate::notification::{AlertSink, EventType, FleetEvent};
use crate::remote::{FailureKind, Outcome, RemoteClient};
use crate::retry::{RetryPolicy, RetryingInvoker};
use crate::status::{RecordWriter, WorkerPhase};
use crate::supervisor::ShutdownListener;

/// What one pass through Fetching, Claiming and Pinging achieved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleReport {
    pub balance: Option<f64>,
    pub missions_claimed: u32,
    pub claim_failures: u32,
    pub daily_claimed: bool,
    pub pinged: bool,
    /// Fetching hit an auth failure under `AbortCycle`.
    pub aborted: bool,
    /// Steps that panicked and were recorded as unclassified failures.
    pub panicked_steps: u32,
}

impl CycleReport {
    fn settle(&mut self, step: Option<Flow>) -> Flow {
        step.unwrap_or_else(|| {
            self.panicked_steps += 1;
            Flow::Continue
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    SkipToSleep,
}

/// Drives one account: owns its session, its status row, and its retry
/// state. Nothing here is shared with other workers.
pub struct AccountWorker {
    account: Account,
    client: Arc<dyn RemoteClient>,
    status: RecordWriter,
    invoker: RetryingInvoker,
    sink: Arc<dyn AlertSink>,
    config: WorkerConfig,
    shutdown: ShutdownListener,
}

impl AccountWorker {
    pub fn new(
        account: Account,
        client: Arc<dyn RemoteClient>,
        status: RecordWriter,
        retry: RetryPolicy,
        config: WorkerConfig,
        sink: Arc<dyn AlertSink>,
        shutdown: ShutdownListener,
    ) -> Self {
        let invoker = RetryingInvoker::new(retry, account.index, Arc::clone(&sink), shutdown.clone());
        Self {
            account,
            client,
            status,
            invoker,
            sink,
            config,
            shutdown,
        }
    }

    /// Poll until shutdown. The row ends in `Stopped` however the loop exits.
    pub async fn run(self) {
        let index = self.account.index;
        let route = self
            .account
            .masked_proxy()
            .unwrap_or_else(|| "direct".to_string());
        info!(account = index, proxy = %route, "Worker started");

        if let Err(Cancelled) = self.run_until_cancelled().await {
            debug!(account = index, "Worker cancelled");
        }

        self.set_phase(WorkerPhase::Stopped);
        info!(account = index, "Worker stopped");
    }

    async fn run_until_cancelled(&self) -> Result<(), Cancelled> {
        if self.config.validate_on_start {
            self.validate().await?;
        }

        loop {
            let report = self.run_cycle().await?;
            debug!(
                account = self.account.index,
                balance = ?report.balance,
                claimed = report.missions_claimed,
                claim_failures = report.claim_failures,
                pinged = report.pinged,
                aborted = report.aborted,
                "Cycle complete"
            );

            self.set_phase(WorkerPhase::Sleeping);
            self.shutdown.sleep(self.config.poll_interval()).await?;
        }
    }

    /// One Fetching → Claiming → Pinging pass.
    pub async fn run_cycle(&self) -> Result<CycleReport, Cancelled> {
        let mut report = CycleReport::default();

        let fetched = self
            .guarded("fetch_balance", self.fetch_balance(&mut report))
            .await?;
        let flow = report.settle(fetched);

        if flow == Flow::Continue {
            let claimed = self
                .guarded("claim_missions", self.claim_missions(&mut report))
                .await?;
            report.settle(claimed);

            let pinged = self.guarded("send_ping", self.ping(&mut report)).await?;
            report.settle(pinged);
        } else {
            report.aborted = true;
        }

        self.status.update(|r| r.cycles += 1);
        Ok(report)
    }

    /// Runs a step, turning a panic into a recorded failure so the worker
    /// carries on with the next step. `None` means the step panicked.
    async fn guarded<F>(&self, step: &'static str, step_future: F) -> Result<Option<Flow>, Cancelled>
    where
        F: Future<Output = Result<Flow, Cancelled>>,
    {
        let panicked = match AssertUnwindSafe(step_future).catch_unwind().await {
            Ok(result) => return result.map(Some),
            Err(payload) => panic_message(payload.as_ref()),
        };

        error!(account = self.account.index, step, panic = %panicked, "Step panicked");
        self.status
            .update(|r| r.record_failure(FailureKind::Unclassified, step, panicked));
        Ok(None)
    }

    async fn validate(&self) -> Result<(), Cancelled> {
        self.set_phase(WorkerPhase::Validating);
        let client = &self.client;
        let outcome = self
            .invoker
            .invoke("validate_credential", || client.validate_credential())
            .await?;

        match outcome {
            Outcome::Success(true) => {
                info!(account = self.account.index, "Credential accepted");
                self.status.update(|r| {
                    r.needs_attention = false;
                    r.record_success();
                });
            }
            Outcome::Success(false) => {
                warn!(account = self.account.index, "Credential reported invalid");
                self.status.update(|r| {
                    r.record_failure(
                        FailureKind::Rejected,
                        "validate_credential",
                        "credential reported invalid",
                    );
                    r.needs_attention = true;
                });
            }
            failure => self.record_outcome_failure("validate_credential", &failure),
        }
        Ok(())
    }

    async fn fetch_balance(&self, report: &mut CycleReport) -> Result<Flow, Cancelled> {
        self.set_phase(WorkerPhase::Fetching);
        let client = &self.client;
        let outcome = self
            .invoker
            .invoke("fetch_balance", || client.fetch_balance())
            .await?;

        match outcome {
            Outcome::Success(balance) => {
                self.status.update(|r| {
                    r.balance = balance;
                    r.needs_attention = false;
                    r.record_success();
                });
                report.balance = Some(balance);
                Ok(Flow::Continue)
            }
            failure @ Outcome::AuthFailure(_) => {
                self.record_outcome_failure("fetch_balance", &failure);
                match self.config.auth_failure_policy {
                    AuthFailurePolicy::Continue => Ok(Flow::Continue),
                    AuthFailurePolicy::AbortCycle => {
                        info!(account = self.account.index, "Skipping cycle after auth failure");
                        Ok(Flow::SkipToSleep)
                    }
                }
            }
            failure => {
                self.record_outcome_failure("fetch_balance", &failure);
                Ok(Flow::Continue)
            }
        }
    }

    async fn claim_missions(&self, report: &mut CycleReport) -> Result<Flow, Cancelled> {
        self.set_phase(WorkerPhase::Claiming);
        let client = &self.client;

        if self.config.claim_daily_reward {
            match self
                .invoker
                .invoke("claim_daily_reward", || client.claim_daily_reward())
                .await?
            {
                Outcome::Success(true) => {
                    info!(account = self.account.index, "Daily reward claimed");
                    self.status.update(|r| {
                        r.daily_claims += 1;
                        r.record_success();
                    });
                    report.daily_claimed = true;
                }
                // Upstream declines repeat claims within the same day.
                Outcome::Success(false) => {
                    debug!(account = self.account.index, "Daily reward not available");
                }
                failure => self.record_outcome_failure("claim_daily_reward", &failure),
            }
        }

        let missions = match self
            .invoker
            .invoke("list_missions", || client.list_missions())
            .await?
        {
            Outcome::Success(missions) => {
                self.status.update(|r| r.record_success());
                missions
            }
            failure => {
                self.record_outcome_failure("list_missions", &failure);
                self.alert(EventType::MissionsUnavailable, "list_missions", failure.reason());
                return Ok(Flow::Continue);
            }
        };

        for mission in missions.iter().filter(|m| !m.claimed) {
            let id = mission.id.as_str();
            let outcome = self
                .invoker
                .invoke("claim_mission", || client.claim_mission(id))
                .await?;

            match outcome {
                Outcome::Success(true) => {
                    let at = Utc::now();
                    self.status.update(|r| r.record_claim(at));
                    report.missions_claimed += 1;
                    info!(
                        account = self.account.index,
                        mission = id,
                        title = %mission.title,
                        "Mission claimed"
                    );
                }
                Outcome::Success(false) => {
                    let message = format!("mission {} declined", id);
                    warn!(account = self.account.index, mission = id, "Claim declined");
                    self.status.update(|r| {
                        r.record_failure(FailureKind::Rejected, "claim_mission", message.as_str())
                    });
                    self.alert(EventType::ClaimFailed, "claim_mission", Some(&message));
                    report.claim_failures += 1;
                }
                failure => {
                    self.record_outcome_failure("claim_mission", &failure);
                    let message = format!(
                        "mission {}: {}",
                        id,
                        failure.reason().unwrap_or("unknown failure")
                    );
                    self.alert(EventType::ClaimFailed, "claim_mission", Some(&message));
                    report.claim_failures += 1;
                }
            }
        }

        Ok(Flow::Continue)
    }

    async fn ping(&self, report: &mut CycleReport) -> Result<Flow, Cancelled> {
        self.set_phase(WorkerPhase::Pinging);
        let client = &self.client;
        let outcome = self.invoker.invoke("send_ping", || client.send_ping()).await?;

        match outcome {
            Outcome::Success(true) => {
                let at = Utc::now();
                self.status.update(|r| r.record_ping(at));
                report.pinged = true;
            }
            Outcome::Success(false) => {
                self.status.update(|r| {
                    r.ping_ok = Some(false);
                    r.record_failure(FailureKind::Rejected, "send_ping", "ping declined");
                });
                self.alert(EventType::PingFailed, "send_ping", Some("ping declined"));
            }
            failure => {
                self.status.update(|r| r.ping_ok = Some(false));
                self.record_outcome_failure("send_ping", &failure);
                self.alert(EventType::PingFailed, "send_ping", failure.reason());
            }
        }

        Ok(Flow::Continue)
    }

    fn record_outcome_failure<T>(&self, action: &'static str, outcome: &Outcome<T>) {
        let Some(kind) = outcome.failure_kind() else {
            return;
        };
        let reason = outcome.reason().unwrap_or_default();
        debug!(account = self.account.index, action, %kind, reason, "Recording failure");
        self.status.update(|r| r.record_failure(kind, action, reason));
    }

    fn alert(&self, event_type: EventType, action: &str, message: Option<&str>) {
        let mut event = FleetEvent::new(event_type, self.account.index).with_action(action);
        if let Some(message) = message {
            event = event.with_message(message);
        }
        self.sink.notify(event);
    }

    fn set_phase(&self, phase: WorkerPhase) {
        self.status.update(|r| r.phase = phase);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "step panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use super::*;
    use crate::account::build_accounts;
    use crate::notification::NullSink;
    use crate::remote::Mission;
    use crate::status::StatusBoard;
    use crate::supervisor::Shutdown;

    #[derive(Default)]
    struct ScriptedClient {
        balances: Mutex<VecDeque<Outcome<f64>>>,
        missions: Mutex<Option<Outcome<Vec<Mission>>>>,
        claims: Mutex<VecDeque<Outcome<bool>>>,
        claimed_ids: Mutex<Vec<String>>,
        pings: Mutex<VecDeque<Outcome<bool>>>,
        panic_on_list: bool,
    }

    #[async_trait]
    impl RemoteClient for ScriptedClient {
        async fn fetch_balance(&self) -> Outcome<f64> {
            self.balances
                .lock()
                .pop_front()
                .unwrap_or(Outcome::Success(0.0))
        }

        async fn list_missions(&self) -> Outcome<Vec<Mission>> {
            if self.panic_on_list {
                panic!("mission payload exploded");
            }
            self.missions
                .lock()
                .clone()
                .unwrap_or(Outcome::Success(Vec::new()))
        }

        async fn claim_mission(&self, mission_id: &str) -> Outcome<bool> {
            self.claimed_ids.lock().push(mission_id.to_string());
            self.claims
                .lock()
                .pop_front()
                .unwrap_or(Outcome::Success(true))
        }

        async fn send_ping(&self) -> Outcome<bool> {
            self.pings
                .lock()
                .pop_front()
                .unwrap_or(Outcome::Success(true))
        }

        async fn validate_credential(&self) -> Outcome<bool> {
            Outcome::Success(true)
        }

        async fn claim_daily_reward(&self) -> Outcome<bool> {
            Outcome::Success(true)
        }
    }

    fn worker(
        client: Arc<ScriptedClient>,
        config: WorkerConfig,
        listener: ShutdownListener,
    ) -> (AccountWorker, StatusBoard) {
        let accounts = build_accounts(&["tok-abcdefgh-1".to_string()], &[]);
        let board = StatusBoard::new(&accounts);
        let writer = board.writer(1).unwrap();
        let worker = AccountWorker::new(
            accounts[0].clone(),
            client,
            writer,
            RetryPolicy::fixed(Duration::from_secs(15)),
            config,
            Arc::new(NullSink),
            listener,
        );
        (worker, board)
    }

    #[tokio::test(start_paused = true)]
    async fn test_cycle_updates_record() {
        let client = Arc::new(ScriptedClient::default());
        client.balances.lock().push_back(Outcome::Success(42.5));
        *client.missions.lock() = Some(Outcome::Success(vec![
            Mission::new("m1", "Follow", false),
            Mission::new("m2", "Invite", true),
        ]));

        let (worker, board) = worker(client.clone(), WorkerConfig::default(), ShutdownListener::never());
        let report = worker.run_cycle().await.unwrap();

        assert_eq!(report.balance, Some(42.5));
        assert_eq!(report.missions_claimed, 1);
        assert!(report.pinged);
        assert_eq!(*client.claimed_ids.lock(), vec!["m1".to_string()]);

        let record = board.get(1).unwrap();
        assert_eq!(record.balance, 42.5);
        assert_eq!(record.missions_claimed, 1);
        assert_eq!(record.ping_ok, Some(true));
        assert_eq!(record.cycles, 1);
        assert_eq!(record.consecutive_failures, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_abort_cycle_skips_claims_and_ping() {
        let client = Arc::new(ScriptedClient::default());
        client
            .balances
            .lock()
            .push_back(Outcome::AuthFailure("HTTP 401".into()));
        *client.missions.lock() = Some(Outcome::Success(vec![Mission::new("m1", "", false)]));

        let config = WorkerConfig {
            auth_failure_policy: AuthFailurePolicy::AbortCycle,
            ..WorkerConfig::default()
        };
        let (worker, board) = worker(client.clone(), config, ShutdownListener::never());
        let report = worker.run_cycle().await.unwrap();

        assert!(report.aborted);
        assert!(client.claimed_ids.lock().is_empty());
        let record = board.get(1).unwrap();
        assert!(record.needs_attention);
        assert_eq!(record.last_error_kind(), Some(FailureKind::Auth));
        assert!(record.last_ping_at.is_none());
        assert_eq!(record.cycles, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_claim_failure_does_not_stop_other_claims() {
        let client = Arc::new(ScriptedClient::default());
        *client.missions.lock() = Some(Outcome::Success(vec![
            Mission::new("a", "", false),
            Mission::new("b", "", false),
            Mission::new("c", "", false),
        ]));
        {
            let mut claims = client.claims.lock();
            claims.push_back(Outcome::Success(true));
            claims.push_back(Outcome::ParseFailure("invalid JSON".into()));
            claims.push_back(Outcome::Success(true));
        }

        let (worker, board) = worker(client.clone(), WorkerConfig::default(), ShutdownListener::never());
        let report = worker.run_cycle().await.unwrap();

        assert_eq!(report.missions_claimed, 2);
        assert_eq!(report.claim_failures, 1);
        assert_eq!(client.claimed_ids.lock().len(), 3);
        let record = board.get(1).unwrap();
        assert_eq!(record.missions_claimed, 2);
        assert_eq!(record.last_error.unwrap().action, "claim_mission");
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_step_is_recorded_and_skipped() {
        let client = Arc::new(ScriptedClient {
            panic_on_list: true,
            ..ScriptedClient::default()
        });

        let (worker, board) = worker(client, WorkerConfig::default(), ShutdownListener::never());
        let report = worker.run_cycle().await.unwrap();

        assert_eq!(report.panicked_steps, 1);
        assert!(report.pinged);
        let record = board.get(1).unwrap();
        assert_eq!(record.last_error_kind(), Some(FailureKind::Unclassified));
        assert_eq!(record.ping_ok, Some(true));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown() {
        let client = Arc::new(ScriptedClient::default());
        let shutdown = Shutdown::new();
        let (worker, board) = worker(client, WorkerConfig::default(), shutdown.listener());

        let handle = tokio::spawn(worker.run());
        tokio::time::sleep(Duration::from_secs(150)).await;
        shutdown.trigger();
        handle.await.unwrap();

        let record = board.get(1).unwrap();
        assert_eq!(record.phase, WorkerPhase::Stopped);
        // cycles at t=0, 60, 120
        assert_eq!(record.cycles, 3);
    }
}
