use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::Shutdown;
use crate::account::{CredentialSource, build_accounts};
use crate::config::FleetConfig;
use crate::error::Result;
use crate::notification::{AlertSink, EventType, FleetEvent};
use crate::presenter::{Presenter, run_presenter};
use crate::remote::{ClientFactory, FailureKind};
use crate::retry::RetryPolicy;
use crate::status::{BoardSnapshot, StatusBoard, WorkerPhase};
use crate::worker::AccountWorker;

/// Runs the whole fleet until shutdown.
pub struct Supervisor {
    config: FleetConfig,
    factory: Arc<dyn ClientFactory>,
    sink: Arc<dyn AlertSink>,
    presenter: Arc<dyn Presenter>,
}

impl Supervisor {
    pub fn new(
        config: FleetConfig,
        factory: Arc<dyn ClientFactory>,
        sink: Arc<dyn AlertSink>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            config,
            factory,
            sink,
            presenter,
        }
    }

    /// Load accounts, run one worker each plus the presenter, and return the
    /// final snapshot once `shutdown` fires and every task has stopped (or
    /// been aborted after the grace period).
    ///
    /// Only an invalid configuration or credential loading can fail. With no
    /// credentials the returned snapshot is empty and nothing is spawned.
    pub async fn run(
        &self,
        source: &dyn CredentialSource,
        shutdown: &Shutdown,
    ) -> Result<BoardSnapshot> {
        self.config.validate()?;

        let credentials = source.load_credentials().await?;
        if credentials.is_empty() {
            warn!("No credentials loaded, nothing to run");
            return Ok(StatusBoard::new(&[]).snapshot());
        }
        let proxies = source.load_proxies().await?;
        let accounts = build_accounts(&credentials, &proxies);

        info!(
            accounts = accounts.len(),
            proxies = proxies.len(),
            "Starting fleet"
        );

        let board = StatusBoard::new(&accounts);
        let retry = RetryPolicy::from_config(&self.config.retry);
        let mut handles: Vec<(usize, JoinHandle<()>)> = Vec::with_capacity(accounts.len() + 1);

        for account in accounts {
            let index = account.index;
            let writer = board.writer(index)?;

            let client = match self.factory.open(&account) {
                Ok(client) => client,
                Err(e) => {
                    error!(account = index, error = %e, "Failed to open session");
                    writer.update(|r| {
                        r.record_failure(FailureKind::Unclassified, "open_session", e.to_string());
                        r.needs_attention = true;
                        r.phase = WorkerPhase::Stopped;
                    });
                    continue;
                }
            };

            let worker = AccountWorker::new(
                account,
                client,
                writer,
                retry,
                self.config.worker.clone(),
                Arc::clone(&self.sink),
                shutdown.listener(),
            );
            handles.push((index, tokio::spawn(worker.run())));
        }

        self.sink.notify(
            FleetEvent::fleet(EventType::FleetStarted)
                .with_message(format!("{} accounts, {} workers", board.len(), handles.len())),
        );

        let presenter_handle = tokio::spawn(run_presenter(
            Arc::clone(&self.presenter),
            board.clone(),
            self.config.presenter.clone(),
            shutdown.listener(),
        ));

        shutdown.listener().cancelled().await;
        info!("Shutdown requested, stopping workers");

        handles.push((0, presenter_handle));
        self.join_with_grace(handles).await;

        let snapshot = board.snapshot();
        self.presenter.finish(&snapshot);

        let summary = snapshot.summary();
        self.sink.notify(
            FleetEvent::fleet(EventType::FleetStopped).with_message(format!(
                "{} claims, {} accounts pinging",
                summary.total_claims, summary.successful_pings
            )),
        );
        info!(
            total_claims = summary.total_claims,
            needs_attention = summary.needs_attention,
            "Fleet stopped"
        );

        Ok(snapshot)
    }

    /// Wait for every task up to the grace period, then abort the rest.
    /// Index 0 is the presenter.
    async fn join_with_grace(&self, handles: Vec<(usize, JoinHandle<()>)>) {
        let aborts: Vec<_> = handles
            .iter()
            .map(|(index, handle)| (*index, handle.abort_handle()))
            .collect();

        let joined = join_all(
            handles
                .into_iter()
                .map(|(index, handle)| async move { (index, handle.await) }),
        );

        match tokio::time::timeout(self.config.supervisor.shutdown_grace(), joined).await {
            Ok(results) => {
                for (index, result) in results {
                    if let Err(e) = result
                        && e.is_panic()
                    {
                        error!(account = index, error = %e, "Task panicked");
                    }
                }
            }
            Err(_) => {
                let stragglers: Vec<usize> = aborts
                    .iter()
                    .filter(|(_, handle)| !handle.is_finished())
                    .map(|(index, _)| *index)
                    .collect();
                warn!(
                    ?stragglers,
                    grace_secs = self.config.supervisor.shutdown_grace_secs,
                    "Tasks still running after grace period, aborting"
                );
                for (_, handle) in &aborts {
                    handle.abort();
                }
            }
        }
    }
}

