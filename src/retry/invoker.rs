use std::future::Future;
use std::sync::Arc;

use tracing::{debug, warn};

use super::RetryPolicy;
use crate::error::Cancelled;
use crate::notification::{AlertSink, EventType, FleetEvent};
use crate::remote::Outcome;
use crate::supervisor::ShutdownListener;

/// Runs remote operations for one account under a `RetryPolicy`.
///
/// Only `TransientFailure` is retried. Every call and every retry delay
/// races the shutdown signal.
pub struct RetryingInvoker {
    policy: RetryPolicy,
    account_index: usize,
    sink: Arc<dyn AlertSink>,
    shutdown: ShutdownListener,
}

impl RetryingInvoker {
    pub fn new(
        policy: RetryPolicy,
        account_index: usize,
        sink: Arc<dyn AlertSink>,
        shutdown: ShutdownListener,
    ) -> Self {
        Self {
            policy,
            account_index,
            sink,
            shutdown,
        }
    }

    pub async fn invoke<T, F, Fut>(
        &self,
        action: &'static str,
        mut operation: F,
    ) -> Result<Outcome<T>, Cancelled>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Outcome<T>>,
    {
        let mut attempt: u32 = 1;

        loop {
            let outcome = self.shutdown.guard(operation()).await?;

            match outcome {
                Outcome::TransientFailure(reason) => {
                    if !self.policy.allows_retry_after(attempt) {
                        warn!(
                            account = self.account_index,
                            action,
                            attempt,
                            %reason,
                            "Retry attempts exhausted"
                        );
                        return Ok(Outcome::TransientFailure(reason));
                    }

                    warn!(
                        account = self.account_index,
                        action,
                        attempt,
                        delay_secs = self.policy.delay.as_secs(),
                        %reason,
                        "Transient failure, retrying"
                    );
                    self.sink.notify(
                        FleetEvent::new(EventType::RetryScheduled, self.account_index)
                            .with_action(action)
                            .with_message(format!("attempt {} failed: {}", attempt, reason)),
                    );

                    self.shutdown.sleep(self.policy.delay).await?;
                    attempt += 1;
                }
                Outcome::AuthFailure(reason) => {
                    warn!(
                        account = self.account_index,
                        action,
                        %reason,
                        "Credential rejected, operator attention required"
                    );
                    self.sink.notify(
                        FleetEvent::new(EventType::CredentialRejected, self.account_index)
                            .with_action(action)
                            .with_message(reason.clone()),
                    );
                    return Ok(Outcome::AuthFailure(reason));
                }
                Outcome::ParseFailure(reason) => {
                    debug!(account = self.account_index, action, %reason, "Unreadable response");
                    return Ok(Outcome::ParseFailure(reason));
                }
                success @ Outcome::Success(_) => return Ok(success),
            }
        }
    }
}
