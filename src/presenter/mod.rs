//! Rendering of the status board.
//!
//! `run_presenter` drives a `Presenter` from snapshots on two clocks: a
//! short refresh for the table and a long one for the fleet summary.

mod json;
mod terminal;

use std::sync::Arc;

use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::debug;

use crate::config::PresenterConfig;
use crate::status::{BoardSnapshot, FleetSummary, StatusBoard};
use crate::supervisor::ShutdownListener;

pub use json::{JsonMode, JsonPresenter};
pub use terminal::TerminalPresenter;

/// Read-only consumer of board snapshots.
pub trait Presenter: Send + Sync {
    fn render(&self, snapshot: &BoardSnapshot);

    fn summarize(&self, summary: &FleetSummary);

    /// Called once with the last snapshot after every worker has stopped.
    fn finish(&self, snapshot: &BoardSnapshot) {
        self.render(snapshot);
        self.summarize(&snapshot.summary());
    }
}

/// Render until shutdown. Never writes to the board.
pub async fn run_presenter(
    presenter: Arc<dyn Presenter>,
    board: StatusBoard,
    config: PresenterConfig,
    shutdown: ShutdownListener,
) {
    let start = Instant::now();
    let mut refresh = interval_at(start, config.refresh_interval());
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First summary after one full interval, not at startup.
    let mut summary = interval_at(start + config.summary_interval(), config.summary_interval());
    summary.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            _ = summary.tick() => presenter.summarize(&board.snapshot().summary()),
            _ = refresh.tick() => presenter.render(&board.snapshot()),
        }
    }

    debug!("Presenter stopped");
}
