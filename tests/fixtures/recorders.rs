//! Sinks that keep what they are given.

use parking_lot::Mutex;

use reward_fleet::notification::{AlertSink, EventType, FleetEvent};
use reward_fleet::presenter::Presenter;
use reward_fleet::status::{BoardSnapshot, FleetSummary};

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<FleetEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<FleetEvent> {
        self.events.lock().clone()
    }

    pub fn count(&self, event_type: EventType) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }

    pub fn count_for(&self, event_type: EventType, account: usize) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event_type == event_type && e.account_index == Some(account))
            .count()
    }
}

impl AlertSink for RecordingSink {
    fn notify(&self, event: FleetEvent) {
        self.events.lock().push(event);
    }
}

/// Keeps every snapshot it is asked to render.
#[derive(Default)]
pub struct RecordingPresenter {
    pub snapshots: Mutex<Vec<BoardSnapshot>>,
    pub summaries: Mutex<Vec<FleetSummary>>,
    pub finished: Mutex<Option<BoardSnapshot>>,
}

impl Presenter for RecordingPresenter {
    fn render(&self, snapshot: &BoardSnapshot) {
        self.snapshots.lock().push(snapshot.clone());
    }

    fn summarize(&self, summary: &FleetSummary) {
        self.summaries.lock().push(summary.clone());
    }

    fn finish(&self, snapshot: &BoardSnapshot) {
        *self.finished.lock() = Some(snapshot.clone());
    }
}
