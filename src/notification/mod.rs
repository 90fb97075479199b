//! Operator alerting.
//!
//! - `FleetEvent`: what happened, to which account
//! - `AlertSink`: the fire-and-forget port the core reports through
//! - `Notifier`: bell, desktop/speech, event log and hook delivery

mod events;
mod notifier;

pub use events::{EventType, FleetEvent};
pub use notifier::Notifier;

/// Receives alert events. Implementations must return promptly and must
/// not fail the caller; delivery happens elsewhere.
pub trait AlertSink: Send + Sync {
    fn notify(&self, event: FleetEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl AlertSink for NullSink {
    fn notify(&self, _event: FleetEvent) {}
}
