//! Live per-account status shared between workers and the presenter.
//!
//! - `StatusRecord`: one account's row
//! - `StatusBoard`: the table, one lock per row
//! - `RecordWriter`: the single write handle for a row
//! - `BoardSnapshot`, `FleetSummary`: consistent copies for rendering

mod board;
mod record;

pub use board::{BoardSnapshot, FleetSummary, RecordWriter, StatusBoard};
pub use record::{ErrorSummary, StatusRecord, WorkerPhase};
