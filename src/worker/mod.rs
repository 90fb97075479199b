//! Per-account poll loop.

mod account;

pub use account::{AccountWorker, CycleReport};
